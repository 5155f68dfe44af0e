mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use log::{info, warn};

use survivor_sim::compute::Simulation;
use survivor_sim::entities::{InputSnapshot, RunState, WeaponKind};
use survivor_sim::{Error, SimConfig};

#[derive(Debug, Parser)]
#[command(name = "survivor_sim", about = "Top-down survival action game in the terminal")]
struct Args {
    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms at
/// 60 Hz) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn input_snapshot(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputSnapshot {
    InputSnapshot {
        up: any_held(key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame),
        down: any_held(key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame),
        left: any_held(key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
        right: any_held(key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(WeaponKind),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let title = "S U R V I V O R";
    out.queue(cursor::MoveTo(cx.saturating_sub(title.len() as u16 / 2), cy.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Choose your starting weapon:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Sword ", Color::Yellow, "Pulse that hits everything close by"),
        ("2", "Bow   ", Color::Cyan, "Piercing arrows at the nearest foe"),
        ("3", "Staff ", Color::Red, "Fireball that bursts over an area"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Weapons fire on their own. Collect green orbs to level up."))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(WeaponKind::Sword)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(WeaponKind::Bow)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(WeaponKind::Staff)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program, `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key. Each frame the still-fresh directional keys become the
/// input snapshot for that tick, so several directions can be held at once.
/// One-shot keys (pause, choices, restart, quit) act on the press event.
fn game_loop<W: Write>(
    out: &mut W,
    sim: &mut Simulation,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let frame_time = Duration::from_secs_f64(1.0 / sim.config().tick_rate_hz as f64);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => {
                            if !sim.request_pause() {
                                sim.request_resume();
                            }
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if matches!(sim.run_state(), RunState::GameOver | RunState::Paused) =>
                        {
                            sim.request_restart_run();
                            return Ok(false);
                        }
                        KeyCode::Char(c @ '1'..='3') if sim.level_up_choices_ready() => {
                            let index = c as usize - '1' as usize;
                            if !sim.apply_level_up_choice(index) {
                                warn!("level-up slot {} is unavailable", index + 1);
                            }
                        }
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        sim.set_input(input_snapshot(&key_frame, frame));
        sim.advance_tick();

        display::render(out, sim.state(), sim.config().tick_rate_hz)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!("starting with {:?}", config);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.map_err(Error::from)
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: SimConfig) -> std::io::Result<()> {
    let mut sim = Simulation::new(config);

    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(kind) => {
                sim.choose_initial_weapon(kind);
                if game_loop(out, &mut sim, rx)? {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}
