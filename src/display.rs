/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// simulation state. No game logic is performed; this module only projects
/// world coordinates onto terminal cells around the player.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::DVec2;
use survivor_sim::entities::{MonsterKind, RunState, PLAYER_SIZE};
use survivor_sim::projectiles::{FireballPhase, Projectile};
use survivor_sim::SimulationState;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_HP: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Yellow;
const C_HUD_STATS: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_PLAYER_HURT: Color = Color::DarkGrey;
const C_BAT: Color = Color::Magenta;
const C_MUMMY: Color = Color::DarkYellow;
const C_SLIME: Color = Color::Green;
const C_ARROW: Color = Color::Cyan;
const C_FIREBALL: Color = Color::Red;
const C_EXPLOSION: Color = Color::DarkRed;
const C_ORB: Color = Color::Green;
const C_DAMAGE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// World units covered by one terminal column / row. Rows are roughly twice
/// as tall as columns, so the vertical scale is doubled.
const CELL_W: f64 = 12.0;
const CELL_H: f64 = 24.0;

// ── Camera ────────────────────────────────────────────────────────────────────

struct Viewport {
    width: u16,
    height: u16,
    /// World point drawn at the middle of the play area.
    focus: DVec2,
}

impl Viewport {
    fn new(width: u16, height: u16, focus: DVec2) -> Self {
        Viewport { width, height, focus }
    }

    /// Cell for a world point, or `None` when it falls outside the border.
    fn to_cell(&self, world: DVec2) -> Option<(u16, u16)> {
        let rel = world - self.focus;
        let col = (self.width as f64 / 2.0 + rel.x / CELL_W).floor();
        let row = (self.height as f64 / 2.0 + rel.y / CELL_H).floor();
        let inside = col >= 1.0
            && col < self.width.saturating_sub(1) as f64
            && row >= 2.0
            && row < self.height.saturating_sub(2) as f64;
        inside.then_some((col as u16, row as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &SimulationState, tick_rate_hz: u32) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(width, height, state.player.center());

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, state, width, tick_rate_hz)?;

    for orb in &state.orbs {
        put(out, &view, orb.pos, C_ORB, "·")?;
    }
    for monster in &state.monsters {
        let (glyph, color) = match monster.kind {
            MonsterKind::Bat => ("v", C_BAT),
            MonsterKind::Mummy => ("M", C_MUMMY),
            MonsterKind::Slime => ("o", C_SLIME),
        };
        put(out, &view, monster.center(), color, glyph)?;
    }
    for projectile in &state.projectiles {
        draw_projectile(out, &view, projectile)?;
    }

    let player_color = if state.player.is_invincible() { C_PLAYER_HURT } else { C_PLAYER };
    put(out, &view, state.player.center(), player_color, "@")?;

    for text in &state.floating_texts {
        let lifted = text.pos - DVec2::new(0.0, PLAYER_SIZE / 2.0);
        put(out, &view, lifted, C_DAMAGE, &text.amount.to_string())?;
    }

    draw_controls_hint(out, height)?;

    match state.run_state {
        RunState::Paused => draw_pause(out, width, height)?,
        RunState::LevelUp => draw_level_up(out, state, width, height)?,
        RunState::GameOver => draw_game_over(out, state, width, height, tick_rate_hz)?,
        RunState::Running => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn put<W: Write>(out: &mut W, view: &Viewport, world: DVec2, color: Color, glyph: &str) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_cell(world) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &SimulationState, width: u16, tick_rate_hz: u32) -> std::io::Result<()> {
    let p = &state.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(format!("HP {:>3}/{:<3} {}", p.hp, p.max_hp, hp_bar(p.hp, p.max_hp, 10))))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("  Lv{:<2} EXP {:>3}/{:<3}", p.level, p.exp, p.exp_to_next)))?;

    let weapons = if p.weapons.is_empty() {
        "None".to_string()
    } else {
        p.weapons
            .iter()
            .map(|w| format!("{} Lv{}", w.kind.name(), w.level))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let right = format!(
        "Kill {}  Time {}  ATK+{} SPD+{} HP+{}  [{}]",
        state.stats.kills,
        clock(state.stats.elapsed_ticks, tick_rate_hz),
        p.attack_stacks,
        p.speed_stacks,
        p.max_hp_stacks,
        weapons
    );
    let rx = width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STATS))?;
    out.queue(Print(right))?;

    Ok(())
}

fn hp_bar(hp: u32, max_hp: u32, cells: usize) -> String {
    let filled = if max_hp == 0 { 0 } else { (hp as usize * cells) / max_hp as usize };
    format!("[{}{}]", "█".repeat(filled), "░".repeat(cells - filled))
}

/// Elapsed run time as mm:ss.
fn clock(ticks: u64, tick_rate_hz: u32) -> String {
    let secs = ticks / tick_rate_hz.max(1) as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ── Projectiles ───────────────────────────────────────────────────────────────

fn draw_projectile<W: Write>(out: &mut W, view: &Viewport, projectile: &Projectile) -> std::io::Result<()> {
    match projectile {
        Projectile::Arrow(arrow) => {
            let glyph = if arrow.velocity.x.abs() >= arrow.velocity.y.abs() { "-" } else { "|" };
            put(out, view, arrow.pos, C_ARROW, glyph)
        }
        Projectile::Fireball(fireball) => match fireball.phase {
            FireballPhase::Traveling => put(out, view, fireball.pos, C_FIREBALL, "*"),
            FireballPhase::Exploded { .. } => {
                // Ring sampled every 30 degrees
                for step in 0..12 {
                    let angle = step as f64 * std::f64::consts::PI / 6.0;
                    let edge = fireball.pos + DVec2::from_angle(angle) * fireball.radius;
                    put(out, view, edge, C_EXPLOSION, "░")?;
                }
                put(out, view, fireball.pos, C_EXPLOSION, "✹")
            }
            FireballPhase::Finished => Ok(()),
        },
    }
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑↓←→ / WASD : Move   P / ESC : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Print each line centred, starting so the block sits mid-screen.
fn draw_centered_block<W: Write>(
    out: &mut W,
    lines: &[(String, Color)],
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Cyan),
        ("║       PAUSED       ║".to_string(), Color::Cyan),
        ("╚════════════════════╝".to_string(), Color::Cyan),
        ("P / ESC - Resume   R - Restart   Q - Quit".to_string(), Color::White),
    ];
    draw_centered_block(out, &lines, width, height)
}

fn draw_level_up<W: Write>(out: &mut W, state: &SimulationState, width: u16, height: u16) -> std::io::Result<()> {
    let mut lines = vec![
        ("╔════════════════════╗".to_string(), Color::Yellow),
        (format!("║   LEVEL UP!  Lv{:<2}  ║", state.player.level), Color::Yellow),
        ("╚════════════════════╝".to_string(), Color::Yellow),
    ];

    if state.level_up_announcement > 0 {
        draw_centered_block(out, &lines, width, height)?;
        return Ok(());
    }

    for (i, slot) in state.level_up_choices.iter().enumerate() {
        let line = match slot {
            Some(option) => (
                format!("[{}] {:<10} {}", i + 1, option.choice.label(), option.text),
                Color::White,
            ),
            None => (format!("[{}] ——  unavailable  ——", i + 1), Color::DarkGrey),
        };
        lines.push(line);
    }
    lines.push(("Press 1, 2 or 3 to choose".to_string(), C_HINT));
    draw_centered_block(out, &lines, width, height)
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &SimulationState,
    width: u16,
    height: u16,
    tick_rate_hz: u32,
) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (
            format!(
                "Level {}   Kills {}   Time {}",
                state.player.level,
                state.stats.kills,
                clock(state.stats.elapsed_ticks, tick_rate_hz)
            ),
            Color::Yellow,
        ),
        ("R - Play Again  Q - Quit".to_string(), Color::White),
    ];
    draw_centered_block(out, &lines, width, height)
}
