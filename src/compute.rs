/// Tick driver and run-state machine.
///
/// `SimulationState` is plain data. `tick` advances it by one fixed step;
/// each stage gets only the pieces it mutates. `Simulation` bundles a state
/// with its config and the run's RNG and is what a front-end talks to.
///
/// Collections are never grown while being iterated: spawns made during a tick
/// are buffered in `Spawns` and appended when the tick commits.

use glam::DVec2;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::entities::{
    DamageEvent, ExperienceOrb, FloatingDamageText, InputSnapshot, Monster, Player, RunState,
    RunStats, WeaponKind,
};
use crate::progression::{self, ChoiceSlots, LevelUpOption};
use crate::projectiles::{self, Projectile};
use crate::spawner::Spawner;
use crate::weapons;

// ── State ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SimulationState {
    pub player: Player,
    pub monsters: Vec<Monster>,
    pub projectiles: Vec<Projectile>,
    pub orbs: Vec<ExperienceOrb>,
    pub floating_texts: Vec<FloatingDamageText>,
    pub stats: RunStats,
    pub run_state: RunState,
    /// Ticking stays inert until the first weapon has been picked.
    pub weapon_chosen: bool,
    pub spawner: Spawner,
    pub input: InputSnapshot,
    pub level_up_choices: ChoiceSlots,
    /// Ticks left before the level-up choices accept input.
    pub level_up_announcement: u32,
    /// Damage applied to monsters during the most recent tick.
    pub damage_events: Vec<DamageEvent>,
}

/// Entities created during a tick, appended once the tick's passes are done.
#[derive(Debug, Default)]
struct Spawns {
    monsters: Vec<Monster>,
    projectiles: Vec<Projectile>,
    orbs: Vec<ExperienceOrb>,
}

impl Spawns {
    fn commit(self, state: &mut SimulationState) {
        state.monsters.extend(self.monsters);
        state.projectiles.extend(self.projectiles);
        state.orbs.extend(self.orbs);
    }
}

/// A fresh run: player at the origin, no weapon yet, nothing spawned.
pub fn init_state(config: &SimConfig) -> SimulationState {
    SimulationState {
        player: Player::new(DVec2::ZERO, config.exp_threshold(1)),
        monsters: Vec::new(),
        projectiles: Vec::new(),
        orbs: Vec::new(),
        floating_texts: Vec::new(),
        stats: RunStats::default(),
        run_state: RunState::Running,
        weapon_chosen: false,
        spawner: Spawner::default(),
        input: InputSnapshot::default(),
        level_up_choices: Default::default(),
        level_up_announcement: 0,
        damage_events: Vec::new(),
    }
}

// ── Per-tick stages ──────────────────────────────────────────────────────────

/// Advance the simulation by one tick. All randomness comes through `rng`.
pub fn tick(state: &mut SimulationState, config: &SimConfig, rng: &mut impl Rng) {
    match state.run_state {
        RunState::Running if state.weapon_chosen => {}
        RunState::LevelUp => {
            state.level_up_announcement = state.level_up_announcement.saturating_sub(1);
            return;
        }
        _ => return,
    }

    state.damage_events.clear();
    state.stats.elapsed_ticks += 1;
    let mut spawns = Spawns::default();

    // ── 1. Player ────────────────────────────────────────────────────────────
    state.player.apply_input(&state.input);
    state.player.tick_invincibility();

    // ── 2. Spawner ───────────────────────────────────────────────────────────
    state
        .spawner
        .update(state.player.pos, config, rng, &mut spawns.monsters);

    // ── 3. Monsters: reap the dead, then chase + contact damage ──────────────
    reap_dead_monsters(&mut state.monsters, &mut state.stats, &mut spawns.orbs, config.orb_value);
    update_monsters(&mut state.monsters, &mut state.player);

    if state.player.is_dead() {
        spawns.commit(state);
        state.run_state = RunState::GameOver;
        info!(
            "game over: level {}, {} kills, {} ticks",
            state.player.level, state.stats.kills, state.stats.elapsed_ticks
        );
        return;
    }

    // ── 4. Experience orbs ───────────────────────────────────────────────────
    let leveled_up = update_orbs(&mut state.orbs, &mut state.player, config);

    // ── 5. Weapons ───────────────────────────────────────────────────────────
    weapons::update(
        &mut state.player,
        &mut state.monsters,
        &mut spawns.projectiles,
        &mut state.damage_events,
    );

    // ── 6. Projectiles ───────────────────────────────────────────────────────
    projectiles::update_all(&mut state.projectiles, &mut state.monsters, &mut state.damage_events);

    // ── 7. Floating damage text ──────────────────────────────────────────────
    state.floating_texts.retain_mut(|t| !t.update());
    state.floating_texts.extend(
        state
            .damage_events
            .iter()
            .map(|e| FloatingDamageText::new(e.pos, e.amount)),
    );

    spawns.commit(state);

    // ── 8. Transition check ──────────────────────────────────────────────────
    if leveled_up {
        enter_level_up(state, config, rng);
    }
}

/// Remove monsters at 0 HP. Each removal counts one kill and drops one orb at
/// the monster's center.
fn reap_dead_monsters(
    monsters: &mut Vec<Monster>,
    stats: &mut RunStats,
    orbs: &mut Vec<ExperienceOrb>,
    orb_value: u32,
) {
    monsters.retain(|m| {
        if m.is_alive() {
            return true;
        }
        stats.kills += 1;
        orbs.push(ExperienceOrb::new(m.center(), orb_value));
        false
    });
}

/// Chase the player and apply contact damage in collection order. The first
/// landed hit makes the player invincible, which blocks the rest of the tick's
/// contacts. Stops as soon as the player is dead.
fn update_monsters(monsters: &mut [Monster], player: &mut Player) {
    for m in monsters.iter_mut() {
        m.step_toward(player.pos);
        if m.bounds().intersects(&player.bounds()) {
            player.take_damage(m.contact_damage);
        }
        if player.is_dead() {
            break;
        }
    }
}

/// Attract and collect orbs. A level-up ends the pass; orbs after it wait for
/// the next tick. Banked experience from an earlier multi-level gain is
/// settled first, and if that levels up no orb is touched this tick.
fn update_orbs(orbs: &mut Vec<ExperienceOrb>, player: &mut Player, config: &SimConfig) -> bool {
    if progression::settle_deferred_level(player, config) {
        return true;
    }

    let target = player.center();
    let mut leveled_up = false;
    orbs.retain_mut(|orb| {
        if leveled_up || !orb.update(target) {
            return true;
        }
        leveled_up = progression::gain_exp(player, orb.value, config);
        false
    });
    leveled_up
}

fn enter_level_up(state: &mut SimulationState, config: &SimConfig, rng: &mut impl Rng) {
    state.level_up_choices = progression::roll_choices(&state.player, rng);
    state.level_up_announcement = config.level_up_announcement_ticks;
    state.run_state = RunState::LevelUp;
    debug!("entering level-up at level {}", state.player.level);
}

// ── External entry points ────────────────────────────────────────────────────

/// Grant the first weapon and start the run. Only valid once per run.
pub fn choose_initial_weapon(state: &mut SimulationState, kind: WeaponKind) -> bool {
    if state.weapon_chosen {
        return false;
    }
    state.player.add_or_upgrade_weapon(kind);
    state.weapon_chosen = true;
    info!("run started with {}", kind.name());
    true
}

/// `index` must name an enabled slot and the announcement must be over.
pub fn apply_level_up_choice(state: &mut SimulationState, index: usize) -> bool {
    if state.run_state != RunState::LevelUp || state.level_up_announcement > 0 {
        return false;
    }
    let Some(option) = state.level_up_choices.get(index).and_then(|slot| slot.clone()) else {
        return false;
    };
    progression::apply_choice(&mut state.player, option.choice);
    state.level_up_choices = Default::default();
    state.run_state = RunState::Running;
    true
}

pub fn request_pause(state: &mut SimulationState) -> bool {
    if state.run_state != RunState::Running {
        return false;
    }
    state.run_state = RunState::Paused;
    debug!("paused");
    true
}

pub fn request_resume(state: &mut SimulationState) -> bool {
    if state.run_state != RunState::Paused {
        return false;
    }
    state.run_state = RunState::Running;
    debug!("resumed");
    true
}

// ── Simulation context ───────────────────────────────────────────────────────

pub struct Simulation {
    config: SimConfig,
    rng: StdRng,
    state: SimulationState,
}

impl Simulation {
    /// Seeds from `config.seed`, or from OS entropy when it is unset.
    /// Out-of-range values are logged; the spawner clamps its window.
    pub fn new(config: SimConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{}", e);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = init_state(&config);
        Simulation { config, rng, state }
    }

    /// Wrap a prepared state, e.g. a hand-built scenario.
    pub fn from_state(config: SimConfig, state: SimulationState, seed: u64) -> Self {
        Simulation {
            config,
            rng: StdRng::seed_from_u64(seed),
            state,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.state.monsters
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.state.projectiles
    }

    pub fn orbs(&self) -> &[ExperienceOrb] {
        &self.state.orbs
    }

    pub fn floating_texts(&self) -> &[FloatingDamageText] {
        &self.state.floating_texts
    }

    pub fn stats(&self) -> RunStats {
        self.state.stats
    }

    /// Damage notifications from the most recent tick.
    pub fn damage_events(&self) -> &[DamageEvent] {
        &self.state.damage_events
    }

    pub fn set_input(&mut self, input: InputSnapshot) {
        self.state.input = input;
    }

    pub fn advance_tick(&mut self) {
        tick(&mut self.state, &self.config, &mut self.rng);
    }

    pub fn choose_initial_weapon(&mut self, kind: WeaponKind) -> bool {
        choose_initial_weapon(&mut self.state, kind)
    }

    pub fn request_pause(&mut self) -> bool {
        request_pause(&mut self.state)
    }

    pub fn request_resume(&mut self) -> bool {
        request_resume(&mut self.state)
    }

    /// Throw the run away and go back to weapon selection. The RNG carries on.
    pub fn request_restart_run(&mut self) {
        self.state = init_state(&self.config);
        debug!("run restarted");
    }

    pub fn offer_level_up_choices(&self) -> &[Option<LevelUpOption>] {
        &self.state.level_up_choices
    }

    /// True once the level-up banner has run out and a choice can be applied.
    pub fn level_up_choices_ready(&self) -> bool {
        self.state.run_state == RunState::LevelUp && self.state.level_up_announcement == 0
    }

    pub fn apply_level_up_choice(&mut self, index: usize) -> bool {
        apply_level_up_choice(&mut self.state, index)
    }
}
