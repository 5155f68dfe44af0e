use std::collections::HashSet;

use glam::DVec2;

use survivor_sim::compute::{choose_initial_weapon, init_state, Simulation, SimulationState};
use survivor_sim::entities::*;
use survivor_sim::progression::{LevelUpChoice, LevelUpOption};
use survivor_sim::projectiles::{Arrow, Projectile};
use survivor_sim::SimConfig;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Seeded config whose spawner never fires within a test's horizon.
fn quiet_config() -> SimConfig {
    SimConfig {
        seed: Some(42),
        spawn_interval_ticks: 10_000,
        ..SimConfig::default()
    }
}

fn make_state(kind: WeaponKind) -> SimulationState {
    let mut state = init_state(&quiet_config());
    choose_initial_weapon(&mut state, kind);
    state
}

fn make_sim(state: SimulationState) -> Simulation {
    Simulation::from_state(quiet_config(), state, 42)
}

fn monster(id: u64, kind: MonsterKind, pos: DVec2) -> Monster {
    Monster::new(MonsterId(id), kind, pos)
}

fn ticks(sim: &mut Simulation, n: usize) {
    for _ in 0..n {
        sim.advance_tick();
    }
}

/// Let the level-up banner run out and take the first slot.
fn resolve_level_up(sim: &mut Simulation) {
    assert_eq!(sim.run_state(), RunState::LevelUp);
    let banner = sim.config().level_up_announcement_ticks as usize;
    ticks(sim, banner);
    assert!(sim.apply_level_up_choice(0));
}

// ── Run state ─────────────────────────────────────────────────────────────────

#[test]
fn ticking_is_inert_until_a_weapon_is_chosen() {
    let mut sim = Simulation::new(SimConfig { seed: Some(1), ..SimConfig::default() });
    ticks(&mut sim, 120);
    assert_eq!(sim.stats().elapsed_ticks, 0);
    assert!(sim.monsters().is_empty());

    assert!(sim.choose_initial_weapon(WeaponKind::Sword));
    assert!(!sim.choose_initial_weapon(WeaponKind::Bow)); // only once per run
    sim.advance_tick();
    assert_eq!(sim.stats().elapsed_ticks, 1);
    assert_eq!(sim.player().weapons.len(), 1);
}

#[test]
fn pause_freezes_the_world() {
    let mut sim = make_sim(make_state(WeaponKind::Sword));
    sim.advance_tick();
    assert!(sim.request_pause());
    assert!(!sim.request_pause());

    sim.set_input(InputSnapshot { right: true, ..Default::default() });
    ticks(&mut sim, 10);
    assert_eq!(sim.stats().elapsed_ticks, 1);
    assert_eq!(sim.player().pos, DVec2::ZERO);

    assert!(sim.request_resume());
    assert!(!sim.request_resume());
    sim.advance_tick();
    assert_eq!(sim.stats().elapsed_ticks, 2);
    assert_eq!(sim.player().pos, DVec2::new(4.0, 0.0));
}

#[test]
fn restart_discards_the_run() {
    let mut state = make_state(WeaponKind::Bow);
    state.monsters.push(monster(1, MonsterKind::Bat, DVec2::new(300.0, 0.0)));
    let mut sim = make_sim(state);
    ticks(&mut sim, 30);
    sim.request_restart_run();

    let s = sim.state();
    assert!(!s.weapon_chosen);
    assert_eq!(s.run_state, RunState::Running);
    assert_eq!(s.stats, RunStats::default());
    assert!(s.monsters.is_empty());
    assert!(s.player.weapons.is_empty());
    assert_eq!(s.player.pos, DVec2::ZERO);
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawner_emits_one_monster_every_sixty_ticks() {
    let config = SimConfig { seed: Some(42), ..SimConfig::default() };
    let mut sim = Simulation::new(config);
    sim.choose_initial_weapon(WeaponKind::Bow);

    ticks(&mut sim, 59);
    assert!(sim.monsters().is_empty());
    sim.advance_tick();
    assert_eq!(sim.monsters().len(), 1);

    // Not yet moved: it joined the world as the tick committed
    let m = &sim.monsters()[0];
    assert!((-800.0..800.0).contains(&m.pos.x));
    assert!((-600.0..600.0).contains(&m.pos.y));
    assert_eq!(m.hp, m.kind.max_hp());
}

#[test]
fn zero_spawn_window_still_spawns() {
    let config = SimConfig {
        seed: Some(42),
        spawn_half_width: 0,
        spawn_half_height: 0,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config);
    sim.choose_initial_weapon(WeaponKind::Bow);
    ticks(&mut sim, 60);
    assert_eq!(sim.monsters().len(), 1);
    assert!(sim.monsters()[0].pos.x.abs() <= 1.0);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = Simulation::new(SimConfig { seed: Some(9), ..SimConfig::default() });
        sim.choose_initial_weapon(WeaponKind::Staff);
        ticks(&mut sim, 600);
        sim.monsters().iter().map(|m| (m.kind, m.pos)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

// ── Contact damage ────────────────────────────────────────────────────────────

#[test]
fn only_first_contact_lands_per_tick() {
    let mut state = make_state(WeaponKind::Sword);
    state.monsters.push(monster(1, MonsterKind::Bat, DVec2::new(10.0, 10.0)));
    state.monsters.push(monster(2, MonsterKind::Mummy, DVec2::new(10.0, 10.0)));
    let mut sim = make_sim(state);
    sim.advance_tick();

    // Bat (8) landed first; the Mummy hit the invincibility window
    assert_eq!(sim.player().hp, 92);
    assert!(sim.player().is_invincible());
}

#[test]
fn game_over_stops_the_tick_immediately() {
    let mut state = make_state(WeaponKind::Sword);
    state.player.hp = 5;
    state.monsters.push(monster(1, MonsterKind::Mummy, DVec2::new(10.0, 10.0)));
    state.monsters.push(monster(2, MonsterKind::Bat, DVec2::new(500.0, 500.0)));
    state
        .projectiles
        .push(Projectile::Arrow(Arrow::new(DVec2::new(300.0, 300.0), DVec2::X, 18, 2, 10.0)));
    state.orbs.push(ExperienceOrb::new(DVec2::new(60.0, 20.0), 10));
    let mut sim = make_sim(state);
    sim.advance_tick();

    assert_eq!(sim.run_state(), RunState::GameOver);
    assert_eq!(sim.player().hp, 0);
    // Nothing after the fatal contact ran
    assert_eq!(sim.monsters()[1].pos, DVec2::new(500.0, 500.0));
    assert_eq!(sim.projectiles()[0].pos(), DVec2::new(300.0, 300.0));
    assert_eq!(sim.orbs()[0].pos, DVec2::new(60.0, 20.0));
    assert_eq!(sim.player().weapons[0].cooldown_counter, 0);

    ticks(&mut sim, 5);
    assert_eq!(sim.stats().elapsed_ticks, 1);
}

// ── Kills and orbs ────────────────────────────────────────────────────────────

#[test]
fn kill_is_counted_once_and_drops_one_orb() {
    let mut state = make_state(WeaponKind::Sword);
    state.player.weapons[0].cooldown_counter = 59;
    let mut slime = monster(1, MonsterKind::Slime, DVec2::new(60.0, 0.0));
    slime.hp = 20;
    state.monsters.push(slime);
    // Trails the slime; reaches it only after the sword has killed it
    state
        .projectiles
        .push(Projectile::Arrow(Arrow::new(DVec2::new(70.0, 15.0), DVec2::X, 18, 2, 1.0)));
    let mut sim = make_sim(state);

    sim.advance_tick();
    assert_eq!(sim.damage_events().len(), 1);
    assert_eq!(sim.damage_events()[0].amount, 20);
    assert_eq!(sim.floating_texts().len(), 1);
    assert_eq!(sim.stats().kills, 0);
    assert_eq!(sim.monsters().len(), 1); // removed next tick

    sim.advance_tick();
    assert!(sim.damage_events().is_empty());
    assert_eq!(sim.stats().kills, 1);
    assert!(sim.monsters().is_empty());
    assert_eq!(sim.orbs().len(), 1);
    // Dropped at the monster's center after its one step left
    assert_eq!(sim.orbs()[0].pos, DVec2::new(74.0, 15.0));
    assert_eq!(sim.orbs()[0].value, 10);
}

#[test]
fn orb_pickup_enters_level_up_and_leaves_the_rest() {
    let mut state = make_state(WeaponKind::Sword);
    state.player.exp = 45;
    state.orbs.push(ExperienceOrb::new(DVec2::new(20.0, 20.0), 10));
    state.orbs.push(ExperienceOrb::new(DVec2::new(20.0, 20.0), 10));
    let mut sim = make_sim(state);
    sim.advance_tick();

    assert_eq!(sim.run_state(), RunState::LevelUp);
    assert_eq!(sim.player().level, 2);
    assert_eq!(sim.player().exp, 5);
    assert_eq!(sim.orbs().len(), 1);
    assert!(sim.offer_level_up_choices().iter().all(Option::is_some));
}

#[test]
fn banked_exp_levels_again_on_the_next_tick() {
    let mut state = make_state(WeaponKind::Staff);
    state.orbs.push(ExperienceOrb::new(DVec2::new(20.0, 20.0), 200));
    let mut sim = make_sim(state);

    sim.advance_tick();
    assert_eq!((sim.player().level, sim.player().exp), (2, 150));
    resolve_level_up(&mut sim);

    sim.advance_tick();
    assert_eq!((sim.player().level, sim.player().exp), (3, 85));
    resolve_level_up(&mut sim);

    sim.advance_tick();
    assert_eq!((sim.player().level, sim.player().exp), (4, 5));
    resolve_level_up(&mut sim);

    sim.advance_tick();
    assert_eq!(sim.run_state(), RunState::Running);
    assert_eq!(sim.player().level, 4);
}

#[test]
fn orb_at_max_level_keeps_the_run_going() {
    let config = SimConfig { max_level: 2, ..quiet_config() };
    let mut state = init_state(&config);
    choose_initial_weapon(&mut state, WeaponKind::Sword);
    state.player.level = 2;
    state.orbs.push(ExperienceOrb::new(DVec2::new(20.0, 20.0), 500));
    let mut sim = Simulation::from_state(config, state, 42);
    sim.advance_tick();

    // Collected, but no level-up offer
    assert!(sim.orbs().is_empty());
    assert_eq!(sim.run_state(), RunState::Running);
    assert_eq!(sim.player().level, 2);
    assert_eq!(sim.player().exp, 0);
    assert!(sim.offer_level_up_choices().iter().all(Option::is_none));
}

// ── Level-up choices ──────────────────────────────────────────────────────────

#[test]
fn announcement_gates_the_choice() {
    let mut state = make_state(WeaponKind::Sword);
    state.player.exp = 45;
    state.orbs.push(ExperienceOrb::new(DVec2::new(20.0, 20.0), 10));
    let mut sim = make_sim(state);
    sim.advance_tick();

    assert!(!sim.level_up_choices_ready());
    assert!(!sim.apply_level_up_choice(0));
    ticks(&mut sim, 59);
    assert!(!sim.level_up_choices_ready());
    sim.advance_tick();
    assert!(sim.level_up_choices_ready());
    // The world stood still meanwhile
    assert_eq!(sim.stats().elapsed_ticks, 1);

    assert!(sim.apply_level_up_choice(2));
    assert_eq!(sim.run_state(), RunState::Running);
    assert!(sim.offer_level_up_choices().iter().all(Option::is_none));
}

#[test]
fn disabled_or_out_of_range_slot_is_ignored() {
    let mut state = make_state(WeaponKind::Sword);
    state.run_state = RunState::LevelUp;
    state.level_up_choices = [
        Some(LevelUpOption {
            choice: LevelUpChoice::Attack,
            text: "Damage +20% (stack 1)".into(),
        }),
        None,
        None,
    ];
    let mut sim = make_sim(state);

    assert!(!sim.apply_level_up_choice(1));
    assert!(!sim.apply_level_up_choice(7));
    assert_eq!(sim.run_state(), RunState::LevelUp);

    assert!(sim.apply_level_up_choice(0));
    assert_eq!(sim.player().attack_stacks, 1);
}

#[test]
fn choice_outside_level_up_is_rejected() {
    let mut sim = make_sim(make_state(WeaponKind::Sword));
    assert!(!sim.apply_level_up_choice(0));
    assert!(!sim.level_up_choices_ready());
}

// ── Projectile timing ─────────────────────────────────────────────────────────

#[test]
fn new_projectiles_wait_one_tick_before_moving() {
    let mut state = make_state(WeaponKind::Bow);
    state.player.weapons[0].cooldown_counter = 44;
    let mut target = monster(1, MonsterKind::Mummy, DVec2::new(300.0, 5.0));
    target.hp = 10_000;
    state.monsters.push(target);
    let mut sim = make_sim(state);

    sim.advance_tick();
    assert_eq!(sim.projectiles().len(), 1);
    let Projectile::Arrow(arrow) = &sim.projectiles()[0] else {
        panic!("bow spawned a fireball");
    };
    assert_eq!(arrow.traveled, 0.0);

    sim.advance_tick();
    let Projectile::Arrow(arrow) = &sim.projectiles()[0] else {
        panic!("bow spawned a fireball");
    };
    assert_eq!(arrow.traveled, 10.0);
}

// ── Long run ──────────────────────────────────────────────────────────────────

#[test]
fn long_seeded_run_keeps_invariants() {
    let config = SimConfig { seed: Some(7), ..SimConfig::default() };
    let max_level = config.max_level;
    let mut sim = Simulation::new(config);
    sim.choose_initial_weapon(WeaponKind::Sword);

    let pattern = [
        InputSnapshot { up: true, ..Default::default() },
        InputSnapshot { right: true, ..Default::default() },
        InputSnapshot { down: true, ..Default::default() },
        InputSnapshot { left: true, ..Default::default() },
    ];

    for i in 0..5000 {
        sim.set_input(pattern[(i / 90) % pattern.len()]);
        sim.advance_tick();
        if sim.level_up_choices_ready() {
            assert!(sim.apply_level_up_choice(i % 3));
        }

        let p = sim.player();
        assert!(p.hp <= p.max_hp);
        assert!(p.level >= 1 && p.level <= max_level);
        for w in &p.weapons {
            assert!((1..=MAX_WEAPON_LEVEL).contains(&w.level));
        }
        let kinds: HashSet<WeaponKind> = p.weapons.iter().map(|w| w.kind).collect();
        assert_eq!(kinds.len(), p.weapons.len());
        assert!(sim.monsters().iter().all(|m| m.hp <= m.max_hp));

        if sim.run_state() == RunState::GameOver {
            assert_eq!(sim.player().hp, 0);
            break;
        }
    }
}
