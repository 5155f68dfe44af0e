/// Projectiles spawned by weapons and owned by the simulation.
///
/// Two shapes share one lifecycle: `update` once per tick, then the tick
/// driver drops anything whose `is_alive` turned false.

use std::collections::HashSet;

use glam::DVec2;

use crate::entities::{DamageEvent, Monster, MonsterId};
use crate::geometry::{aim_direction, Rect};

pub const ARROW_MAX_RANGE: f64 = 500.0;
pub const ARROW_WIDTH: f64 = 14.0;
pub const ARROW_HEIGHT: f64 = 4.0;

pub const FIREBALL_SPEED: f64 = 8.0;
pub const FIREBALL_MAX_TRAVEL: f64 = 200.0;
/// Ticks the explosion lingers after detonation before the fireball is gone.
pub const EXPLOSION_TICKS: u32 = 12;

// ── Arrow ────────────────────────────────────────────────────────────────────

/// Piercing bolt: hits each monster at most once, up to `hits_left` monsters.
#[derive(Clone, Debug)]
pub struct Arrow {
    pub pos: DVec2,
    pub velocity: DVec2,
    pub damage: u32,
    pub hits_left: u32,
    pub traveled: f64,
    pub max_range: f64,
    pub hit: HashSet<MonsterId>,
}

impl Arrow {
    pub fn new(origin: DVec2, direction: DVec2, damage: u32, pierce: u32, speed: f64) -> Self {
        Arrow {
            pos: origin,
            velocity: aim_direction(direction) * speed,
            damage,
            hits_left: pierce,
            traveled: 0.0,
            max_range: ARROW_MAX_RANGE,
            hit: HashSet::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hits_left > 0 && self.traveled < self.max_range
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.pos, ARROW_WIDTH, ARROW_HEIGHT)
    }

    pub fn update(&mut self, monsters: &mut [Monster], events: &mut Vec<DamageEvent>) {
        if !self.is_alive() {
            return;
        }

        self.pos += self.velocity;
        self.traveled += self.velocity.length();

        let bounds = self.bounds();
        for m in monsters.iter_mut() {
            if !m.is_alive() || self.hit.contains(&m.id) {
                continue;
            }
            if bounds.intersects(&m.bounds()) {
                m.take_hit(self.damage, events);
                self.hit.insert(m.id);
                self.hits_left -= 1;
                if self.hits_left == 0 {
                    break;
                }
            }
        }
    }
}

// ── Fireball ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireballPhase {
    Traveling,
    /// Detonated; `timer` counts ticks of the lingering blast.
    Exploded { timer: u32 },
    Finished,
}

/// Travels a fixed distance, then detonates once over a circular area.
#[derive(Clone, Debug)]
pub struct Fireball {
    pub pos: DVec2,
    pub velocity: DVec2,
    pub damage: u32,
    pub radius: f64,
    pub traveled: f64,
    pub max_travel: f64,
    pub phase: FireballPhase,
}

impl Fireball {
    pub fn new(origin: DVec2, direction: DVec2, damage: u32, radius: f64) -> Self {
        Fireball {
            pos: origin,
            velocity: aim_direction(direction) * FIREBALL_SPEED,
            damage,
            radius,
            traveled: 0.0,
            max_travel: FIREBALL_MAX_TRAVEL,
            phase: FireballPhase::Traveling,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.phase != FireballPhase::Finished
    }

    pub fn has_exploded(&self) -> bool {
        matches!(self.phase, FireballPhase::Exploded { .. })
    }

    pub fn update(&mut self, monsters: &mut [Monster], events: &mut Vec<DamageEvent>) {
        match self.phase {
            FireballPhase::Traveling => {
                self.pos += self.velocity;
                self.traveled += self.velocity.length();
                if self.traveled >= self.max_travel {
                    self.detonate(monsters, events);
                }
            }
            FireballPhase::Exploded { timer } => {
                let timer = timer + 1;
                self.phase = if timer > EXPLOSION_TICKS {
                    FireballPhase::Finished
                } else {
                    FireballPhase::Exploded { timer }
                };
            }
            FireballPhase::Finished => {}
        }
    }

    /// The only place a fireball deals damage; the phase change guarantees it
    /// runs once.
    fn detonate(&mut self, monsters: &mut [Monster], events: &mut Vec<DamageEvent>) {
        self.phase = FireballPhase::Exploded { timer: 0 };
        let r2 = self.radius * self.radius;
        for m in monsters.iter_mut().filter(|m| m.is_alive()) {
            if m.center().distance_squared(self.pos) <= r2 {
                m.take_hit(self.damage, events);
            }
        }
    }
}

// ── Shared lifecycle ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum Projectile {
    Arrow(Arrow),
    Fireball(Fireball),
}

impl Projectile {
    pub fn pos(&self) -> DVec2 {
        match self {
            Projectile::Arrow(a) => a.pos,
            Projectile::Fireball(f) => f.pos,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            Projectile::Arrow(a) => a.is_alive(),
            Projectile::Fireball(f) => f.is_alive(),
        }
    }

    pub fn update(&mut self, monsters: &mut [Monster], events: &mut Vec<DamageEvent>) {
        match self {
            Projectile::Arrow(a) => a.update(monsters, events),
            Projectile::Fireball(f) => f.update(monsters, events),
        }
    }
}

pub fn spawn_arrow(
    out: &mut Vec<Projectile>,
    origin: DVec2,
    direction: DVec2,
    damage: u32,
    pierce: u32,
    speed: f64,
) {
    out.push(Projectile::Arrow(Arrow::new(origin, direction, damage, pierce, speed)));
}

pub fn spawn_fireball(
    out: &mut Vec<Projectile>,
    origin: DVec2,
    direction: DVec2,
    damage: u32,
    radius: f64,
) {
    out.push(Projectile::Fireball(Fireball::new(origin, direction, damage, radius)));
}

/// Advance every projectile one tick, then drop the ones that expired.
pub fn update_all(
    projectiles: &mut Vec<Projectile>,
    monsters: &mut [Monster],
    events: &mut Vec<DamageEvent>,
) {
    for p in projectiles.iter_mut() {
        p.update(monsters, events);
    }
    projectiles.retain(Projectile::is_alive);
}
