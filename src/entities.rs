/// Entity types and the rules that only touch a single entity.
///
/// Anything that needs two collections at once (targeting, collisions,
/// projectile hits) lives in the system modules instead.

use glam::DVec2;

use crate::geometry::Rect;

// ── Tuning ───────────────────────────────────────────────────────────────────

pub const PLAYER_SIZE: f64 = 40.0;
pub const PLAYER_BASE_SPEED: f64 = 4.0;
pub const PLAYER_BASE_MAX_HP: u32 = 100;
/// Ticks of damage immunity after a successful hit (1 s at 60 Hz).
pub const INVINCIBLE_TICKS: u32 = 60;
pub const MAX_WEAPON_LEVEL: u8 = 3;

const ATTACK_BONUS_PER_STACK: f64 = 0.2;
const SPEED_BONUS_PER_STACK: f64 = 1.0;
const MAX_HP_BONUS_PER_STACK: u32 = 20;

pub const MONSTER_SIZE: f64 = 30.0;
pub const MONSTER_SPEED: f64 = 1.0;

pub const ORB_ATTRACT_RADIUS: f64 = 80.0;
pub const ORB_PICKUP_RADIUS: f64 = 16.0;
const ORB_BASE_SPEED: f64 = 2.0;
const ORB_EXTRA_SPEED: f64 = 4.0;

pub const DAMAGE_TEXT_LIFE: u32 = 40;
const DAMAGE_TEXT_RISE: f64 = 1.0;
const DAMAGE_TEXT_FADE: f32 = 0.03;

// ── Kinds ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    /// Melee pulse around the player.
    Sword,
    /// Fan of piercing arrows at the nearest monster.
    Bow,
    /// Fireball that detonates after a fixed flight.
    Staff,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Sword, WeaponKind::Bow, WeaponKind::Staff];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Sword => "Sword",
            WeaponKind::Bow => "Bow",
            WeaponKind::Staff => "Staff",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonsterKind {
    Bat,
    Mummy,
    Slime,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 3] = [MonsterKind::Bat, MonsterKind::Mummy, MonsterKind::Slime];

    pub fn max_hp(&self) -> u32 {
        match self {
            MonsterKind::Bat => 40,
            MonsterKind::Mummy => 70,
            MonsterKind::Slime => 50,
        }
    }

    pub fn contact_damage(&self) -> u32 {
        match self {
            MonsterKind::Bat => 8,
            MonsterKind::Mummy => 12,
            MonsterKind::Slime => 10,
        }
    }
}

// ── Run-level records ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    LevelUp,
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub kills: u32,
    pub elapsed_ticks: u64,
}

/// Directional keys held during the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Emitted whenever damage actually lands on a monster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageEvent {
    pub pos: DVec2,
    pub amount: u32,
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct OwnedWeapon {
    pub kind: WeaponKind,
    /// Upgrade level, 1..=MAX_WEAPON_LEVEL.
    pub level: u8,
    pub cooldown_counter: u32,
}

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner in world space.
    pub pos: DVec2,
    pub speed: f64,
    pub hp: u32,
    pub max_hp: u32,
    /// Remaining ticks of damage immunity; invincible while non-zero.
    pub invincible_ticks: u32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub attack_stacks: u32,
    pub speed_stacks: u32,
    pub max_hp_stacks: u32,
    pub weapons: Vec<OwnedWeapon>,
}

impl Player {
    pub fn new(pos: DVec2, exp_to_next: u32) -> Self {
        Player {
            pos,
            speed: PLAYER_BASE_SPEED,
            hp: PLAYER_BASE_MAX_HP,
            max_hp: PLAYER_BASE_MAX_HP,
            invincible_ticks: 0,
            level: 1,
            exp: 0,
            exp_to_next,
            attack_stacks: 0,
            speed_stacks: 0,
            max_hp_stacks: 0,
            weapons: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    pub fn center(&self) -> DVec2 {
        self.pos + DVec2::splat(PLAYER_SIZE / 2.0)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Each held key moves a full `speed` on its axis, so diagonals are faster.
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        if input.up {
            self.pos.y -= self.speed;
        }
        if input.down {
            self.pos.y += self.speed;
        }
        if input.left {
            self.pos.x -= self.speed;
        }
        if input.right {
            self.pos.x += self.speed;
        }
    }

    pub fn tick_invincibility(&mut self) {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
    }

    /// Returns `true` if the hit landed (the player was not invincible).
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        self.invincible_ticks = INVINCIBLE_TICKS;
        true
    }

    pub fn attack_multiplier(&self) -> f64 {
        1.0 + ATTACK_BONUS_PER_STACK * self.attack_stacks as f64
    }

    pub fn upgrade_attack(&mut self) {
        self.attack_stacks += 1;
    }

    pub fn upgrade_speed(&mut self) {
        self.speed_stacks += 1;
        self.recalc_stats();
    }

    /// Raises max HP and heals by the same amount.
    pub fn upgrade_max_hp(&mut self) {
        let old_max = self.max_hp;
        self.max_hp_stacks += 1;
        self.recalc_stats();
        let gained = self.max_hp - old_max;
        self.hp = (self.hp + gained).min(self.max_hp);
    }

    fn recalc_stats(&mut self) {
        self.speed = PLAYER_BASE_SPEED + SPEED_BONUS_PER_STACK * self.speed_stacks as f64;
        self.max_hp = PLAYER_BASE_MAX_HP + MAX_HP_BONUS_PER_STACK * self.max_hp_stacks;
        self.hp = self.hp.min(self.max_hp);
    }

    pub fn weapon_level(&self, kind: WeaponKind) -> Option<u8> {
        self.weapons.iter().find(|w| w.kind == kind).map(|w| w.level)
    }

    /// Unowned kinds can always be acquired; owned ones until the ceiling.
    pub fn can_upgrade_weapon(&self, kind: WeaponKind) -> bool {
        self.weapon_level(kind).map_or(true, |lvl| lvl < MAX_WEAPON_LEVEL)
    }

    /// Acquire `kind` at level 1, or raise its level (clamped at the ceiling).
    pub fn add_or_upgrade_weapon(&mut self, kind: WeaponKind) {
        if let Some(w) = self.weapons.iter_mut().find(|w| w.kind == kind) {
            w.level = (w.level + 1).min(MAX_WEAPON_LEVEL);
            return;
        }
        self.weapons.push(OwnedWeapon {
            kind,
            level: 1,
            cooldown_counter: 0,
        });
    }
}

// ── Monster ──────────────────────────────────────────────────────────────────

/// Stable identity of a monster within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonsterId(pub u64);

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    /// Top-left corner in world space.
    pub pos: DVec2,
    pub hp: u32,
    pub max_hp: u32,
    pub contact_damage: u32,
    pub speed: f64,
}

impl Monster {
    pub fn new(id: MonsterId, kind: MonsterKind, pos: DVec2) -> Self {
        Monster {
            id,
            kind,
            pos,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            contact_damage: kind.contact_damage(),
            speed: MONSTER_SPEED,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, MONSTER_SIZE, MONSTER_SIZE)
    }

    pub fn center(&self) -> DVec2 {
        self.pos + DVec2::splat(MONSTER_SIZE / 2.0)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Chebyshev step: each axis closes up to `speed` on its own.
    pub fn step_toward(&mut self, target: DVec2) {
        let delta = target - self.pos;
        self.pos.x += delta.x.signum() * delta.x.abs().min(self.speed);
        self.pos.y += delta.y.signum() * delta.y.abs().min(self.speed);
    }

    /// Applies a hit and records it in `events`. Dead monsters ignore hits.
    pub fn take_hit(&mut self, amount: u32, events: &mut Vec<DamageEvent>) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        events.push(DamageEvent {
            pos: self.pos,
            amount,
        });
        true
    }
}

// ── Pickups and effects ──────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ExperienceOrb {
    /// Center in world space.
    pub pos: DVec2,
    pub value: u32,
}

impl ExperienceOrb {
    pub fn new(pos: DVec2, value: u32) -> Self {
        ExperienceOrb { pos, value }
    }

    /// Drifts toward `target` once inside the attraction radius, faster the
    /// closer it gets. Returns `true` when the orb is close enough to collect.
    pub fn update(&mut self, target: DVec2) -> bool {
        let delta = target - self.pos;
        let dist = delta.length();

        if dist <= ORB_PICKUP_RADIUS {
            return true;
        }

        if dist <= ORB_ATTRACT_RADIUS {
            let t = 1.0 - dist / ORB_ATTRACT_RADIUS;
            let speed = ORB_BASE_SPEED + t * ORB_EXTRA_SPEED;
            self.pos += delta / dist * speed;
        }

        false
    }
}

#[derive(Clone, Debug)]
pub struct FloatingDamageText {
    pub pos: DVec2,
    pub amount: u32,
    pub life: u32,
    pub alpha: f32,
}

impl FloatingDamageText {
    pub fn new(pos: DVec2, amount: u32) -> Self {
        FloatingDamageText {
            pos,
            amount,
            life: DAMAGE_TEXT_LIFE,
            alpha: 1.0,
        }
    }

    /// Rise and fade by one tick. Returns `true` once fully expired.
    pub fn update(&mut self) -> bool {
        self.pos.y -= DAMAGE_TEXT_RISE;
        self.alpha -= DAMAGE_TEXT_FADE;
        self.life = self.life.saturating_sub(1);
        self.life == 0 || self.alpha <= 0.0
    }
}
