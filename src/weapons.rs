/// Weapon behavior table and per-tick weapon dispatch.
///
/// Each owned weapon keeps its own cooldown counter; weapons fire
/// independently in ownership order.

use glam::DVec2;
use log::trace;

use crate::entities::{DamageEvent, Monster, OwnedWeapon, Player, WeaponKind, PLAYER_SIZE};
use crate::geometry::{nearest_alive, Rect};
use crate::projectiles::{spawn_arrow, spawn_fireball, Projectile};

// ── Per-level tables (index = upgrade level - 1) ────────────────────────────

const SWORD_DAMAGE: [u32; 3] = [20, 30, 40];
const SWORD_COOLDOWN: [u32; 3] = [60, 40, 25];
const SWORD_RANGE: [f64; 3] = [60.0, 90.0, 130.0];

const BOW_DAMAGE: [u32; 3] = [18, 24, 30];
const BOW_COOLDOWN: [u32; 3] = [45, 40, 35];
const BOW_PIERCE: [u32; 3] = [2, 3, 4];
const BOW_SPEED: [f64; 3] = [10.0, 12.0, 14.0];
pub const BOW_TARGET_DISTANCE: f64 = 500.0;
/// Angle between neighbouring arrows of one volley.
pub const BOW_SPREAD_RADIANS: f64 = 10.0 * std::f64::consts::PI / 180.0;

const STAFF_DAMAGE: [u32; 3] = [30, 45, 60];
const STAFF_COOLDOWN: [u32; 3] = [90, 75, 60];
const STAFF_RADIUS: [f64; 3] = [80.0, 100.0, 130.0];
pub const STAFF_CAST_DISTANCE: f64 = 700.0;

fn tier(level: u8) -> usize {
    (level.clamp(1, 3) - 1) as usize
}

pub fn base_damage(kind: WeaponKind, level: u8) -> u32 {
    let table = match kind {
        WeaponKind::Sword => &SWORD_DAMAGE,
        WeaponKind::Bow => &BOW_DAMAGE,
        WeaponKind::Staff => &STAFF_DAMAGE,
    };
    table[tier(level)]
}

pub fn cooldown_ticks(kind: WeaponKind, level: u8) -> u32 {
    let table = match kind {
        WeaponKind::Sword => &SWORD_COOLDOWN,
        WeaponKind::Bow => &BOW_COOLDOWN,
        WeaponKind::Staff => &STAFF_COOLDOWN,
    };
    table[tier(level)]
}

pub fn sword_range(level: u8) -> f64 {
    SWORD_RANGE[tier(level)]
}

pub fn bow_pierce(level: u8) -> u32 {
    BOW_PIERCE[tier(level)]
}

pub fn bow_speed(level: u8) -> f64 {
    BOW_SPEED[tier(level)]
}

pub fn staff_radius(level: u8) -> f64 {
    STAFF_RADIUS[tier(level)]
}

/// Damage a weapon deals right now, after the attack multiplier.
pub fn scaled_damage(kind: WeaponKind, level: u8, player: &Player) -> u32 {
    (base_damage(kind, level) as f64 * player.attack_multiplier()).round() as u32
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

/// Advance every cooldown by one tick and fire the weapons that are ready.
/// New projectiles go to `spawned`; the caller decides when they join the
/// world.
pub fn update(
    player: &mut Player,
    monsters: &mut [Monster],
    spawned: &mut Vec<Projectile>,
    events: &mut Vec<DamageEvent>,
) {
    let ready: Vec<(WeaponKind, u8)> = player
        .weapons
        .iter_mut()
        .filter_map(|w| tick_cooldown(w).then_some((w.kind, w.level)))
        .collect();

    for (kind, level) in ready {
        let hit = attack(kind, level, player, monsters, spawned, events);
        trace!("{} Lv{} fired (target found: {})", kind.name(), level, hit);
    }
}

/// Returns `true` when the counter reached the threshold and was reset.
fn tick_cooldown(weapon: &mut OwnedWeapon) -> bool {
    weapon.cooldown_counter += 1;
    if weapon.cooldown_counter >= cooldown_ticks(weapon.kind, weapon.level) {
        weapon.cooldown_counter = 0;
        true
    } else {
        false
    }
}

/// Perform one attack. Returns `false` when nothing was in reach; that is a
/// normal outcome, not an error.
pub fn attack(
    kind: WeaponKind,
    level: u8,
    player: &Player,
    monsters: &mut [Monster],
    spawned: &mut Vec<Projectile>,
    events: &mut Vec<DamageEvent>,
) -> bool {
    match kind {
        WeaponKind::Sword => sword_attack(level, player, monsters, events),
        WeaponKind::Bow => bow_attack(level, player, monsters, spawned),
        WeaponKind::Staff => staff_attack(level, player, monsters, spawned),
    }
}

fn sword_attack(
    level: u8,
    player: &Player,
    monsters: &mut [Monster],
    events: &mut Vec<DamageEvent>,
) -> bool {
    let range = sword_range(level);
    let damage = scaled_damage(WeaponKind::Sword, level, player);
    let area = Rect::new(
        player.pos.x - range,
        player.pos.y - range,
        PLAYER_SIZE + range * 2.0,
        PLAYER_SIZE + range * 2.0,
    );

    let mut any = false;
    for m in monsters.iter_mut().filter(|m| m.is_alive()) {
        if area.intersects(&m.bounds()) {
            m.take_hit(damage, events);
            any = true;
        }
    }
    any
}

fn bow_attack(level: u8, player: &Player, monsters: &[Monster], spawned: &mut Vec<Projectile>) -> bool {
    let origin = player.center();
    let Some(target) = nearest_alive(monsters, origin, BOW_TARGET_DISTANCE) else {
        return false;
    };

    let aim = target.center() - origin;
    let base_angle = aim.y.atan2(aim.x);
    let damage = scaled_damage(WeaponKind::Bow, level, player);
    let count = level.clamp(1, 3) as usize;
    let half = (count - 1) as f64 / 2.0;

    for i in 0..count {
        let angle = base_angle + (i as f64 - half) * BOW_SPREAD_RADIANS;
        spawn_arrow(
            spawned,
            origin,
            DVec2::from_angle(angle),
            damage,
            bow_pierce(level),
            bow_speed(level),
        );
    }
    true
}

fn staff_attack(level: u8, player: &Player, monsters: &[Monster], spawned: &mut Vec<Projectile>) -> bool {
    let origin = player.center();
    let Some(target) = nearest_alive(monsters, origin, STAFF_CAST_DISTANCE) else {
        return false;
    };

    spawn_fireball(
        spawned,
        origin,
        target.center() - origin,
        scaled_damage(WeaponKind::Staff, level, player),
        staff_radius(level),
    );
    true
}
