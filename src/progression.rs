/// Experience, the level curve and the three-slot level-up offer.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SimConfig;
use crate::entities::{Player, WeaponKind};

pub const CHOICE_SLOTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelUpChoice {
    Attack,
    Speed,
    MaxHp,
    Weapon(WeaponKind),
}

impl LevelUpChoice {
    pub fn label(&self) -> &'static str {
        match self {
            LevelUpChoice::Attack => "Attack Up",
            LevelUpChoice::Speed => "Swift Feet",
            LevelUpChoice::MaxHp => "Vitality",
            LevelUpChoice::Weapon(kind) => kind.name(),
        }
    }

    /// One-line effect summary as seen from the player's current build.
    pub fn description(&self, player: &Player) -> String {
        match self {
            LevelUpChoice::Attack => format!("Damage +20% (stack {})", player.attack_stacks + 1),
            LevelUpChoice::Speed => format!("Move speed +1 (stack {})", player.speed_stacks + 1),
            LevelUpChoice::MaxHp => format!("Max HP +20 (stack {})", player.max_hp_stacks + 1),
            LevelUpChoice::Weapon(kind) => match player.weapon_level(*kind) {
                Some(level) => format!("{} Lv{} -> Lv{}", kind.name(), level, level + 1),
                None => format!("New weapon: {}", kind.name()),
            },
        }
    }
}

/// An offered choice together with the text shown for it.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelUpOption {
    pub choice: LevelUpChoice,
    pub text: String,
}

pub type ChoiceSlots = [Option<LevelUpOption>; CHOICE_SLOTS];

// ── Experience ───────────────────────────────────────────────────────────────

/// Add experience and perform at most one level-up. Any surplus that already
/// covers the next threshold stays banked for `settle_deferred_level`.
/// No-op at max level.
pub fn gain_exp(player: &mut Player, amount: u32, config: &SimConfig) -> bool {
    if player.level >= config.max_level {
        return false;
    }
    player.exp += amount;
    level_up_once(player, config)
}

/// Consume one level's worth of banked experience, if there is enough.
pub fn settle_deferred_level(player: &mut Player, config: &SimConfig) -> bool {
    level_up_once(player, config)
}

fn level_up_once(player: &mut Player, config: &SimConfig) -> bool {
    if player.level >= config.max_level || player.exp < player.exp_to_next {
        return false;
    }
    player.exp -= player.exp_to_next;
    player.level += 1;
    player.exp_to_next = config.exp_threshold(player.level);
    if player.level >= config.max_level {
        player.exp = 0;
    }
    debug!("level up -> {} (exp {}/{})", player.level, player.exp, player.exp_to_next);
    true
}

// ── Choice offer ─────────────────────────────────────────────────────────────

/// Every choice that may currently be offered: the three passives, plus each
/// weapon kind that is unowned or below the upgrade ceiling.
pub fn choice_pool(player: &Player) -> Vec<LevelUpChoice> {
    let mut pool = vec![LevelUpChoice::Attack, LevelUpChoice::Speed, LevelUpChoice::MaxHp];
    pool.extend(
        WeaponKind::ALL
            .into_iter()
            .filter(|kind| player.can_upgrade_weapon(*kind))
            .map(LevelUpChoice::Weapon),
    );
    pool
}

/// Shuffle the pool and fill up to three slots; slots beyond the pool stay
/// `None`.
pub fn roll_choices(player: &Player, rng: &mut impl Rng) -> ChoiceSlots {
    let mut pool = choice_pool(player);
    pool.shuffle(rng);

    let mut slots: ChoiceSlots = Default::default();
    for (slot, choice) in slots.iter_mut().zip(pool) {
        *slot = Some(LevelUpOption {
            choice,
            text: choice.description(player),
        });
    }
    slots
}

pub fn apply_choice(player: &mut Player, choice: LevelUpChoice) {
    match choice {
        LevelUpChoice::Attack => player.upgrade_attack(),
        LevelUpChoice::Speed => player.upgrade_speed(),
        LevelUpChoice::MaxHp => player.upgrade_max_hp(),
        LevelUpChoice::Weapon(kind) => player.add_or_upgrade_weapon(kind),
    }
    debug!("applied level-up choice {:?}", choice);
}
