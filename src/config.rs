/// Run tuning. Every field has a default matching the stock game, so a config
/// file only needs the keys it wants to change.

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Seed for spawn positions and level-up shuffles. `None` draws one from
    /// the OS at startup.
    pub seed: Option<u64>,
    pub tick_rate_hz: u32,
    pub spawn_interval_ticks: u32,
    /// Spawn offsets are drawn from `[-half, half)` on each axis.
    pub spawn_half_width: i32,
    pub spawn_half_height: i32,
    /// Ticks the level-up banner shows before choices accept input.
    pub level_up_announcement_ticks: u32,
    pub max_level: u32,
    pub exp_base: u32,
    pub exp_increment: u32,
    pub orb_value: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: None,
            tick_rate_hz: 60,
            spawn_interval_ticks: 60,
            spawn_half_width: 800,
            spawn_half_height: 600,
            level_up_announcement_ticks: 60,
            max_level: 20,
            exp_base: 50,
            exp_increment: 15,
            orb_value: 10,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let checks: [(&'static str, bool, &'static str); 5] = [
            ("tick_rate_hz", self.tick_rate_hz > 0, "greater than 0"),
            ("spawn_interval_ticks", self.spawn_interval_ticks > 0, "greater than 0"),
            ("spawn_half_width", self.spawn_half_width > 0, "greater than 0"),
            ("spawn_half_height", self.spawn_half_height > 0, "greater than 0"),
            ("max_level", self.max_level >= 1, "at least 1"),
        ];
        match checks.iter().find(|(_, ok, _)| !ok) {
            Some(&(key, _, expected)) => Err(Error::ConfigValue { key, expected }),
            None => Ok(()),
        }
    }

    /// Experience needed to go from `level` to `level + 1`.
    pub fn exp_threshold(&self, level: u32) -> u32 {
        self.exp_base + level.saturating_sub(1) * self.exp_increment
    }
}
