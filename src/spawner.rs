/// Timed monster creation around the player.

use glam::DVec2;
use log::trace;
use rand::Rng;

use crate::config::SimConfig;
use crate::entities::{Monster, MonsterId, MonsterKind};

#[derive(Clone, Debug, Default)]
pub struct Spawner {
    /// Ticks since the last spawn.
    pub timer: u32,
    next_id: u64,
}

impl Spawner {
    fn allocate_id(&mut self) -> MonsterId {
        let id = MonsterId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Count one tick; every `spawn_interval_ticks` emit one monster into `out`.
    pub fn update(&mut self, player_pos: DVec2, config: &SimConfig, rng: &mut impl Rng, out: &mut Vec<Monster>) {
        self.timer += 1;
        if self.timer < config.spawn_interval_ticks {
            return;
        }
        self.timer = 0;
        let monster = self.spawn_around(player_pos, config, rng);
        trace!("spawned {:?} #{} at {}", monster.kind, monster.id.0, monster.pos);
        out.push(monster);
    }

    /// Independent uniform offsets per axis: the spawn window is a rectangle,
    /// not a disk. Half extents below 1 are treated as 1.
    pub fn spawn_around(&mut self, player_pos: DVec2, config: &SimConfig, rng: &mut impl Rng) -> Monster {
        let kind = MonsterKind::ALL[rng.gen_range(0..MonsterKind::ALL.len())];
        let half_w = config.spawn_half_width.max(1);
        let half_h = config.spawn_half_height.max(1);
        let dx = rng.gen_range(-half_w..half_w);
        let dy = rng.gen_range(-half_h..half_h);
        let pos = player_pos + DVec2::new(dx as f64, dy as f64);
        Monster::new(self.allocate_id(), kind, pos)
    }
}
