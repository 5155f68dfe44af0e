/// Axis-aligned boxes, aim vectors and nearest-target search.
///
/// Boxes are anchored at their top-left corner, the same convention every
/// sized entity in the world uses.

use glam::DVec2;

use crate::entities::Monster;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// Box of the given size whose center sits at `center`.
    pub fn centered(center: DVec2, w: f64, h: f64) -> Self {
        Rect {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: boxes that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Unit vector along `v`, or +X when `v` has no usable length.
pub fn aim_direction(v: DVec2) -> DVec2 {
    v.normalize_or(DVec2::X)
}

/// Nearest alive monster whose center lies within `max_distance` of `origin`.
///
/// Distances are compared squared. A later monster has to be strictly closer
/// to replace the current pick, so on ties the first one in collection order
/// wins.
pub fn nearest_alive(monsters: &[Monster], origin: DVec2, max_distance: f64) -> Option<&Monster> {
    let max_d2 = max_distance * max_distance;
    let mut best: Option<(&Monster, f64)> = None;

    for m in monsters.iter().filter(|m| m.is_alive()) {
        let d2 = m.center().distance_squared(origin);
        if d2 > max_d2 {
            continue;
        }
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((m, d2)),
        }
    }

    best.map(|(m, _)| m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn centered_rect_round_trips_center() {
        let r = Rect::centered(DVec2::new(5.0, -3.0), 14.0, 4.0);
        assert_eq!(r.x, -2.0);
        assert_eq!(r.y, -5.0);
        assert_eq!(r.center(), DVec2::new(5.0, -3.0));
    }

    #[test]
    fn zero_aim_falls_back_to_unit_x() {
        assert_eq!(aim_direction(DVec2::ZERO), DVec2::X);
        let d = aim_direction(DVec2::new(3.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-12);
    }
}
