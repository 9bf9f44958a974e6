//! Axis-aligned collision between the player and static platforms
//!
//! The player moves on both axes first, then every overlapping platform is
//! classified by comparing the player's previous edges against it: a landing
//! (came from above while falling), a ceiling bump (came from below while
//! rising) or a lateral push (anything else).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Platform;

/// Slack when comparing the previous edge against a platform face
const EDGE_TOLERANCE: f32 = 0.5;

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle with top-left corner `pos` and extent `size`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Shift horizontally
    pub fn offset_x(&self, dx: f32) -> Self {
        Self::new(self.x + dx, self.y, self.w, self.h)
    }
}

/// How an overlap with a platform was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Landing,
    Ceiling,
    SidePush,
}

/// Outcome of resolving the player against every platform
#[derive(Debug, Clone, Default)]
pub struct CollisionResult {
    /// Player ended the step standing on something
    pub grounded: bool,
    /// Index of the platform the player landed on (last one wins)
    pub ground_platform: Option<usize>,
    pub hit_ceiling: bool,
    pub pushed_sideways: bool,
}

/// Classify how a moving box overlapping `platform` should be resolved
///
/// Landing and ceiling tests only fire for `vy >= 0` and `vy < 0`
/// respectively, so a fast fall clipping a platform corner is never mistaken
/// for a head bump.
pub fn classify_contact(prev: &Rect, vel: Vec2, platform: &Rect) -> ContactKind {
    if vel.y >= 0.0 && prev.bottom() <= platform.y + EDGE_TOLERANCE {
        ContactKind::Landing
    } else if vel.y < 0.0 && prev.y >= platform.bottom() - EDGE_TOLERANCE {
        ContactKind::Ceiling
    } else {
        ContactKind::SidePush
    }
}

/// Resolve the player box at `pos` (previously at `prev_pos`) against all
/// platforms, snapping position and adjusting velocity in place.
pub fn resolve_platforms(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    prev_pos: Vec2,
    platforms: &[Platform],
    side_damping: f32,
) -> CollisionResult {
    let prev = Rect::from_pos_size(prev_pos, size);
    let mut result = CollisionResult::default();

    for (index, platform) in platforms.iter().enumerate() {
        let body = Rect::from_pos_size(*pos, size);
        if !body.overlaps(&platform.rect) {
            continue;
        }

        match classify_contact(&prev, *vel, &platform.rect) {
            ContactKind::Landing => {
                pos.y = platform.rect.y - size.y;
                vel.y = 0.0;
                result.grounded = true;
                result.ground_platform = Some(index);
            }
            ContactKind::Ceiling => {
                pos.y = platform.rect.bottom();
                vel.y = 0.0;
                result.hit_ceiling = true;
            }
            ContactKind::SidePush => {
                if body.center().x < platform.rect.center().x {
                    pos.x = platform.rect.x - size.x;
                } else {
                    pos.x = platform.rect.right();
                }
                vel.x *= side_damping;
                result.pushed_sideways = true;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PlatformKind;

    const SIZE: Vec2 = Vec2::new(32.0, 36.0);

    fn rock(x: f32, y: f32, w: f32, h: f32) -> Platform {
        Platform {
            rect: Rect::new(x, y, w, h),
            kind: PlatformKind::Rock,
            toxic: false,
        }
    }

    #[test]
    fn test_landing_snaps_to_top() {
        let platforms = [rock(0.0, 100.0, 200.0, 20.0)];
        let prev = Vec2::new(50.0, 60.0); // bottom at 96
        let mut pos = Vec2::new(50.0, 70.0); // bottom at 106
        let mut vel = Vec2::new(0.0, 300.0);

        let result = resolve_platforms(&mut pos, &mut vel, SIZE, prev, &platforms, 0.3);
        assert!(result.grounded);
        assert_eq!(result.ground_platform, Some(0));
        assert_eq!(pos.y, 100.0 - SIZE.y);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_ceiling_bump_snaps_below() {
        let platforms = [rock(0.0, 100.0, 200.0, 20.0)];
        let prev = Vec2::new(50.0, 124.0); // top below platform bottom (120)
        let mut pos = Vec2::new(50.0, 115.0);
        let mut vel = Vec2::new(0.0, -400.0);

        let result = resolve_platforms(&mut pos, &mut vel, SIZE, prev, &platforms, 0.3);
        assert!(result.hit_ceiling);
        assert!(!result.grounded);
        assert_eq!(pos.y, 120.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_side_push_damps_vx() {
        let platforms = [rock(100.0, 0.0, 40.0, 200.0)];
        let prev = Vec2::new(66.0, 50.0);
        let mut pos = Vec2::new(72.0, 50.0);
        let mut vel = Vec2::new(200.0, 0.0);

        let result = resolve_platforms(&mut pos, &mut vel, SIZE, prev, &platforms, 0.3);
        assert!(result.pushed_sideways);
        assert_eq!(pos.x, 100.0 - SIZE.x);
        assert!((vel.x - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_rising_through_corner_is_not_a_landing() {
        // Previous bottom above the top, but moving upward: must not land
        let platform = Rect::new(0.0, 100.0, 50.0, 20.0);
        let prev = Rect::new(40.0, 60.0, 32.0, 36.0);
        let kind = classify_contact(&prev, Vec2::new(0.0, -50.0), &platform);
        assert_ne!(kind, ContactKind::Landing);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.offset_x(-0.5)));
    }
}
