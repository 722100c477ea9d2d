//! Collision detection and response
//!
//! Everything collides as a circle. Overlap is strict: touching circles do
//! not collide, so a pair exactly `r1 + r2` apart is a miss.

use glam::Vec2;

use super::entity::{Entity, EntityKind};

/// Strict circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    (a - b).length_squared() < reach * reach
}

/// True while jump progress lies strictly inside `window`
#[inline]
pub fn in_invulnerable_window(progress: f32, window: (f32, f32)) -> bool {
    progress > window.0 && progress < window.1
}

/// Index of the first active entity (in store order) that `pred` accepts and
/// that overlaps the circle at `pos`
pub fn first_hit<F>(entities: &[Entity], pos: Vec2, radius: f32, pred: F) -> Option<usize>
where
    F: Fn(&Entity) -> bool,
{
    entities
        .iter()
        .position(|e| e.is_active() && pred(e) && circles_overlap(pos, radius, e.pos, e.radius))
}

/// What a hit does to an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Destroyed outright
    Killed,
    /// Replaced by two children of the given size at the given centers
    Split { size: f32, centers: [Vec2; 2] },
}

/// Resolve a bullet hitting an enemy of `size` at `pos`.
///
/// Only a splitting weapon splits, only splittable enemies split, and nothing
/// at or under `floor` ever splits.
pub fn enemy_hit_outcome(
    pos: Vec2,
    size: f32,
    splittable: bool,
    weapon_splits: bool,
    floor: f32,
) -> HitOutcome {
    if weapon_splits && splittable && size > floor {
        let offset = Vec2::new(size * 0.5, 0.0);
        HitOutcome::Split {
            size: size * 0.5,
            centers: [pos - offset, pos + offset],
        }
    } else {
        HitOutcome::Killed
    }
}

/// Whether a child of `size` may split again
#[inline]
pub fn is_splittable(size: f32, floor: f32) -> bool {
    size > floor
}

/// Enemy radius for a given size (size is the diameter)
#[inline]
pub fn enemy_radius(size: f32) -> f32 {
    size * 0.5
}

/// Whether an entity is a live shooter enemy
#[inline]
pub fn is_live_enemy(e: &Entity) -> bool {
    e.is_active() && matches!(e.kind, EntityKind::Enemy { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_near_and_far() {
        // Two radius-9 circles: 10 apart overlap, 25 apart don't
        assert!(circles_overlap(
            Vec2::ZERO,
            9.0,
            Vec2::new(10.0, 0.0),
            9.0
        ));
        assert!(!circles_overlap(
            Vec2::ZERO,
            9.0,
            Vec2::new(25.0, 0.0),
            9.0
        ));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        assert!(!circles_overlap(
            Vec2::ZERO,
            10.0,
            Vec2::new(0.0, 20.0),
            10.0
        ));
    }

    #[test]
    fn test_invulnerable_window_is_open_interval() {
        let window = (0.2, 0.8);
        assert!(!in_invulnerable_window(0.2, window));
        assert!(in_invulnerable_window(0.21, window));
        assert!(!in_invulnerable_window(0.8, window));
    }

    #[test]
    fn test_first_hit_takes_store_order() {
        let entities = vec![
            Entity::new(1, EntityKind::Bullet, Vec2::new(100.0, 0.0), Vec2::ZERO, 5.0),
            Entity::new(2, EntityKind::Projectile, Vec2::new(3.0, 0.0), Vec2::ZERO, 5.0),
            Entity::new(3, EntityKind::Projectile, Vec2::new(-3.0, 0.0), Vec2::ZERO, 5.0),
        ];
        let hit = first_hit(&entities, Vec2::ZERO, 5.0, |_| true);
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn test_first_hit_skips_inactive() {
        let mut dying = Entity::new(1, EntityKind::Bullet, Vec2::ZERO, Vec2::ZERO, 5.0);
        dying.mark_dying();
        let entities = vec![dying];
        assert_eq!(first_hit(&entities, Vec2::ZERO, 5.0, |_| true), None);
    }

    #[test]
    fn test_split_outcome() {
        let pos = Vec2::new(200.0, 100.0);
        match enemy_hit_outcome(pos, 40.0, true, true, 20.0) {
            HitOutcome::Split { size, centers } => {
                assert_eq!(size, 20.0);
                assert_eq!(centers[0], Vec2::new(180.0, 100.0));
                assert_eq!(centers[1], Vec2::new(220.0, 100.0));
            }
            other => panic!("expected split, got {:?}", other),
        }
        // Machine gun never splits
        assert_eq!(
            enemy_hit_outcome(pos, 40.0, true, false, 20.0),
            HitOutcome::Killed
        );
        // At the floor the enemy dies regardless of weapon
        assert_eq!(
            enemy_hit_outcome(pos, 20.0, true, true, 20.0),
            HitOutcome::Killed
        );
        assert!(!is_splittable(20.0, 20.0));
    }

    proptest! {
        #[test]
        fn prop_no_hit_at_or_beyond_radius_sum(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            angle in 0.0f32..std::f32::consts::TAU,
            ra in 0.5f32..50.0, rb in 0.5f32..50.0,
            extra in 0.01f32..200.0,
        ) {
            let a = Vec2::new(ax, ay);
            let d = ra + rb + extra;
            let b = a + Vec2::new(angle.cos(), angle.sin()) * d;
            prop_assert!(!circles_overlap(a, ra, b, rb));
        }
    }
}
