//! Motion integration and axis-separated collision resolution
//!
//! Every moving thing (player, enemies, items, shots) is a [`Body`]. A move
//! advances x first and resolves against solids on that axis, then does the
//! same for y. Each axis move is swept: the body stops at the nearest solid
//! edge it would cross, so fast bodies cannot pass through thin platforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::world::{CONTACT_EPSILON, SolidRef, World};

/// A moving rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub rect: Rect,
    /// World units per reference tick
    pub vel: Vec2,
    pub on_ground: bool,
}

/// What happens to horizontal velocity on lateral contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallPolicy {
    /// Zero the horizontal velocity (player, shots)
    Stop,
    /// Flip the horizontal velocity (enemies, items)
    Reverse,
}

/// Contacts produced by one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    pub wall: Option<SolidRef>,
    pub landed: Option<SolidRef>,
    pub ceiling: Option<SolidRef>,
}

impl Body {
    pub fn new(rect: Rect, vel: Vec2) -> Self {
        Self {
            rect,
            vel,
            on_ground: false,
        }
    }

    /// Accumulate gravity over `k` ticks, capped at `max_fall`
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32, k: f32) {
        self.vel.y = (self.vel.y + gravity * k).min(max_fall);
    }

    /// Integrate velocity over `k` ticks against the world's solids
    pub fn integrate(&mut self, world: &World, k: f32, policy: WallPolicy) -> MoveResult {
        let wall = self.move_x(world, self.vel.x * k, policy);
        let (landed, ceiling) = self.move_y(world, self.vel.y * k);
        MoveResult {
            wall,
            landed,
            ceiling,
        }
    }

    /// Horizontal half of the step. Returns the solid hit, if any.
    pub fn move_x(&mut self, world: &World, dx: f32, policy: WallPolicy) -> Option<SolidRef> {
        if dx == 0.0 {
            return None;
        }
        let r = self.rect;
        let (min_x, max_x) = if dx > 0.0 {
            (r.left(), r.right() + dx)
        } else {
            (r.left() + dx, r.right())
        };

        let mut hit: Option<(SolidRef, f32)> = None;
        for (solid, s) in world.solids_near(min_x, max_x) {
            if !r.overlaps_y(&s) {
                continue;
            }
            if dx > 0.0 {
                if s.left() >= r.right() - CONTACT_EPSILON && s.left() < r.right() + dx {
                    let limit = s.left() - r.width;
                    if hit.is_none_or(|(_, best)| limit < best) {
                        hit = Some((solid, limit));
                    }
                }
            } else if s.right() <= r.left() + CONTACT_EPSILON && s.right() > r.left() + dx {
                let limit = s.right();
                if hit.is_none_or(|(_, best)| limit > best) {
                    hit = Some((solid, limit));
                }
            }
        }

        match hit {
            Some((solid, limit)) => {
                self.rect.x = limit;
                self.vel.x = match policy {
                    WallPolicy::Stop => 0.0,
                    WallPolicy::Reverse => -self.vel.x,
                };
                Some(solid)
            }
            None => {
                self.rect.x += dx;
                None
            }
        }
    }

    /// Vertical half of the step. Returns `(landed_on, hit_underside_of)`.
    ///
    /// A zero-length move leaves `on_ground` as it was.
    pub fn move_y(&mut self, world: &World, dy: f32) -> (Option<SolidRef>, Option<SolidRef>) {
        if dy == 0.0 {
            return (None, None);
        }
        self.on_ground = false;
        let r = self.rect;

        // (solid, contact edge, horizontal overlap) - ties go to the widest contact
        let mut hit: Option<(SolidRef, f32, f32)> = None;
        for (solid, s) in world.solids_near(r.left(), r.right()) {
            if !r.overlaps_x(&s) {
                continue;
            }
            let overlap = r.x_overlap_len(&s);
            let candidate = if dy > 0.0 {
                (s.top() >= r.bottom() - CONTACT_EPSILON && s.top() < r.bottom() + dy).then(|| s.top())
            } else {
                (s.bottom() <= r.top() + CONTACT_EPSILON && s.bottom() > r.top() + dy)
                    .then(|| s.bottom())
            };
            let Some(edge) = candidate else {
                continue;
            };
            let nearer = match hit {
                None => true,
                Some((_, best, best_overlap)) => {
                    let closer = if dy > 0.0 { edge < best } else { edge > best };
                    closer || ((edge - best).abs() <= CONTACT_EPSILON && overlap > best_overlap)
                }
            };
            if nearer {
                hit = Some((solid, edge, overlap));
            }
        }

        let Some((solid, edge, _)) = hit else {
            self.rect.y += dy;
            return (None, None);
        };
        self.vel.y = 0.0;
        if dy > 0.0 {
            self.rect.set_bottom(edge);
            self.on_ground = true;
            (Some(solid), None)
        } else {
            self.rect.y = edge;
            (None, Some(solid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{Block, BlockContent, BlockKind};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const FLOOR_Y: f32 = 400.0;

    fn world() -> World {
        World::new(
            2000.0,
            540.0,
            &Tuning::default(),
            vec![Rect::new(0.0, FLOOR_Y, 2000.0, 18.0)],
            vec![Rect::new(500.0, 300.0, 60.0, 100.0)],
            vec![
                Block::new(Rect::new(200.0, 200.0, 40.0, 40.0), BlockKind::Question, BlockContent::Coin),
                Block::new(Rect::new(240.0, 200.0, 40.0, 40.0), BlockKind::Brick, BlockContent::Empty),
            ],
        )
    }

    #[test]
    fn test_lands_on_floor() {
        let world = world();
        let mut body = Body::new(Rect::new(100.0, 330.0, 40.0, 56.0), Vec2::new(0.0, 20.0));
        let result = body.integrate(&world, 1.0, WallPolicy::Stop);
        assert_eq!(result.landed, Some(SolidRef::Platform(0)));
        assert_eq!(body.rect.bottom(), FLOOR_Y);
        assert!(body.on_ground);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_wall_stop_and_reverse() {
        let world = world();
        let start = Rect::new(450.0, 344.0, 40.0, 56.0);

        let mut player = Body::new(start, Vec2::new(20.0, 0.0));
        let result = player.integrate(&world, 1.0, WallPolicy::Stop);
        assert_eq!(result.wall, Some(SolidRef::Obstacle(0)));
        assert_eq!(player.rect.right(), 500.0);
        assert_eq!(player.vel.x, 0.0);

        let mut walker = Body::new(start, Vec2::new(20.0, 0.0));
        walker.integrate(&world, 1.0, WallPolicy::Reverse);
        assert_eq!(walker.rect.right(), 500.0);
        assert_eq!(walker.vel.x, -20.0);
    }

    #[test]
    fn test_pushing_against_touching_wall_keeps_contact() {
        let world = world();
        let mut body = Body::new(Rect::new(460.0, 344.0, 40.0, 56.0), Vec2::new(3.0, 0.0));
        let wall = body.move_x(&world, 3.0, WallPolicy::Stop);
        assert_eq!(wall, Some(SolidRef::Obstacle(0)));
        assert_eq!(body.rect.x, 460.0);
    }

    #[test]
    fn test_head_hit_reports_widest_block() {
        let world = world();
        // Mostly under the brick (240..280), a little under the question block
        let mut body = Body::new(Rect::new(230.0, 250.0, 40.0, 56.0), Vec2::new(0.0, -14.0));
        let result = body.integrate(&world, 1.0, WallPolicy::Stop);
        assert_eq!(result.ceiling, Some(SolidRef::Block(1)));
        assert_eq!(body.rect.top(), 240.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_free_fall_without_contact() {
        let world = world();
        let mut body = Body::new(Rect::new(100.0, 0.0, 40.0, 56.0), Vec2::new(2.0, 5.0));
        let result = body.integrate(&world, 1.0, WallPolicy::Stop);
        assert_eq!(result, MoveResult::default());
        assert_eq!(body.rect.position(), Vec2::new(102.0, 5.0));
        assert!(!body.on_ground);
    }

    #[test]
    fn test_gravity_clamped_to_max_fall() {
        let mut body = Body::new(Rect::default(), Vec2::new(0.0, 14.8));
        body.apply_gravity(0.7, 15.0, 1.0);
        assert_eq!(body.vel.y, 15.0);
    }

    #[test]
    fn test_overlapping_start_does_not_panic() {
        let world = world();
        // Starts inside the obstacle: degenerate but well-defined
        let mut body = Body::new(Rect::new(510.0, 320.0, 20.0, 20.0), Vec2::new(4.0, 4.0));
        body.integrate(&world, 1.0, WallPolicy::Stop);
        assert!(body.rect.x.is_finite() && body.rect.y.is_finite());
    }

    #[test]
    fn test_zero_move_keeps_ground_contact() {
        let world = world();
        let mut body = Body::new(Rect::new(100.0, 330.0, 40.0, 56.0), Vec2::new(0.0, 20.0));
        body.integrate(&world, 1.0, WallPolicy::Stop);
        assert!(body.on_ground);

        let rest = body.rect;
        let result = body.integrate(&world, 0.0, WallPolicy::Stop);
        assert_eq!(result, MoveResult::default());
        assert!(body.on_ground);
        assert_eq!(body.rect, rest);
    }

    proptest! {
        #[test]
        fn falling_body_lands_exactly_on_top(
            x in 0.0f32..1900.0,
            top in 150.0f32..500.0,
            height in 8.0f32..64.0,
            vy in 0.5f32..15.0,
            k in 0.05f32..1.8,
            frac in 0.0f32..0.95,
        ) {
            let world = World::new(
                2000.0,
                540.0,
                &Tuning::default(),
                vec![Rect::new(0.0, top, 2000.0, 18.0)],
                Vec::new(),
                Vec::new(),
            );
            // Pre-step bottom is above the top, and this step would cross it
            let gap = (vy * k * frac).max(0.01);
            let mut body = Body::new(Rect::new(x, top - height - gap, 40.0, height), Vec2::new(0.0, vy));
            prop_assume!(body.rect.bottom() < top && body.rect.bottom() + vy * k > top);
            let result = body.integrate(&world, k, WallPolicy::Stop);
            prop_assert_eq!(result.landed, Some(SolidRef::Platform(0)));
            prop_assert_eq!(body.rect.bottom(), top);
            prop_assert!(body.on_ground);
        }
    }
}
