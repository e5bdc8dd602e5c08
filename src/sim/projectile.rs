//! Player-fired shots
//!
//! Fireballs fall under reduced gravity and bounce along the ground;
//! bubbles fly straight and capture what they touch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::motion::{Body, WallPolicy};
use super::world::World;
use crate::tuning::Tuning;

pub const FIREBALL_SIZE: f32 = 16.0;
pub const BUBBLE_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    /// Kills the first live enemy it touches
    Fireball,
    /// Captures the first live enemy it touches
    Bubble,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shot {
    pub id: u32,
    pub kind: ShotKind,
    pub body: Body,
    /// Consumed; removed at the end of the projectile pass
    pub hit: bool,
}

impl Shot {
    /// Launch from the shooter's leading side at mid height
    pub fn spawn(id: u32, kind: ShotKind, shooter: &Rect, facing: f32, tuning: &Tuning) -> Self {
        let (size, speed) = match kind {
            ShotKind::Fireball => (FIREBALL_SIZE, tuning.fireball_speed),
            ShotKind::Bubble => (BUBBLE_SIZE, tuning.bubble_speed),
        };
        let dir = facing.signum();
        let x = if dir > 0.0 {
            shooter.right()
        } else {
            shooter.left() - size
        };
        let y = shooter.center().y - size / 2.0;
        Self {
            id,
            kind,
            body: Body::new(Rect::new(x, y, size, size), Vec2::new(speed * dir, 0.0)),
            hit: false,
        }
    }

    /// Move against the world. Walls consume the shot; fireballs bounce on floors.
    pub fn update(&mut self, world: &World, tuning: &Tuning, k: f32) {
        match self.kind {
            ShotKind::Fireball => {
                self.body.apply_gravity(
                    world.gravity * tuning.fireball_gravity_scale,
                    world.max_fall_speed,
                    k,
                );
                let contacts = self.body.integrate(world, k, WallPolicy::Stop);
                if contacts.wall.is_some() {
                    self.hit = true;
                } else if contacts.landed.is_some() {
                    self.body.vel.y = -tuning.fireball_bounce;
                }
            }
            ShotKind::Bubble => {
                let dx = self.body.vel.x * k;
                if self.body.move_x(world, dx, WallPolicy::Stop).is_some() {
                    self.hit = true;
                }
            }
        }
    }

    /// Whether the shot is still inside `[min_x, max_x]` and above the world floor
    pub fn in_range(&self, min_x: f32, max_x: f32, world_height: f32) -> bool {
        let r = self.body.rect;
        r.right() >= min_x && r.left() <= max_x && r.top() <= world_height
    }
}
