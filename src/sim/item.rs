//! Power-up items and coins

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::motion::{Body, WallPolicy};
use super::world::World;
use crate::tuning::Tuning;

pub const ITEM_SIZE: f32 = 32.0;
pub const COIN_SIZE: f32 = 24.0;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Base -> Enhanced
    Growth,
    /// Grants projectile fire
    Fire,
    /// Temporary invincibility
    Star,
    /// Bubble charges that capture enemies
    Bubble,
}

/// A spawned power-up moving through the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub body: Body,
}

impl Item {
    /// Pop an item out of the top of `block`, drifting toward `dir`
    pub fn spawn(id: u32, kind: ItemKind, block: &Rect, dir: f32, tuning: &Tuning) -> Self {
        let rect = Rect::new(
            block.center().x - ITEM_SIZE / 2.0,
            block.top() - ITEM_SIZE,
            ITEM_SIZE,
            ITEM_SIZE,
        );
        let vel = Vec2::new(tuning.item_speed * dir.signum(), -tuning.item_pop_velocity);
        Self {
            id,
            kind,
            body: Body::new(rect, vel),
        }
    }

    /// Advance one step. Returns false once the item has left the world.
    pub fn update(&mut self, world: &World, tuning: &Tuning, k: f32) -> bool {
        self.body.apply_gravity(world.gravity, world.max_fall_speed, k);
        let contacts = self.body.integrate(world, k, WallPolicy::Reverse);
        if self.kind == ItemKind::Star && contacts.landed.is_some() {
            self.body.vel.y = -tuning.star_bounce;
        }
        let r = self.body.rect;
        r.top() <= world.height && r.right() >= 0.0 && r.left() <= world.width
    }
}

/// A coin placed in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
}

impl Coin {
    pub fn at(pos: Vec2) -> Self {
        Self {
            rect: Rect::new(pos.x, pos.y, COIN_SIZE, COIN_SIZE),
            collected: false,
        }
    }
}

/// A coin popped out of a block; rises and expires (already counted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingCoin {
    pub rect: Rect,
    /// Seconds until expiry
    pub timer: f32,
}

impl FloatingCoin {
    pub fn spawn(block: &Rect, tuning: &Tuning) -> Self {
        Self {
            rect: Rect::new(
                block.center().x - COIN_SIZE / 2.0,
                block.top() - COIN_SIZE,
                COIN_SIZE,
                COIN_SIZE,
            ),
            timer: tuning.coin_float_secs,
        }
    }

    /// Rise and count down. Returns false once expired.
    pub fn update(&mut self, tuning: &Tuning, dt: f32, k: f32) -> bool {
        self.rect.y -= tuning.coin_float_speed * k;
        self.timer -= dt;
        self.timer > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(
            1000.0,
            540.0,
            &Tuning::default(),
            vec![Rect::new(0.0, 400.0, 1000.0, 40.0)],
            vec![Rect::new(600.0, 340.0, 60.0, 60.0)],
            Vec::new(),
        )
    }

    #[test]
    fn test_spawn_sits_on_block_top() {
        let tuning = Tuning::default();
        let block = Rect::new(100.0, 200.0, 40.0, 40.0);
        let item = Item::spawn(1, ItemKind::Growth, &block, -1.0, &tuning);
        assert_eq!(item.body.rect.bottom(), 200.0);
        assert_eq!(item.body.rect.center().x, 120.0);
        assert!(item.body.vel.x < 0.0);
        assert!(item.body.vel.y < 0.0);
    }

    #[test]
    fn test_item_reverses_at_wall() {
        let tuning = Tuning::default();
        let world = world();
        let mut item = Item {
            id: 1,
            kind: ItemKind::Growth,
            body: Body::new(Rect::new(560.0, 368.0, 32.0, 32.0), Vec2::new(10.0, 0.0)),
        };
        assert!(item.update(&world, &tuning, 1.0));
        assert_eq!(item.body.rect.right(), 600.0);
        assert_eq!(item.body.vel.x, -10.0);
        assert!(item.body.on_ground);
    }

    #[test]
    fn test_star_bounces() {
        let tuning = Tuning::default();
        let world = world();
        let mut item = Item {
            id: 1,
            kind: ItemKind::Star,
            body: Body::new(Rect::new(100.0, 366.0, 32.0, 32.0), Vec2::new(1.2, 5.0)),
        };
        item.update(&world, &tuning, 1.0);
        assert_eq!(item.body.vel.y, -tuning.star_bounce);
    }

    #[test]
    fn test_item_leaving_world_is_dropped() {
        let tuning = Tuning::default();
        let world = world();
        let mut item = Item {
            id: 1,
            kind: ItemKind::Fire,
            body: Body::new(Rect::new(100.0, 600.0, 32.0, 32.0), Vec2::new(0.0, 5.0)),
        };
        assert!(!item.update(&world, &tuning, 1.0));
    }

    #[test]
    fn test_floating_coin_expires() {
        let tuning = Tuning::default();
        let mut coin = FloatingCoin::spawn(&Rect::new(0.0, 200.0, 40.0, 40.0), &tuning);
        let start_y = coin.rect.y;
        assert!(coin.update(&tuning, 0.1, 6.0));
        assert!(coin.rect.y < start_y);
        assert!(!coin.update(&tuning, 0.5, 30.0));
    }
}
