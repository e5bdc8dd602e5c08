//! Level templates
//!
//! A [`LevelData`] is the immutable description a session is built from
//! and rebuilt from on restart. Levels come from the built-in classic
//! course, a seeded generator, or JSON.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{ENEMY_HEIGHT, EnemyTemplate};
use super::geom::Rect;
use super::item::{COIN_SIZE, ItemKind};
use super::world::{Block, BlockContent, BlockKind, World};
use crate::tuning::Tuning;

pub const BLOCK_SIZE: f32 = 40.0;
pub const GROUND_Y: f32 = 460.0;
pub const GROUND_HEIGHT: f32 = 80.0;
pub const LEVEL_HEIGHT: f32 = GROUND_Y + GROUND_HEIGHT;

/// Height of the block rows above the ground
const BLOCK_ROW_Y: f32 = 320.0;

/// An enemy placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyTemplate,
    /// Top-left corner
    pub pos: Vec2,
    /// Initial horizontal speed (sign is direction)
    pub speed: f32,
}

/// A block placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSpawn {
    pub rect: Rect,
    pub kind: BlockKind,
    #[serde(default)]
    pub content: BlockContent,
}

/// Complete level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Player start (top-left)
    pub spawn: Vec2,
    pub platforms: Vec<Rect>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub blocks: Vec<BlockSpawn>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Coin positions (top-left)
    #[serde(default)]
    pub coins: Vec<Vec2>,
    pub goal: Rect,
    /// Coins needed before the goal accepts the player
    #[serde(default)]
    pub required_coins: u32,
}

fn block(x: f32, kind: BlockKind, content: BlockContent) -> BlockSpawn {
    BlockSpawn {
        rect: Rect::new(x, BLOCK_ROW_Y, BLOCK_SIZE, BLOCK_SIZE),
        kind,
        content,
    }
}

fn ground_enemy(kind: EnemyTemplate, x: f32, surface_y: f32, speed: f32) -> EnemySpawn {
    EnemySpawn {
        kind,
        pos: Vec2::new(x, surface_y - ENEMY_HEIGHT),
        speed,
    }
}

impl LevelData {
    /// The hand-built course
    pub fn classic() -> Self {
        use BlockContent as C;
        use BlockKind as K;

        Self {
            name: "classic".to_string(),
            width: 3000.0,
            height: LEVEL_HEIGHT,
            spawn: Vec2::new(120.0, 300.0),
            platforms: vec![
                Rect::new(0.0, GROUND_Y, 1200.0, GROUND_HEIGHT),
                Rect::new(260.0, 380.0, 140.0, 18.0),
                Rect::new(520.0, 320.0, 160.0, 18.0),
                Rect::new(760.0, 260.0, 140.0, 18.0),
                Rect::new(1040.0, 360.0, 160.0, 18.0),
                Rect::new(1300.0, 420.0, 220.0, 18.0),
                Rect::new(1580.0, 340.0, 160.0, 18.0),
                Rect::new(1860.0, 280.0, 160.0, 18.0),
                Rect::new(2100.0, GROUND_Y, 900.0, GROUND_HEIGHT),
            ],
            obstacles: vec![
                Rect::new(440.0, 400.0, 60.0, 60.0),
                Rect::new(2600.0, 380.0, 60.0, 80.0),
            ],
            blocks: vec![
                block(880.0, K::Question, C::Coin),
                block(920.0, K::Brick, C::Empty),
                block(960.0, K::Question, C::PowerUp),
                block(1000.0, K::Brick, C::Empty),
                block(2200.0, K::Question, C::Item(ItemKind::Star)),
                block(2240.0, K::Brick, C::Coin),
                block(2400.0, K::Question, C::Item(ItemKind::Bubble)),
            ],
            enemies: vec![
                ground_enemy(EnemyTemplate::Walker, 660.0, GROUND_Y, -1.2),
                ground_enemy(EnemyTemplate::Walker, 980.0, GROUND_Y, 1.1),
                ground_enemy(EnemyTemplate::Walker, 1460.0, 420.0, -1.3),
                EnemySpawn {
                    kind: EnemyTemplate::Flyer { amplitude: 40.0 },
                    pos: Vec2::new(1700.0, 200.0),
                    speed: -1.0,
                },
                ground_enemy(EnemyTemplate::Shelled, 2300.0, GROUND_Y, 1.4),
                ground_enemy(EnemyTemplate::Shelled, 2750.0, GROUND_Y, -1.0),
            ],
            coins: vec![
                Vec2::new(318.0, 340.0),
                Vec2::new(588.0, 280.0),
                Vec2::new(818.0, 220.0),
                Vec2::new(1108.0, 320.0),
                Vec2::new(1398.0, 380.0),
                Vec2::new(1648.0, 300.0),
                Vec2::new(1928.0, 240.0),
                Vec2::new(2500.0, 420.0),
            ],
            goal: Rect::new(2900.0, 360.0, 40.0, 100.0),
            required_coins: 5,
        }
    }

    /// Deterministic procedural course: same seed, same level
    pub fn generate(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut platforms = Vec::new();
        let mut obstacles = Vec::new();
        let mut blocks = Vec::new();
        let mut enemies = Vec::new();
        let mut coins = Vec::new();

        // Safe opening stretch
        let mut x = 0.0;
        platforms.push(Rect::new(x, GROUND_Y, 600.0, GROUND_HEIGHT));
        x += 600.0;

        let sections = rng.random_range(6..=10);
        for _ in 0..sections {
            if rng.random_bool(0.4) {
                let gap: f32 = rng.random_range(80.0..140.0);
                // Stepping stone over the wider gaps
                if gap > 110.0 {
                    platforms.push(Rect::new(x + gap / 2.0 - 40.0, 380.0, 80.0, 18.0));
                }
                x += gap;
            }

            let len: f32 = rng.random_range(360.0..640.0);
            platforms.push(Rect::new(x, GROUND_Y, len, GROUND_HEIGHT));
            let third = len / 3.0;

            // First third: pipe or raised ledge
            if rng.random_bool(0.35) {
                let height = rng.random_range(40.0..80.0);
                obstacles.push(Rect::new(x + third / 2.0, GROUND_Y - height, 60.0, height));
            } else if rng.random_bool(0.4) {
                let y = rng.random_range(300.0..380.0);
                platforms.push(Rect::new(x + 20.0, y, third - 40.0, 18.0));
                coins.push(Vec2::new(x + third / 2.0 - COIN_SIZE / 2.0, y - 40.0));
            }

            // Middle third: block row with coins under it
            if rng.random_bool(0.6) {
                let count = rng.random_range(2..=3);
                let start = x + third + (third - count as f32 * BLOCK_SIZE) / 2.0;
                for i in 0..count {
                    let (kind, content) = match rng.random_range(0..10) {
                        0..=3 => (BlockKind::Question, BlockContent::Coin),
                        4 => (BlockKind::Question, BlockContent::PowerUp),
                        5 => (BlockKind::Question, BlockContent::Item(ItemKind::Star)),
                        6 => (BlockKind::Question, BlockContent::Item(ItemKind::Bubble)),
                        _ => (BlockKind::Brick, BlockContent::Empty),
                    };
                    blocks.push(BlockSpawn {
                        rect: Rect::new(start + i as f32 * BLOCK_SIZE, BLOCK_ROW_Y, BLOCK_SIZE, BLOCK_SIZE),
                        kind,
                        content,
                    });
                }
            }
            coins.push(Vec2::new(x + third * 1.5 - COIN_SIZE / 2.0, GROUND_Y - 60.0));

            // Last third: an enemy
            if rng.random_bool(0.7) {
                let kind = match rng.random_range(0..4) {
                    0 => EnemyTemplate::Shelled,
                    1 => EnemyTemplate::Flyer {
                        amplitude: rng.random_range(20.0..50.0),
                    },
                    _ => EnemyTemplate::Walker,
                };
                let speed: f32 = rng.random_range(0.9..1.5) * if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let ex = x + third * 2.0 + third / 2.0 - 18.0;
                enemies.push(match kind {
                    EnemyTemplate::Flyer { .. } => EnemySpawn {
                        kind,
                        pos: Vec2::new(ex, rng.random_range(200.0..300.0)),
                        speed,
                    },
                    _ => ground_enemy(kind, ex, GROUND_Y, speed),
                });
            }

            x += len;
        }

        // Finish stretch with the goal
        platforms.push(Rect::new(x, GROUND_Y, 600.0, GROUND_HEIGHT));
        coins.push(Vec2::new(x + 200.0, GROUND_Y - 60.0));
        let goal = Rect::new(x + 480.0, GROUND_Y - 100.0, 40.0, 100.0);
        x += 600.0;

        let required_coins = (coins.len() as u32).min(5);
        Self {
            name: format!("generated-{seed}"),
            width: x,
            height: LEVEL_HEIGHT,
            spawn: Vec2::new(120.0, 300.0),
            platforms,
            obstacles,
            blocks,
            enemies,
            coins,
            goal,
            required_coins,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Fresh world geometry for a session
    pub fn build_world(&self, tuning: &Tuning) -> World {
        World::new(
            self.width,
            self.height,
            tuning,
            self.platforms.clone(),
            self.obstacles.clone(),
            self.blocks
                .iter()
                .map(|b| Block::new(b.rect, b.kind, b.content))
                .collect(),
        )
    }
}
