//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per frame, with a clamped delta
//! - Seeded RNG only (level generation)
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering or platform dependencies

pub mod enemy;
pub mod geom;
pub mod item;
pub mod level;
pub mod motion;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod world;

pub use enemy::{Contact, Enemy, EnemyKind, EnemyTemplate, ShellState};
pub use geom::{Rect, overlaps};
pub use item::{Coin, FloatingCoin, Item, ItemKind};
pub use level::{BlockSpawn, EnemySpawn, LevelData};
pub use motion::{Body, MoveResult, WallPolicy};
pub use player::{DamageOutcome, Player, PowerState};
pub use projectile::{Shot, ShotKind};
pub use state::{GameEvent, GameState, Goal, HudSnapshot, SessionPhase};
pub use tick::{TickInput, tick};
pub use world::{Block, BlockContent, BlockKind, BumpOutcome, SolidRef, World};
