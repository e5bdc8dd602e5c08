//! Static world geometry and interactive blocks
//!
//! Platforms and obstacles never change after load and are bucketed into
//! fixed-width columns for collision queries. Blocks are few and mutable
//! (used / broken), so they are scanned directly.

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::item::ItemKind;
use crate::tuning::Tuning;

/// Width of one column in the solid index
pub const INDEX_COLUMN_WIDTH: f32 = 64.0;

/// Upper bound on index columns for absurdly wide worlds
pub const MAX_INDEX_COLUMNS: usize = 4096;

/// Tolerance for "already touching" comparisons
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Reference to one solid in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidRef {
    Platform(usize),
    Obstacle(usize),
    Block(usize),
}

/// Block behaviour on a from-below hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Dispenses its content once, then stays as a used block
    #[default]
    Question,
    /// Breakable by a powered-up player when empty
    Brick,
    /// Plain solid, never reacts
    Solid,
}

/// What a block hands out when bumped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockContent {
    #[default]
    Empty,
    Coin,
    /// Growth for a base-state player, fire otherwise
    PowerUp,
    Item(ItemKind),
}

/// Result of bumping a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpOutcome {
    Nothing,
    Dispense(BlockContent),
    Broken,
}

/// An interactive block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub rect: Rect,
    pub kind: BlockKind,
    pub content: BlockContent,
    pub used: bool,
    /// Removed from the world at the end of the tick
    pub broken: bool,
    /// Bump offset timer (seconds, presentation only)
    #[serde(default)]
    pub bump_timer: f32,
}

impl Block {
    pub fn new(rect: Rect, kind: BlockKind, content: BlockContent) -> Self {
        Self {
            rect,
            kind,
            content,
            used: false,
            broken: false,
            bump_timer: 0.0,
        }
    }

    /// Hit from below. `can_break` is whether the hitter may smash bricks.
    ///
    /// A brick holding content dispenses it on the first hit; once empty or
    /// used it breaks for a hitter that can break it.
    pub fn bump(&mut self, can_break: bool, bump_secs: f32) -> BumpOutcome {
        match self.kind {
            BlockKind::Solid => BumpOutcome::Nothing,
            BlockKind::Brick if self.used || self.content == BlockContent::Empty => {
                if can_break {
                    self.broken = true;
                    BumpOutcome::Broken
                } else {
                    self.bump_timer = bump_secs;
                    BumpOutcome::Nothing
                }
            }
            BlockKind::Question | BlockKind::Brick => {
                self.bump_timer = bump_secs;
                if self.used {
                    return BumpOutcome::Nothing;
                }
                self.used = true;
                match self.content {
                    BlockContent::Empty => BumpOutcome::Nothing,
                    content => BumpOutcome::Dispense(content),
                }
            }
        }
    }

    /// Decay the presentation bump timer
    pub fn decay_bump(&mut self, dt: f32) {
        if self.bump_timer > 0.0 {
            self.bump_timer = (self.bump_timer - dt).max(0.0);
        }
    }
}

/// Column buckets over the immutable solids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolidIndex {
    columns: Vec<Vec<SolidRef>>,
}

impl SolidIndex {
    pub fn build(platforms: &[Rect], obstacles: &[Rect], world_width: f32) -> Self {
        let count = Self::column_for(world_width, MAX_INDEX_COLUMNS - 1) + 1;
        let mut index = Self {
            columns: vec![Vec::new(); count],
        };

        let tagged = platforms
            .iter()
            .enumerate()
            .map(|(i, r)| (SolidRef::Platform(i), r))
            .chain(
                obstacles
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (SolidRef::Obstacle(i), r)),
            );

        for (solid, rect) in tagged {
            let (first, last) = index.column_span(rect.left(), rect.right());
            for column in &mut index.columns[first..=last] {
                column.push(solid);
            }
        }
        index
    }

    fn column_for(x: f32, last: usize) -> usize {
        // Float-to-int casts saturate: negatives and NaN land in column 0
        ((x / INDEX_COLUMN_WIDTH).floor() as usize).min(last)
    }

    fn column_span(&self, min_x: f32, max_x: f32) -> (usize, usize) {
        let last = self.columns.len().saturating_sub(1);
        let first = Self::column_for(min_x, last);
        let end = Self::column_for(max_x, last).max(first);
        (first, end)
    }

    /// Solids whose column overlaps `[min_x, max_x]`. May repeat entries that
    /// span several columns.
    pub fn candidates(&self, min_x: f32, max_x: f32) -> impl Iterator<Item = SolidRef> + '_ {
        let (first, last) = if self.columns.is_empty() {
            (0, 0)
        } else {
            self.column_span(min_x, max_x)
        };
        self.columns
            .get(first..=last)
            .unwrap_or(&[])
            .iter()
            .flatten()
            .copied()
    }
}

/// The level's static geometry and physics constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
    pub friction: f32,
    pub max_fall_speed: f32,
    pub platforms: Vec<Rect>,
    pub obstacles: Vec<Rect>,
    pub blocks: Vec<Block>,
    index: SolidIndex,
}

impl World {
    pub fn new(
        width: f32,
        height: f32,
        tuning: &Tuning,
        platforms: Vec<Rect>,
        obstacles: Vec<Rect>,
        blocks: Vec<Block>,
    ) -> Self {
        let index = SolidIndex::build(&platforms, &obstacles, width);
        Self {
            width,
            height,
            gravity: tuning.gravity,
            friction: tuning.friction,
            max_fall_speed: tuning.max_fall_speed,
            platforms,
            obstacles,
            blocks,
            index,
        }
    }

    /// Current rectangle of a solid; `None` for stale or broken references
    pub fn solid_rect(&self, solid: SolidRef) -> Option<Rect> {
        match solid {
            SolidRef::Platform(i) => self.platforms.get(i).copied(),
            SolidRef::Obstacle(i) => self.obstacles.get(i).copied(),
            SolidRef::Block(i) => self.blocks.get(i).filter(|b| !b.broken).map(|b| b.rect),
        }
    }

    /// All solids that might touch the horizontal band `[min_x, max_x]`
    pub fn solids_near(&self, min_x: f32, max_x: f32) -> impl Iterator<Item = (SolidRef, Rect)> + '_ {
        let statics = self
            .index
            .candidates(min_x, max_x)
            .filter_map(move |solid| self.solid_rect(solid).map(|rect| (solid, rect)));
        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .filter(move |(_, b)| !b.broken && b.rect.left() <= max_x && b.rect.right() >= min_x)
            .map(|(i, b)| (SolidRef::Block(i), b.rect));
        statics.chain(blocks)
    }

    /// Whether some solid's top surface at height `y` spans the point `x`
    pub fn has_floor_at(&self, x: f32, y: f32) -> bool {
        self.solids_near(x, x).any(|(_, solid)| {
            (solid.top() - y).abs() <= CONTACT_EPSILON && solid.left() <= x && solid.right() >= x
        })
    }

    /// Presentation timers on blocks
    pub fn decay_bumps(&mut self, dt: f32) {
        for block in &mut self.blocks {
            block.decay_bump(dt);
        }
    }

    /// Drop broken blocks; returns how many were removed
    pub fn sweep_broken_blocks(&mut self) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| !b.broken);
        before - self.blocks.len()
    }
}
