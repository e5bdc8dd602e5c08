//! Axis-aligned rectangle geometry
//!
//! World space: x grows right, y grows down. A rectangle's `(x, y)` is its
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Strictly positive overlap along x (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    /// Strictly positive overlap along y
    #[inline]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.y < other.bottom() && self.bottom() > other.y
    }

    /// Move vertically so that `bottom()` reads back as `bottom`.
    ///
    /// `bottom - height` can round so the sum lands an ulp off the target;
    /// walk `y` toward it one ulp at a time. If no `y` hits it exactly, the
    /// rect stays just above rather than overlapping.
    pub fn set_bottom(&mut self, bottom: f32) {
        let mut y = bottom - self.height;
        for _ in 0..SNAP_STEPS {
            let reads = y + self.height;
            if reads == bottom {
                break;
            }
            let next = ulp_step(y, reads < bottom);
            if (reads < bottom) && next + self.height > bottom {
                break;
            }
            y = next;
        }
        self.y = y;
    }

    /// Length of the shared x interval (0 when disjoint)
    pub fn x_overlap_len(&self, other: &Rect) -> f32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }
}

/// Ulp walk limit for [`Rect::set_bottom`]
const SNAP_STEPS: usize = 32;

/// Adjacent representable value above (`up`) or below `v`
fn ulp_step(v: f32, up: bool) -> f32 {
    if !v.is_finite() {
        return v;
    }
    if v == 0.0 {
        let tiny = f32::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = v.to_bits();
    if (v > 0.0) == up {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

/// True iff the rectangles intersect with strictly positive area
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.overlaps_x(b) && a.overlaps_y(b)
}
