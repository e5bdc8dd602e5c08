//! Side Scroller - a 2D platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `progress`: Completion record fed by the session's win event
//! - `web`: wasm32 bindings for a JS presentation layer

pub mod progress;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use progress::Progress;
pub use tuning::{JumpMode, Tuning};

/// Frame timing constants
pub mod consts {
    /// Physics constants are expressed per tick at this rate
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Nominal frame delta for fixed-step callers and tests
    pub const SIM_DT: f32 = 1.0 / REFERENCE_HZ;
    /// Largest delta a single tick will integrate (slow frames, tab resume)
    pub const MAX_FRAME_DT: f32 = 0.03;

    /// Visible play area
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 540.0;
}

/// Clamp a raw frame delta into `[0, MAX_FRAME_DT]`; non-finite deltas become zero
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Number of reference ticks covered by `dt` seconds
#[inline]
pub fn frame_factor(dt: f32) -> f32 {
    dt * consts::REFERENCE_HZ
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(-1.0), 0.0);
        assert_eq!(clamp_dt(0.01), 0.01);
        assert_eq!(clamp_dt(1.5), consts::MAX_FRAME_DT);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_frame_factor_reference_tick() {
        assert!((frame_factor(consts::SIM_DT) - 1.0).abs() < 1e-6);
    }
}
