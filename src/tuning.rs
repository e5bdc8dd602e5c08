//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level can ship its own feel
//! as a (partial) JSON document. Velocities are in world units per
//! reference tick, accelerations in units per tick², timers in seconds.

use serde::{Deserialize, Serialize};

use crate::consts::VIEW_WIDTH;

/// How the jump intent turns into an upward impulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpMode {
    /// Fixed impulse on the tick the intent is asserted while grounded
    #[default]
    Instant,
    /// Holding the intent while grounded stores extra impulse, released on let-go
    Charge,
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World physics ===
    pub gravity: f32,
    /// Horizontal velocity multiplier per tick when no direction is held
    pub friction: f32,
    pub max_fall_speed: f32,

    // === Player movement ===
    pub player_width: f32,
    pub player_height: f32,
    pub move_accel: f32,
    pub max_speed: f32,
    pub run_multiplier: f32,
    /// Analog axis magnitude below which the stick counts as centred
    pub axis_deadzone: f32,
    pub jump_mode: JumpMode,
    pub jump_force: f32,
    /// Charge added per tick while jump is held on the ground
    pub charge_rate: f32,
    pub max_jump_charge: f32,
    /// Stomp rebound as a fraction of `jump_force`
    pub stomp_rebound: f32,
    /// How far below an enemy's top the player's previous bottom may be and still stomp
    pub stomp_tolerance: f32,

    // === Power states ===
    pub invulnerable_secs: f32,
    pub invincible_secs: f32,

    // === Shots ===
    pub fire_cooldown_secs: f32,
    pub max_shots: usize,
    pub fireball_speed: f32,
    pub fireball_gravity_scale: f32,
    pub fireball_bounce: f32,
    pub bubble_cooldown_secs: f32,
    pub bubble_charges: u32,
    pub bubble_speed: f32,
    /// Distance past the visible area before a shot is discarded
    pub shot_margin: f32,

    // === Enemies ===
    pub shell_speed: f32,
    pub shell_kick_grace_secs: f32,
    pub capture_rise_speed: f32,
    /// Flyer phase advance per tick (radians)
    pub flyer_phase_rate: f32,

    // === Blocks & items ===
    pub item_speed: f32,
    pub item_pop_velocity: f32,
    pub star_bounce: f32,
    pub coin_float_secs: f32,
    pub coin_float_speed: f32,
    /// Presentation-only bump offset duration
    pub bump_secs: f32,

    // === Rewards ===
    pub stomp_score: u64,
    pub shot_kill_score: u64,
    pub shell_kill_score: u64,
    pub coin_score: u64,
    pub item_score: u64,
    pub brick_score: u64,

    // === Session rules ===
    pub lives: u32,
    /// Countdown round timer; `None` plays on lives alone
    pub round_time_secs: Option<f32>,
    pub reset_score_on_life_loss: bool,
    pub goal_hint_secs: f32,
    pub view_width: f32,
    /// Fraction of the view kept to the left of the player
    pub camera_lead: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.7,
            friction: 0.85,
            max_fall_speed: 15.0,

            player_width: 40.0,
            player_height: 56.0,
            move_accel: 0.9,
            max_speed: 4.0,
            run_multiplier: 1.6,
            axis_deadzone: 0.2,
            jump_mode: JumpMode::Instant,
            jump_force: 14.0,
            charge_rate: 0.55,
            max_jump_charge: 6.0,
            stomp_rebound: 0.6,
            stomp_tolerance: 4.0,

            invulnerable_secs: 1.5,
            invincible_secs: 8.0,

            fire_cooldown_secs: 0.35,
            max_shots: 2,
            fireball_speed: 7.0,
            fireball_gravity_scale: 0.5,
            fireball_bounce: 5.0,
            bubble_cooldown_secs: 0.2,
            bubble_charges: 4,
            bubble_speed: 4.0,
            shot_margin: 64.0,

            shell_speed: 8.0,
            shell_kick_grace_secs: 0.25,
            capture_rise_speed: 0.5,
            flyer_phase_rate: 0.05,

            item_speed: 1.2,
            item_pop_velocity: 6.0,
            star_bounce: 9.0,
            coin_float_secs: 0.5,
            coin_float_speed: 3.0,
            bump_secs: 0.15,

            stomp_score: 100,
            shot_kill_score: 100,
            shell_kill_score: 200,
            coin_score: 200,
            item_score: 1000,
            brick_score: 50,

            lives: 3,
            round_time_secs: None,
            reset_score_on_life_loss: false,
            goal_hint_secs: 2.0,
            view_width: VIEW_WIDTH,
            camera_lead: 0.4,
        }
    }
}

impl Tuning {
    /// Parse a tuning document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Horizontal speed cap for the current run state
    pub fn speed_cap(&self, running: bool) -> f32 {
        if running {
            self.max_speed * self.run_multiplier
        } else {
            self.max_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5, "jump_mode": "Charge" }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.jump_mode, JumpMode::Charge);
        assert_eq!(tuning.friction, Tuning::default().friction);
        assert_eq!(tuning.lives, 3);
    }

    #[test]
    fn test_round_time_override() {
        let tuning = Tuning::from_json(r#"{ "round_time_secs": 90.0 }"#).unwrap();
        assert_eq!(tuning.round_time_secs, Some(90.0));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Tuning::from_json("{ gravity: }").is_err());
    }

    #[test]
    fn test_speed_cap() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed_cap(false), 4.0);
        assert!((tuning.speed_cap(true) - 6.4).abs() < 1e-5);
    }
}
