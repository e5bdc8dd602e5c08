//! Player movement and power-state machine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::item::ItemKind;
use super::motion::Body;
use super::projectile::ShotKind;
use super::tick::TickInput;
use super::world::World;
use crate::tuning::{JumpMode, Tuning};

/// Below this horizontal speed friction snaps to rest
const REST_SPEED: f32 = 0.01;

/// Player power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    Base,
    Enhanced,
    /// Fire-capable; everything Enhanced can do plus shooting
    Projectile,
    /// Temporary; immune to damage, lethal to enemies on contact
    Invincible,
}

impl PowerState {
    pub fn rank(self) -> u8 {
        match self {
            PowerState::Base => 0,
            PowerState::Enhanced => 1,
            PowerState::Projectile => 2,
            PowerState::Invincible => 3,
        }
    }
}

/// Result of a damage event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Grace period or invincibility
    Ignored,
    Demoted(PowerState),
    /// Damage taken in the base state: costs a life
    Lethal,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub power: PowerState,
    /// State restored when invincibility runs out
    pub prior_power: PowerState,
    /// Post-hit grace period (seconds)
    pub invulnerable_timer: f32,
    /// Remaining invincibility (seconds)
    pub invincible_timer: f32,
    pub fire_cooldown: f32,
    /// Extra jump impulse stored while holding jump (charge mode)
    pub jump_charge: f32,
    pub bubble_charges: u32,
    pub alive: bool,
    /// Bottom edge before this tick's motion, for the stomp test
    pub prev_bottom: f32,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        let rect = Rect::new(spawn.x, spawn.y, tuning.player_width, tuning.player_height);
        Self {
            body: Body::new(rect, Vec2::ZERO),
            facing: 1.0,
            power: PowerState::Base,
            prior_power: PowerState::Base,
            invulnerable_timer: 0.0,
            invincible_timer: 0.0,
            fire_cooldown: 0.0,
            jump_charge: 0.0,
            bubble_charges: 0,
            alive: true,
            prev_bottom: rect.bottom(),
        }
    }

    /// Back to the spawn point in the base state, with a grace period
    pub fn respawn(&mut self, spawn: Vec2, tuning: &Tuning) {
        *self = Self::new(spawn, tuning);
        self.invulnerable_timer = tuning.invulnerable_secs;
    }

    pub fn is_invincible(&self) -> bool {
        self.power == PowerState::Invincible
    }

    /// Power level underneath any invincibility
    pub fn base_power(&self) -> PowerState {
        if self.is_invincible() {
            self.prior_power
        } else {
            self.power
        }
    }

    pub fn can_break_bricks(&self) -> bool {
        self.base_power().rank() >= PowerState::Enhanced.rank()
    }

    /// Count down timers; returns true on the tick invincibility expires
    pub fn tick_timers(&mut self, dt: f32) -> bool {
        self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        if self.is_invincible() {
            self.invincible_timer -= dt;
            if self.invincible_timer <= 0.0 {
                self.invincible_timer = 0.0;
                self.power = self.prior_power;
                return true;
            }
        }
        false
    }

    /// Horizontal intent, jump and gravity. Returns true if a jump started.
    pub fn apply_input(&mut self, input: &TickInput, tuning: &Tuning, world: &World, k: f32) -> bool {
        let intent = input.horizontal(tuning.axis_deadzone);
        let vel = &mut self.body.vel;
        if intent != 0.0 {
            let cap = tuning.speed_cap(input.run) * intent.abs();
            vel.x = (vel.x + tuning.move_accel * intent * k).clamp(-cap, cap);
            self.facing = intent.signum();
        } else {
            vel.x *= world.friction.powf(k);
            if vel.x.abs() < REST_SPEED {
                vel.x = 0.0;
            }
        }

        let grounded = self.body.on_ground;
        let mut jumped = false;
        match tuning.jump_mode {
            JumpMode::Instant => {
                if input.jump && grounded {
                    vel.y = -tuning.jump_force;
                    jumped = true;
                }
            }
            JumpMode::Charge => {
                if input.jump && grounded {
                    self.jump_charge = (self.jump_charge + tuning.charge_rate * k).min(tuning.max_jump_charge);
                } else if !input.jump && grounded && self.jump_charge > 0.0 {
                    vel.y = -(tuning.jump_force + self.jump_charge);
                    self.jump_charge = 0.0;
                    jumped = true;
                } else if !input.jump {
                    self.jump_charge = 0.0;
                }
            }
        }
        if jumped {
            self.body.on_ground = false;
        }

        self.body.apply_gravity(world.gravity, world.max_fall_speed, k);
        jumped
    }

    /// Try to fire. Fireballs need the projectile state and a free shot slot;
    /// otherwise a bubble charge is spent if any remain.
    pub fn try_fire(&mut self, tuning: &Tuning, live_fireballs: usize) -> Option<ShotKind> {
        if self.fire_cooldown > 0.0 {
            return None;
        }
        if self.power == PowerState::Projectile {
            if live_fireballs >= tuning.max_shots {
                return None;
            }
            self.fire_cooldown = tuning.fire_cooldown_secs;
            Some(ShotKind::Fireball)
        } else if self.bubble_charges > 0 {
            self.bubble_charges -= 1;
            self.fire_cooldown = tuning.bubble_cooldown_secs;
            Some(ShotKind::Bubble)
        } else {
            None
        }
    }

    /// Apply one damage event
    pub fn take_damage(&mut self, tuning: &Tuning) -> DamageOutcome {
        if self.invulnerable_timer > 0.0 {
            return DamageOutcome::Ignored;
        }
        let demoted = match self.power {
            PowerState::Invincible => return DamageOutcome::Ignored,
            PowerState::Base => return DamageOutcome::Lethal,
            PowerState::Projectile => PowerState::Enhanced,
            PowerState::Enhanced => PowerState::Base,
        };
        self.power = demoted;
        self.invulnerable_timer = tuning.invulnerable_secs;
        DamageOutcome::Demoted(demoted)
    }

    /// Apply a picked-up item
    pub fn collect(&mut self, kind: ItemKind, tuning: &Tuning) {
        match kind {
            ItemKind::Growth => self.upgrade(PowerState::Enhanced),
            ItemKind::Fire => self.upgrade(PowerState::Projectile),
            ItemKind::Star => {
                if !self.is_invincible() {
                    self.prior_power = self.power;
                    self.power = PowerState::Invincible;
                }
                self.invincible_timer = tuning.invincible_secs;
            }
            ItemKind::Bubble => self.bubble_charges = tuning.bubble_charges,
        }
    }

    fn upgrade(&mut self, to: PowerState) {
        let slot = if self.is_invincible() {
            &mut self.prior_power
        } else {
            &mut self.power
        };
        if slot.rank() < to.rank() {
            *slot = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(100.0, 300.0), &Tuning::default())
    }

    fn open_world(tuning: &Tuning) -> World {
        World::new(1000.0, 540.0, tuning, Vec::new(), Vec::new(), Vec::new())
    }

    fn input(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_damage_ladder() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Fire, &tuning);
        assert_eq!(p.power, PowerState::Projectile);

        assert_eq!(p.take_damage(&tuning), DamageOutcome::Demoted(PowerState::Enhanced));
        p.invulnerable_timer = 0.0;
        assert_eq!(p.take_damage(&tuning), DamageOutcome::Demoted(PowerState::Base));
        p.invulnerable_timer = 0.0;
        assert_eq!(p.take_damage(&tuning), DamageOutcome::Lethal);
    }

    #[test]
    fn test_invulnerability_blocks_damage() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Growth, &tuning);
        assert_eq!(p.take_damage(&tuning), DamageOutcome::Demoted(PowerState::Base));
        assert!(p.invulnerable_timer > 0.0);
        for _ in 0..5 {
            assert_eq!(p.take_damage(&tuning), DamageOutcome::Ignored);
        }
        assert_eq!(p.power, PowerState::Base);
        p.tick_timers(tuning.invulnerable_secs);
        assert_eq!(p.take_damage(&tuning), DamageOutcome::Lethal);
    }

    #[test]
    fn test_growth_then_fire() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Growth, &tuning);
        assert_eq!(p.power, PowerState::Enhanced);
        p.collect(ItemKind::Fire, &tuning);
        assert_eq!(p.power, PowerState::Projectile);
        // Growth never demotes
        p.collect(ItemKind::Growth, &tuning);
        assert_eq!(p.power, PowerState::Projectile);
    }

    #[test]
    fn test_star_restores_prior_state() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Growth, &tuning);
        p.collect(ItemKind::Star, &tuning);
        assert!(p.is_invincible());
        assert_eq!(p.prior_power, PowerState::Enhanced);
        assert_eq!(p.take_damage(&tuning), DamageOutcome::Ignored);

        // Pickups during invincibility upgrade the stored state
        p.collect(ItemKind::Fire, &tuning);
        assert!(p.is_invincible());

        assert!(!p.tick_timers(tuning.invincible_secs / 2.0));
        assert!(p.tick_timers(tuning.invincible_secs));
        assert_eq!(p.power, PowerState::Projectile);
        assert_eq!(p.invincible_timer, 0.0);
    }

    #[test]
    fn test_second_star_refreshes_timer() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Star, &tuning);
        p.tick_timers(5.0);
        p.collect(ItemKind::Star, &tuning);
        assert_eq!(p.invincible_timer, tuning.invincible_secs);
        assert_eq!(p.prior_power, PowerState::Base);
    }

    #[test]
    fn test_brick_breaking_uses_underlying_power() {
        let tuning = Tuning::default();
        let mut p = player();
        assert!(!p.can_break_bricks());
        p.collect(ItemKind::Star, &tuning);
        assert!(!p.can_break_bricks());
        p.collect(ItemKind::Growth, &tuning);
        assert!(p.can_break_bricks());
    }

    #[test]
    fn test_instant_jump_only_when_grounded() {
        let tuning = Tuning::default();
        let world = open_world(&tuning);
        let mut p = player();
        let jump = input(|i| i.jump = true);

        assert!(!p.apply_input(&jump, &tuning, &world, 1.0));

        p.body.on_ground = true;
        p.body.vel.y = 0.0;
        assert!(p.apply_input(&jump, &tuning, &world, 1.0));
        assert!((p.body.vel.y - (-tuning.jump_force + tuning.gravity)).abs() < 1e-5);
        assert!(!p.body.on_ground);
    }

    #[test]
    fn test_charge_jump_accumulates_and_caps() {
        let tuning = Tuning {
            jump_mode: JumpMode::Charge,
            ..Default::default()
        };
        let world = open_world(&tuning);
        let mut p = player();
        let hold = input(|i| i.jump = true);
        let release = TickInput::default();

        for _ in 0..100 {
            p.body.on_ground = true;
            p.body.vel.y = 0.0;
            assert!(!p.apply_input(&hold, &tuning, &world, 1.0));
        }
        assert_eq!(p.jump_charge, tuning.max_jump_charge);

        p.body.on_ground = true;
        p.body.vel.y = 0.0;
        assert!(p.apply_input(&release, &tuning, &world, 1.0));
        let expected = -(tuning.jump_force + tuning.max_jump_charge) + tuning.gravity;
        assert!((p.body.vel.y - expected).abs() < 1e-4);
        assert_eq!(p.jump_charge, 0.0);
    }

    #[test]
    fn test_horizontal_accel_clamp_and_friction() {
        let tuning = Tuning::default();
        let world = open_world(&Tuning {
            gravity: 0.0,
            ..Default::default()
        });
        let mut p = player();
        let right = input(|i| i.right = true);
        for _ in 0..20 {
            p.apply_input(&right, &tuning, &world, 1.0);
        }
        assert_eq!(p.body.vel.x, tuning.max_speed);
        assert_eq!(p.facing, 1.0);

        let run_left = input(|i| {
            i.left = true;
            i.run = true;
        });
        for _ in 0..40 {
            p.apply_input(&run_left, &tuning, &world, 1.0);
        }
        assert!((p.body.vel.x + tuning.speed_cap(true)).abs() < 1e-5);
        assert_eq!(p.facing, -1.0);

        let idle = TickInput::default();
        let before = p.body.vel.x;
        p.apply_input(&idle, &tuning, &world, 1.0);
        assert!((p.body.vel.x - before * tuning.friction).abs() < 1e-5);
        for _ in 0..200 {
            p.apply_input(&idle, &tuning, &world, 1.0);
        }
        assert_eq!(p.body.vel.x, 0.0);
    }

    #[test]
    fn test_fire_requires_projectile_and_cooldown() {
        let tuning = Tuning::default();
        let mut p = player();
        assert_eq!(p.try_fire(&tuning, 0), None);

        p.collect(ItemKind::Fire, &tuning);
        assert_eq!(p.try_fire(&tuning, 0), Some(ShotKind::Fireball));
        assert_eq!(p.try_fire(&tuning, 1), None);
        p.tick_timers(tuning.fire_cooldown_secs);
        assert_eq!(p.try_fire(&tuning, tuning.max_shots), None);
        assert_eq!(p.try_fire(&tuning, 1), Some(ShotKind::Fireball));
    }

    #[test]
    fn test_bubble_charges_run_out() {
        let tuning = Tuning::default();
        let mut p = player();
        p.collect(ItemKind::Bubble, &tuning);
        let mut fired = 0;
        for _ in 0..10 {
            if p.try_fire(&tuning, 0) == Some(ShotKind::Bubble) {
                fired += 1;
            }
            p.tick_timers(tuning.bubble_cooldown_secs);
        }
        assert_eq!(fired, tuning.bubble_charges);
        assert_eq!(p.bubble_charges, 0);
    }
}
