//! Enemy kinds, movement and player contact rules
//!
//! Each kind carries only the state its behaviour needs; `update` and
//! `resolve_player_contact` dispatch on the kind.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::motion::{Body, WallPolicy};
use super::player::Player;
use super::world::World;
use crate::tuning::Tuning;

pub const ENEMY_WIDTH: f32 = 36.0;
pub const ENEMY_HEIGHT: f32 = 32.0;

/// Sub-state of a shell-capable enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShellState {
    Walking,
    /// Stomped once: inert, harmless, kickable
    Idle,
    /// Sliding fast; `grace` seconds left before it can hurt the player
    Kicked { grace: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Ground patrol that turns at ledges and walls
    Walker,
    /// Drifts horizontally while bobbing around `base_y`
    Flyer {
        base_y: f32,
        phase: f32,
        amplitude: f32,
    },
    /// Turns into a kickable shell when stomped
    Shelled { shell: ShellState },
}

/// Enemy kind as written in level data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyTemplate {
    Walker,
    Flyer { amplitude: f32 },
    Shelled,
}

/// Outcome of a player overlapping an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Nothing happened (harmless or immune)
    None,
    /// Killed by an invincible player
    Trampled,
    /// Landed on from above: killed or shelled; the player rebounds
    Stomped,
    /// An idle shell was set sliding
    Kicked { stomp: bool },
    /// The player takes damage
    Hurt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub alive: bool,
    /// Trapped in a bubble: rising, immune, expires off the top of the world
    pub captured: bool,
}

impl Enemy {
    pub fn spawn(id: u32, template: EnemyTemplate, pos: Vec2, speed: f32) -> Self {
        let kind = match template {
            EnemyTemplate::Walker => EnemyKind::Walker,
            EnemyTemplate::Flyer { amplitude } => EnemyKind::Flyer {
                base_y: pos.y,
                phase: 0.0,
                amplitude,
            },
            EnemyTemplate::Shelled => EnemyKind::Shelled {
                shell: ShellState::Walking,
            },
        };
        Self {
            id,
            kind,
            body: Body::new(
                Rect::new(pos.x, pos.y, ENEMY_WIDTH, ENEMY_HEIGHT),
                Vec2::new(speed, 0.0),
            ),
            alive: true,
            captured: false,
        }
    }

    /// Alive and not captured: takes part in collisions
    pub fn is_active(&self) -> bool {
        self.alive && !self.captured
    }

    pub fn is_sliding_shell(&self) -> bool {
        matches!(
            self.kind,
            EnemyKind::Shelled {
                shell: ShellState::Kicked { .. }
            }
        )
    }

    /// Whether touching this enemy from the side hurts
    pub fn is_harmful(&self) -> bool {
        match self.kind {
            EnemyKind::Shelled {
                shell: ShellState::Idle,
            } => false,
            EnemyKind::Shelled {
                shell: ShellState::Kicked { grace },
            } => grace <= 0.0,
            _ => true,
        }
    }

    pub fn capture(&mut self) {
        self.captured = true;
        self.body.vel = Vec2::ZERO;
    }

    /// Advance one step
    pub fn update(&mut self, world: &World, tuning: &Tuning, dt: f32, k: f32) {
        if !self.alive {
            return;
        }
        if self.captured {
            self.body.rect.y -= tuning.capture_rise_speed * k;
            if self.body.rect.bottom() < 0.0 {
                self.alive = false;
            }
            return;
        }

        match &mut self.kind {
            EnemyKind::Walker
            | EnemyKind::Shelled {
                shell: ShellState::Walking | ShellState::Idle,
            } => walk(&mut self.body, world, k, true),
            EnemyKind::Shelled {
                shell: ShellState::Kicked { grace },
            } => {
                *grace = (*grace - dt).max(0.0);
                walk(&mut self.body, world, k, false);
            }
            EnemyKind::Flyer {
                base_y,
                phase,
                amplitude,
            } => {
                *phase += tuning.flyer_phase_rate * k;
                let dx = self.body.vel.x * k;
                self.body.move_x(world, dx, WallPolicy::Reverse);
                let r = self.body.rect;
                if (r.left() < 0.0 && self.body.vel.x < 0.0) || (r.right() > world.width && self.body.vel.x > 0.0) {
                    self.body.vel.x = -self.body.vel.x;
                }
                self.body.rect.y = *base_y + phase.sin() * *amplitude;
            }
        }

        if self.body.rect.top() > world.height {
            self.alive = false;
        }
    }

    /// Resolve an overlap with the player, in priority order:
    /// invincible trample, stomp, shell kick, damage.
    pub fn resolve_player_contact(&mut self, player: &Player, tuning: &Tuning) -> Contact {
        if !self.is_active() {
            return Contact::None;
        }
        if player.is_invincible() {
            self.alive = false;
            return Contact::Trampled;
        }

        let descending = player.body.vel.y > 0.0 || player.body.rect.bottom() > player.prev_bottom;
        let stomp = descending && player.prev_bottom <= self.body.rect.top() + tuning.stomp_tolerance;
        let kick_dir = if self.body.rect.center().x >= player.body.rect.center().x {
            1.0
        } else {
            -1.0
        };

        let harmful = self.is_harmful();
        match &mut self.kind {
            EnemyKind::Shelled { shell } => match (*shell, stomp) {
                (ShellState::Walking | ShellState::Kicked { .. }, true) => {
                    *shell = ShellState::Idle;
                    self.body.vel.x = 0.0;
                    Contact::Stomped
                }
                (ShellState::Idle, _) => {
                    *shell = ShellState::Kicked {
                        grace: tuning.shell_kick_grace_secs,
                    };
                    self.body.vel.x = tuning.shell_speed * kick_dir;
                    Contact::Kicked { stomp }
                }
                _ if harmful => Contact::Hurt,
                _ => Contact::None,
            },
            _ if stomp => {
                self.alive = false;
                Contact::Stomped
            }
            _ => Contact::Hurt,
        }
    }
}

/// Ground movement: gravity, axis collision, turn at walls and optionally at ledges
fn walk(body: &mut Body, world: &World, k: f32, turns_at_edges: bool) {
    body.apply_gravity(world.gravity, world.max_fall_speed, k);
    let start_x = body.rect.x;
    body.integrate(world, k, WallPolicy::Reverse);

    if turns_at_edges && body.on_ground && body.vel.x != 0.0 {
        let r = body.rect;
        let leading = if body.vel.x > 0.0 { r.right() } else { r.left() };
        if !world.has_floor_at(leading, r.bottom()) {
            body.rect.x = start_x;
            body.vel.x = -body.vel.x;
        }
    }
}
