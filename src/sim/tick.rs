//! Per-frame simulation tick
//!
//! Core game loop that advances the session by one variable frame. The
//! subsystem order is fixed: input and player, items, coins, enemies,
//! projectiles, then goal and timers. Removals are deferred to the end of
//! each pass.

use serde::{Deserialize, Serialize};

use super::enemy::Contact;
use super::geom::{Rect, overlaps};
use super::item::{FloatingCoin, Item, ItemKind};
use super::motion::WallPolicy;
use super::player::{DamageOutcome, PowerState};
use super::projectile::{Shot, ShotKind};
use super::state::{GameEvent, GameState, SessionPhase};
use super::world::{BlockContent, BumpOutcome, SolidRef};
use crate::{clamp_dt, frame_factor};

/// Normalized input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub run: bool,
    pub fire: bool,
    /// Analog stick position in [-1, 1]; used over the buttons when outside the deadzone
    pub axis_x: Option<f32>,
}

impl TickInput {
    /// Horizontal intent in [-1, 1]
    pub fn horizontal(&self, deadzone: f32) -> f32 {
        if let Some(axis) = self.axis_x.filter(|a| a.is_finite()) {
            let axis = axis.clamp(-1.0, 1.0);
            if axis.abs() > deadzone {
                return axis;
            }
        }
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Terminal phases freeze everything
    if state.phase != SessionPhase::Running {
        return;
    }

    let dt = clamp_dt(dt);
    // Zero-length frame (paused tab, bad delta): nothing to integrate
    if dt == 0.0 {
        return;
    }
    let k = frame_factor(dt);
    state.time_ticks += 1;

    update_player(state, input, dt, k);
    if !state.is_running() {
        return;
    }
    update_items(state, k);
    update_coins(state, dt, k);
    update_enemies(state, dt, k);
    if !state.is_running() {
        return;
    }
    update_shots(state, k);

    update_goal_and_timers(state, dt);
    state.world.sweep_broken_blocks();
    state.update_camera();
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32, k: f32) {
    if state.player.tick_timers(dt) {
        log::debug!("Invincibility over, back to {:?}", state.player.power);
        state.push_event(GameEvent::PowerChanged(state.player.power));
    }

    let player = &mut state.player;
    player.prev_bottom = player.body.rect.bottom();
    if player.apply_input(input, &state.tuning, &state.world, k) {
        state.events.push(GameEvent::Jumped);
    }

    if input.fire {
        let live_fireballs = state
            .shots
            .iter()
            .filter(|s| s.kind == ShotKind::Fireball)
            .count();
        if let Some(kind) = state.player.try_fire(&state.tuning, live_fireballs) {
            let id = state.next_entity_id();
            let shot = Shot::spawn(
                id,
                kind,
                &state.player.body.rect,
                state.player.facing,
                &state.tuning,
            );
            state.shots.push(shot);
            state.push_event(GameEvent::Fired(kind));
        }
    }

    let contacts = state
        .player
        .body
        .integrate(&state.world, k, WallPolicy::Stop);
    if let Some(SolidRef::Block(index)) = contacts.ceiling {
        bump_block(state, index);
    }

    // World side bounds
    let body = &mut state.player.body;
    let max_x = (state.world.width - body.rect.width).max(0.0);
    if body.rect.x < 0.0 || body.rect.x > max_x {
        body.rect.x = body.rect.x.clamp(0.0, max_x);
        body.vel.x = 0.0;
    }

    if body.rect.top() > state.world.height {
        log::debug!("Player fell out of the world");
        state.lose_life();
    }
}

/// Player hit a block from below
fn bump_block(state: &mut GameState, index: usize) {
    let can_break = state.player.can_break_bricks();
    let bump_secs = state.tuning.bump_secs;
    let Some(block) = state.world.blocks.get_mut(index) else {
        return;
    };
    let rect = block.rect;

    match block.bump(can_break, bump_secs) {
        BumpOutcome::Nothing => {}
        BumpOutcome::Broken => {
            log::debug!("Brick broken at ({}, {})", rect.x, rect.y);
            state.add_score(state.tuning.brick_score);
            state.push_event(GameEvent::BrickBroken);
        }
        BumpOutcome::Dispense(content) => {
            state.push_event(GameEvent::BlockBumped);
            dispense(state, content, &rect);
        }
    }
}

fn dispense(state: &mut GameState, content: BlockContent, block: &Rect) {
    let kind = match content {
        BlockContent::Empty => return,
        BlockContent::Coin => {
            state.coins_collected += 1;
            state.add_score(state.tuning.coin_score);
            state
                .floating_coins
                .push(FloatingCoin::spawn(block, &state.tuning));
            state.push_event(GameEvent::CoinCollected {
                total: state.coins_collected,
            });
            return;
        }
        BlockContent::PowerUp if state.player.base_power() == PowerState::Base => ItemKind::Growth,
        BlockContent::PowerUp => ItemKind::Fire,
        BlockContent::Item(kind) => kind,
    };

    let id = state.next_entity_id();
    let item = Item::spawn(id, kind, block, state.player.facing, &state.tuning);
    state.items.push(item);
    log::debug!("Spawned {kind:?}");
    state.push_event(GameEvent::ItemSpawned(kind));
}

fn update_items(state: &mut GameState, k: f32) {
    let world = &state.world;
    let tuning = &state.tuning;
    state.items.retain_mut(|item| item.update(world, tuning, k));

    let player_rect = state.player.body.rect;
    let mut picked = Vec::new();
    state.items.retain(|item| {
        let touching = overlaps(&item.body.rect, &player_rect);
        if touching {
            picked.push(item.kind);
        }
        !touching
    });

    for kind in picked {
        state.player.collect(kind, &state.tuning);
        state.add_score(state.tuning.item_score);
        log::debug!("Collected {kind:?}, power {:?}", state.player.power);
        state.push_event(GameEvent::PowerChanged(state.player.power));
    }
}

fn update_coins(state: &mut GameState, dt: f32, k: f32) {
    let tuning = &state.tuning;
    state
        .floating_coins
        .retain_mut(|coin| coin.update(tuning, dt, k));

    let player_rect = state.player.body.rect;
    for coin in &mut state.coins {
        if coin.collected || !overlaps(&coin.rect, &player_rect) {
            continue;
        }
        coin.collected = true;
        state.coins_collected += 1;
        state.score = state.score.saturating_add(state.tuning.coin_score);
        state.events.push(GameEvent::CoinCollected {
            total: state.coins_collected,
        });
    }
    state.coins.retain(|c| !c.collected);
}

fn update_enemies(state: &mut GameState, dt: f32, k: f32) {
    for enemy in &mut state.enemies {
        enemy.update(&state.world, &state.tuning, dt, k);
    }

    // Sliding shells plough through other enemies
    for i in 0..state.enemies.len() {
        let shell = &state.enemies[i];
        if !shell.is_active() || !shell.is_sliding_shell() {
            continue;
        }
        let shell_rect = shell.body.rect;
        for (j, other) in state.enemies.iter_mut().enumerate() {
            if j == i || !other.is_active() || !overlaps(&shell_rect, &other.body.rect) {
                continue;
            }
            other.alive = false;
            state.score = state.score.saturating_add(state.tuning.shell_kill_score);
            state.events.push(GameEvent::EnemyKilled { id: other.id });
        }
    }

    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !enemy.is_active() || !overlaps(&enemy.body.rect, &state.player.body.rect) {
            continue;
        }
        let id = enemy.id;
        let contact = state.enemies[i].resolve_player_contact(&state.player, &state.tuning);
        match contact {
            Contact::None => {}
            Contact::Trampled => {
                state.add_score(state.tuning.stomp_score);
                state.push_event(GameEvent::EnemyKilled { id });
            }
            Contact::Stomped => {
                rebound(state);
                state.add_score(state.tuning.stomp_score);
                if !state.enemies[i].alive {
                    state.push_event(GameEvent::EnemyKilled { id });
                }
            }
            Contact::Kicked { stomp } => {
                if stomp {
                    rebound(state);
                }
                state.push_event(GameEvent::ShellKicked { id });
            }
            Contact::Hurt => {
                if hurt_player(state) {
                    // Respawned or game over: remaining contacts are stale
                    break;
                }
            }
        }
    }
}

fn rebound(state: &mut GameState) {
    state.player.body.vel.y = -state.tuning.jump_force * state.tuning.stomp_rebound;
    state.player.body.on_ground = false;
}

/// Apply one damage event. Returns true if a life was lost.
fn hurt_player(state: &mut GameState) -> bool {
    match state.player.take_damage(&state.tuning) {
        DamageOutcome::Ignored => false,
        DamageOutcome::Demoted(power) => {
            log::debug!("Player hit, demoted to {power:?}");
            state.push_event(GameEvent::Damaged);
            state.push_event(GameEvent::PowerChanged(power));
            false
        }
        DamageOutcome::Lethal => {
            state.push_event(GameEvent::Damaged);
            state.lose_life();
            true
        }
    }
}

fn update_shots(state: &mut GameState, k: f32) {
    for shot in &mut state.shots {
        shot.update(&state.world, &state.tuning, k);
    }

    for shot in &mut state.shots {
        if shot.hit {
            continue;
        }
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| e.is_active() && overlaps(&e.body.rect, &shot.body.rect))
        else {
            continue;
        };
        shot.hit = true;
        match shot.kind {
            ShotKind::Fireball => {
                enemy.alive = false;
                state.score = state.score.saturating_add(state.tuning.shot_kill_score);
                state.events.push(GameEvent::EnemyKilled { id: enemy.id });
            }
            ShotKind::Bubble => {
                enemy.capture();
                state.events.push(GameEvent::EnemyCaptured { id: enemy.id });
            }
        }
    }

    let margin = state.tuning.shot_margin;
    let min_x = state.camera_x - margin;
    let max_x = state.camera_x + state.tuning.view_width + margin;
    let floor = state.world.height;
    state
        .shots
        .retain(|s| !s.hit && s.in_range(min_x, max_x, floor));
}

fn update_goal_and_timers(state: &mut GameState, dt: f32) {
    state.hint_timer = (state.hint_timer - dt).max(0.0);
    state.world.decay_bumps(dt);

    if overlaps(&state.player.body.rect, &state.goal.rect) {
        let required = state.goal.required_coins;
        if state.coins_collected >= required {
            state.phase = SessionPhase::Won;
            log::info!(
                "Level complete: score {}, coins {}, {} ticks",
                state.score,
                state.coins_collected,
                state.time_ticks
            );
            state.push_event(GameEvent::Completed {
                score: state.score,
                coins: state.coins_collected,
                time_ticks: state.time_ticks,
            });
            return;
        }
        if state.hint_timer <= 0.0 {
            state.push_event(GameEvent::GoalHint {
                needed: required - state.coins_collected,
            });
        }
        state.hint_timer = state.tuning.goal_hint_secs;
    }

    if let Some(remaining) = state.time_remaining.as_mut() {
        *remaining = (*remaining - dt).max(0.0);
        if *remaining <= 0.0 {
            log::info!("Out of time");
            state.end_game();
        }
    }
}
