//! Session state and core simulation types
//!
//! Everything a presentation layer reads, and everything needed to replay a
//! run deterministically, lives in [`GameState`].

use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::geom::Rect;
use super::item::{Coin, FloatingCoin, Item, ItemKind};
use super::level::LevelData;
use super::player::{Player, PowerState};
use super::projectile::{Shot, ShotKind};
use super::world::World;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Running,
    /// Goal reached with enough coins
    Won,
    /// Out of lives or time
    GameOver,
}

/// Something that happened during the last tick, for sound/UI/persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Fired(ShotKind),
    CoinCollected { total: u32 },
    BlockBumped,
    BrickBroken,
    ItemSpawned(ItemKind),
    PowerChanged(PowerState),
    EnemyKilled { id: u32 },
    EnemyCaptured { id: u32 },
    ShellKicked { id: u32 },
    Damaged,
    LifeLost { lives_left: u32 },
    /// Reached the goal without enough coins
    GoalHint { needed: u32 },
    /// Goal reached with enough coins; feed to [`crate::Progress`]
    Completed { score: u64, coins: u32, time_ticks: u64 },
    GameOver { score: u64 },
}

/// Level exit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub rect: Rect,
    pub required_coins: u32,
}

/// Read-only summary for HUD text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub coins: u32,
    pub required_coins: u32,
    pub lives: u32,
    pub time_remaining: Option<f32>,
    pub power: PowerState,
    pub bubble_charges: u32,
    pub phase: SessionPhase,
    /// "Collect more coins" message visible
    pub goal_hint: bool,
    pub camera_x: f32,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    /// Template the session was built from; used by `restart`
    pub level: LevelData,
    pub world: World,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub shots: Vec<Shot>,
    pub coins: Vec<Coin>,
    pub floating_coins: Vec<FloatingCoin>,
    pub goal: Goal,
    pub score: u64,
    pub coins_collected: u32,
    pub lives: u32,
    /// Seconds left when playing against the clock
    pub time_remaining: Option<f32>,
    pub phase: SessionPhase,
    /// Seconds the goal hint stays visible
    pub hint_timer: f32,
    /// Left edge of the view in world units
    pub camera_x: f32,
    /// Events produced by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Build a fresh session from a level template
    pub fn new(level: LevelData, tuning: Tuning) -> Self {
        let world = level.build_world(&tuning);
        let player = Player::new(level.spawn, &tuning);
        let coins = level.coins.iter().copied().map(Coin::at).collect();
        let goal = Goal {
            rect: level.goal,
            required_coins: level.required_coins,
        };

        let mut state = Self {
            lives: tuning.lives,
            time_remaining: tuning.round_time_secs,
            tuning,
            world,
            player,
            enemies: Vec::new(),
            items: Vec::new(),
            shots: Vec::new(),
            coins,
            floating_coins: Vec::new(),
            goal,
            score: 0,
            coins_collected: 0,
            phase: SessionPhase::Running,
            hint_timer: 0.0,
            camera_x: 0.0,
            events: Vec::new(),
            time_ticks: 0,
            next_id: 1,
            level,
        };

        for spawn in state.level.enemies.clone() {
            let id = state.next_entity_id();
            state
                .enemies
                .push(Enemy::spawn(id, spawn.kind, spawn.pos, spawn.speed));
        }

        log::info!(
            "Level '{}' loaded: {} platforms, {} blocks, {} enemies, {} coins (need {})",
            state.level.name,
            state.world.platforms.len(),
            state.world.blocks.len(),
            state.enemies.len(),
            state.coins.len(),
            state.goal.required_coins
        );
        state
    }

    /// Rebuild the session from its level template, keeping the tuning
    pub fn restart(&mut self) {
        log::info!("Restarting '{}'", self.level.name);
        *self = Self::new(self.level.clone(), self.tuning.clone());
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_won(&self) -> bool {
        self.phase == SessionPhase::Won
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            coins: self.coins_collected,
            required_coins: self.goal.required_coins,
            lives: self.lives,
            time_remaining: self.time_remaining,
            power: self.player.power,
            bubble_charges: self.player.bubble_charges,
            phase: self.phase,
            goal_hint: self.hint_timer > 0.0,
            camera_x: self.camera_x,
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Lose a life: respawn, or end the session on the last one
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.push_event(GameEvent::LifeLost {
            lives_left: self.lives,
        });
        if self.tuning.reset_score_on_life_loss {
            self.score = 0;
        }

        if self.lives == 0 {
            self.end_game();
            return;
        }

        log::info!("Life lost, {} left", self.lives);
        self.player.respawn(self.level.spawn, &self.tuning);
        self.shots.clear();
        self.camera_x = 0.0;
    }

    pub fn end_game(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.player.alive = false;
        self.push_event(GameEvent::GameOver { score: self.score });
        log::info!("Game over, final score {}", self.score);
    }

    /// Camera follows the player with a lead, clamped to the world
    pub fn update_camera(&mut self) {
        let view = self.tuning.view_width;
        let max_x = (self.world.width - view).max(0.0);
        self.camera_x = (self.player.body.rect.x - view * self.tuning.camera_lead).clamp(0.0, max_x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_from_classic() {
        let level = LevelData::classic();
        let state = GameState::new(level.clone(), Tuning::default());
        assert!(state.is_running());
        assert_eq!(state.lives, 3);
        assert_eq!(state.enemies.len(), level.enemies.len());
        assert_eq!(state.coins.len(), level.coins.len());
        assert_eq!(state.goal.required_coins, 5);
        assert_eq!(state.time_remaining, None);

        let mut ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), state.enemies.len());
    }

    #[test]
    fn test_lose_life_respawns_then_ends() {
        let tuning = Tuning {
            lives: 2,
            reset_score_on_life_loss: true,
            ..Default::default()
        };
        let mut state = GameState::new(LevelData::classic(), tuning);
        state.score = 500;
        state.player.body.rect.x = 900.0;

        state.lose_life();
        assert!(state.is_running());
        assert_eq!(state.lives, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.body.rect.position(), state.level.spawn);
        assert!(state.player.invulnerable_timer > 0.0);

        state.lose_life();
        assert!(state.is_game_over());
        assert_eq!(state.lives, 0);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_camera_clamped_to_world() {
        let mut state = GameState::new(LevelData::classic(), Tuning::default());
        state.player.body.rect.x = 50.0;
        state.update_camera();
        assert_eq!(state.camera_x, 0.0);

        state.player.body.rect.x = 1000.0;
        state.update_camera();
        assert_eq!(state.camera_x, 1000.0 - 800.0 * 0.4);

        state.player.body.rect.x = 2990.0;
        state.update_camera();
        assert_eq!(state.camera_x, 3000.0 - 800.0);
    }

    #[test]
    fn test_restart_rebuilds_from_template() {
        let mut state = GameState::new(LevelData::classic(), Tuning::default());
        state.score = 1234;
        state.coins_collected = 3;
        state.world.blocks[0].used = true;
        state.enemies.clear();
        state.phase = SessionPhase::GameOver;

        state.restart();
        assert!(state.is_running());
        assert_eq!(state.score, 0);
        assert_eq!(state.coins_collected, 0);
        assert!(!state.world.blocks[0].used);
        assert_eq!(state.enemies.len(), LevelData::classic().enemies.len());
    }

    #[test]
    fn test_hud_snapshot() {
        let tuning = Tuning {
            round_time_secs: Some(90.0),
            ..Default::default()
        };
        let mut state = GameState::new(LevelData::classic(), tuning);
        state.hint_timer = 1.0;
        let hud = state.hud();
        assert_eq!(hud.time_remaining, Some(90.0));
        assert!(hud.goal_hint);
        assert_eq!(hud.power, PowerState::Base);
        assert_eq!(hud.required_coins, 5);
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::new(LevelData::generate(7), Tuning::default());
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.enemies.len(), state.enemies.len());
        assert_eq!(back.level, state.level);
    }
}
