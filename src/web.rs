//! wasm32 bindings
//!
//! A JS presentation layer owns the canvas, input wiring and storage; it
//! drives a [`WebSession`] once per animation frame and reads state back as
//! JSON.

use wasm_bindgen::prelude::*;

use crate::progress::Progress;
use crate::sim::{GameEvent, GameState, LevelData, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Ignore double init when the module is instantiated twice
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Side Scroller wasm module ready");
}

/// A running session plus its completion record
#[wasm_bindgen]
pub struct WebSession {
    state: GameState,
    progress: Progress,
}

#[wasm_bindgen]
impl WebSession {
    /// Classic course with default tuning
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSession {
        Self::with_level(LevelData::classic(), Tuning::default())
    }

    /// Procedural course for `seed`
    pub fn generated(seed: u32) -> WebSession {
        Self::with_level(LevelData::generate(seed as u64), Tuning::default())
    }

    /// Level and tuning from JSON documents; an empty tuning string means defaults
    pub fn from_json(level_json: &str, tuning_json: &str) -> Result<WebSession, JsError> {
        let level = LevelData::from_json(level_json)?;
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json)?
        };
        Ok(Self::with_level(level, tuning))
    }

    /// Advance one frame; `dt` in seconds
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        left: bool,
        right: bool,
        jump: bool,
        run: bool,
        fire: bool,
        axis_x: Option<f32>,
        dt: f32,
    ) {
        let input = TickInput {
            left,
            right,
            jump,
            run,
            fire,
            axis_x,
        };
        tick(&mut self.state, &input, dt);

        for event in &self.state.events {
            if matches!(event, GameEvent::Completed { .. }) {
                self.progress.record(event, js_sys::Date::now());
            }
        }
    }

    pub fn restart(&mut self) {
        self.state.restart();
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn camera_x(&self) -> f32 {
        self.state.camera_x
    }

    /// Full session state as JSON
    pub fn state_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    pub fn hud_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.hud())?)
    }

    /// Events from the last tick as JSON
    pub fn events_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.state.events)?)
    }

    pub fn progress_json(&self) -> Result<String, JsError> {
        Ok(self.progress.to_json()?)
    }

    /// Restore a completion record saved by the page
    pub fn load_progress(&mut self, json: &str) -> Result<(), JsError> {
        self.progress = Progress::from_json(json)?;
        Ok(())
    }
}

impl WebSession {
    fn with_level(level: LevelData, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(level, tuning),
            progress: Progress::new(),
        }
    }
}

impl Default for WebSession {
    fn default() -> Self {
        Self::new()
    }
}
