//! Completion record
//!
//! Fed by the session's `Completed` event. Tracks whether the level was
//! ever beaten plus the top 10 runs by score. Storage is up to the caller;
//! native builds get file helpers.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Maximum number of runs to keep
pub const MAX_RUNS: usize = 10;

/// One completed run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub score: u64,
    pub coins: u32,
    /// Simulation ticks from start to goal
    pub time_ticks: u64,
    /// Caller-supplied wall clock (ms since epoch)
    pub timestamp: f64,
}

/// Persistent progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Level beaten at least once
    pub completed: bool,
    /// Best runs, highest score first
    pub runs: Vec<RunRecord>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the table
    pub fn qualifies(&self, score: u64) -> bool {
        if self.runs.len() < MAX_RUNS {
            return true;
        }
        self.runs.last().is_none_or(|r| score > r.score)
    }

    /// Record a session event. Only `Completed` counts; returns the rank
    /// achieved (1-indexed), or `None` if it did not make the table.
    pub fn record(&mut self, event: &GameEvent, timestamp: f64) -> Option<usize> {
        let GameEvent::Completed {
            score,
            coins,
            time_ticks,
        } = *event
        else {
            return None;
        };

        self.completed = true;
        if !self.qualifies(score) {
            return None;
        }

        let run = RunRecord {
            score,
            coins,
            time_ticks,
            timestamp,
        };
        // Equal scores keep the earlier run ahead
        let pos = self
            .runs
            .iter()
            .position(|r| score > r.score)
            .unwrap_or(self.runs.len());
        self.runs.insert(pos, run);
        self.runs.truncate(MAX_RUNS);

        log::info!("Run recorded at rank {} (score {score})", pos + 1);
        Some(pos + 1)
    }

    pub fn best_score(&self) -> Option<u64> {
        self.runs.first().map(|r| r.score)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a file; a missing file is a fresh record
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let progress = Self::from_json(&json)?;
                log::info!("Loaded progress from {} ({} runs)", path.display(), progress.runs.len());
                Ok(progress)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Progress saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(score: u64) -> GameEvent {
        GameEvent::Completed {
            score,
            coins: 5,
            time_ticks: 1000,
        }
    }

    #[test]
    fn test_only_completion_counts() {
        let mut progress = Progress::new();
        assert_eq!(progress.record(&GameEvent::Jumped, 0.0), None);
        assert_eq!(progress.record(&GameEvent::GameOver { score: 900 }, 0.0), None);
        assert!(!progress.completed);

        assert_eq!(progress.record(&completed(500), 1.0), Some(1));
        assert!(progress.completed);
        assert_eq!(progress.best_score(), Some(500));
    }

    #[test]
    fn test_ranking_and_cap() {
        let mut progress = Progress::new();
        for i in 0..MAX_RUNS as u64 {
            progress.record(&completed(100 + i * 10), i as f64);
        }
        assert_eq!(progress.runs.len(), MAX_RUNS);
        assert_eq!(progress.best_score(), Some(190));

        // Below the lowest: still completed, not ranked
        assert!(!progress.qualifies(50));
        assert_eq!(progress.record(&completed(50), 20.0), None);

        assert_eq!(progress.record(&completed(150), 21.0), Some(6));
        assert_eq!(progress.runs.len(), MAX_RUNS);
        assert_eq!(progress.runs.last().map(|r| r.score), Some(110));
        // Tie goes behind the existing entry
        assert_eq!(progress.runs[4].timestamp, 5.0);
        assert_eq!(progress.runs[5].timestamp, 21.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut progress = Progress::new();
        progress.record(&completed(1200), 42.0);
        let json = progress.to_json().unwrap();
        assert_eq!(Progress::from_json(&json).unwrap(), progress);
        assert!(Progress::from_json("{\"completed\": 3}").is_err());
    }

    #[test]
    fn test_file_load_save() {
        let path = std::env::temp_dir().join(format!("side-scroller-progress-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let fresh = Progress::load(&path).unwrap();
        assert_eq!(fresh, Progress::new());

        let mut progress = Progress::new();
        progress.record(&completed(300), 7.0);
        progress.save(&path).unwrap();
        assert_eq!(Progress::load(&path).unwrap(), progress);

        let _ = std::fs::remove_file(&path);
    }
}
