//! Data-driven game balance
//!
//! Stored as JSON next to the game. Missing or unreadable files fall back to
//! defaults so a bad edit never blocks a session from starting.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SEED, REPEAT_RETRY_BUDGET};
use crate::spawn::Bounds;

#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("tuning file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("tuning json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seed for the session's shared RNG
    pub seed: u64,
    /// Redraws before kind selection falls back to a direct pick
    pub repeat_retry_budget: u32,
    /// Chance per roll that a heart pickup spawns
    pub heart_spawn_chance: f64,
    /// Failed heart rolls before one is guaranteed (0 = never)
    pub heart_pity_after: u32,
    pub starting_lives: u8,
    pub max_lives: u8,
    /// Blocker kinds, in catalog order
    pub blocker_kinds: Vec<String>,
    pub bounds: Bounds,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            repeat_retry_budget: REPEAT_RETRY_BUDGET,
            heart_spawn_chance: 0.15,
            heart_pity_after: 12,
            starting_lives: 3,
            max_lives: 5,
            blocker_kinds: vec![
                "rotating".to_string(),
                "static".to_string(),
                "sliding".to_string(),
            ],
            bounds: Bounds::default(),
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from `path`, using defaults if the file is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path)
            .map_err(TuningError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TuningError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Tuning saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Clamp values into playable ranges. An empty kind list falls back to
    /// the default kinds.
    pub fn validated(mut self) -> Self {
        if self.blocker_kinds.is_empty() {
            log::warn!("Tuning lists no blocker kinds, using defaults");
            self.blocker_kinds = Self::default().blocker_kinds;
        }
        self.heart_spawn_chance = if self.heart_spawn_chance.is_nan() {
            0.0
        } else {
            self.heart_spawn_chance.clamp(0.0, 1.0)
        };
        self.repeat_retry_budget = self.repeat_retry_budget.max(1);
        self.max_lives = self.max_lives.max(self.starting_lives);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "seed": 7, "blocker_kinds": ["a", "b"] }"#).unwrap();
        assert_eq!(tuning.seed, 7);
        assert_eq!(tuning.blocker_kinds, vec!["a", "b"]);
        assert_eq!(tuning.repeat_retry_budget, REPEAT_RETRY_BUDGET);
        assert_eq!(tuning.bounds, Bounds::default());
    }

    #[test]
    fn test_validation_clamps() {
        let tuning = Tuning::from_json(
            r#"{ "heart_spawn_chance": 4.5, "repeat_retry_budget": 0,
                 "starting_lives": 6, "max_lives": 2 }"#,
        )
        .unwrap();
        assert_eq!(tuning.heart_spawn_chance, 1.0);
        assert_eq!(tuning.repeat_retry_budget, 1);
        assert_eq!(tuning.max_lives, 6);
    }

    #[test]
    fn test_empty_kind_list_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "blocker_kinds": [] }"#).unwrap();
        assert_eq!(tuning.blocker_kinds, Tuning::default().blocker_kinds);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            Tuning::from_json("{ seed: "),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tuning = Tuning::load("/nonexistent/arcade-pool/tuning.json");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("arcade-pool-tuning-{}.json", std::process::id()));
        let mut tuning = Tuning::default();
        tuning.seed = 424242;
        tuning.heart_pity_after = 0;
        tuning.save(&path).unwrap();

        let loaded = Tuning::load(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, tuning);
    }
}
