//! Data-driven game balance
//!
//! Defaults reproduce the classic arcade values in [`crate::consts`]. A tuning
//! blob can be supplied as JSON (LocalStorage on web, a file on native) to
//! rebalance the game without a rebuild.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a tuning blob was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    // === Playfield ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub player_radius: f32,
    /// Distance of the player's center above the bottom edge
    pub player_bottom_offset: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub spawn_y: f32,
    pub spawn_margin: f32,
    pub speed_jitter: f32,

    // === Difficulty curve ===
    pub base_speed: f32,
    pub max_speed: f32,
    pub speed_step: f32,
    pub base_spawn_rate: f32,
    pub max_spawn_rate: f32,
    pub spawn_rate_step: f32,
    pub points_per_level: u64,

    // === Scoring ===
    pub pass_points: u64,
    pub match_points: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            player_radius: PLAYER_SIZE / 2.0,
            player_bottom_offset: PLAYER_BOTTOM_OFFSET,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            spawn_y: OBSTACLE_SPAWN_Y,
            spawn_margin: OBSTACLE_SPAWN_MARGIN,
            speed_jitter: OBSTACLE_SPEED_JITTER,

            base_speed: OBSTACLE_SPEED_MIN,
            max_speed: OBSTACLE_SPEED_MAX,
            speed_step: SPEED_STEP,
            base_spawn_rate: OBSTACLE_SPAWN_RATE,
            max_spawn_rate: OBSTACLE_SPAWN_RATE_MAX,
            spawn_rate_step: SPAWN_RATE_STEP,
            points_per_level: POINTS_PER_LEVEL,

            pass_points: PASS_POINTS,
            match_points: MATCH_POINTS,
        }
    }
}

impl Tuning {
    /// LocalStorage key (web)
    pub const STORAGE_KEY: &'static str = "colorSwitchRunner_tuning";

    /// Environment variable naming a tuning file (native only)
    pub const ENV_PATH: &'static str = "COLOR_SWITCH_TUNING";

    /// Parse and validate a tuning blob. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the balance values are usable by the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return invalid("canvasWidth/canvasHeight", "must be positive");
        }
        if !(self.player_radius > 0.0) {
            return invalid("playerRadius", "must be positive");
        }
        if !(self.obstacle_width > 0.0 && self.obstacle_height > 0.0) {
            return invalid("obstacleWidth/obstacleHeight", "must be positive");
        }
        if self.canvas_width - 2.0 * self.spawn_margin < 0.0 {
            return invalid("spawnMargin", "leaves no room to spawn");
        }
        if !(self.speed_jitter >= 0.0) {
            return invalid("speedJitter", "must not be negative");
        }
        if !(self.base_speed >= 0.0 && self.base_speed <= self.max_speed) {
            return invalid("baseSpeed", "must be within [0, maxSpeed]");
        }
        if !(self.base_spawn_rate >= 0.0
            && self.base_spawn_rate <= self.max_spawn_rate
            && self.max_spawn_rate <= 1.0)
        {
            return invalid("baseSpawnRate/maxSpawnRate", "need 0 <= base <= max <= 1");
        }
        if self.points_per_level == 0 {
            return invalid("pointsPerLevel", "must be at least 1");
        }
        Ok(())
    }

    /// Fixed y of the player's center
    pub fn player_y(&self) -> f32 {
        self.canvas_height - self.player_bottom_offset
    }

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `COLOR_SWITCH_TUNING`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.player_radius, 15.0);
        assert_eq!(tuning.player_y(), 520.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "maxSpeed": 12.0, "matchPoints": 5 }"#).unwrap();
        assert_eq!(tuning.max_speed, 12.0);
        assert_eq!(tuning.match_points, 5);
        assert_eq!(tuning.base_speed, OBSTACLE_SPEED_MIN);
        assert_eq!(tuning.canvas_width, CANVAS_WIDTH);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_spawn_rates() {
        let err = Tuning::from_json(r#"{ "baseSpawnRate": 0.5, "maxSpawnRate": 0.1 }"#);
        assert!(matches!(err, Err(TuningError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_speed_above_max() {
        let err = Tuning::from_json(r#"{ "baseSpeed": 9.0 }"#);
        assert!(matches!(
            err,
            Err(TuningError::Invalid {
                field: "baseSpeed",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_points_per_level() {
        assert!(Tuning::from_json(r#"{ "pointsPerLevel": 0 }"#).is_err());
    }
}
