//! Save/load of the player's data blob
//!
//! Features:
//! - Single JSON blob under one key (`colorSwitchRunner_data`)
//! - Missing or unknown fields fall back to defaults
//! - Failures are logged and absorbed; the game keeps in-memory values

pub mod storage;

pub use storage::{MemoryStorage, Storage, StorageError};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use serde::{Deserialize, Serialize};

use crate::highscores::HighScores;

/// Everything persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub player_name: String,
    pub high_score: u64,
    pub scores: HighScores,
    pub last_player_name: String,
    /// Fields written by other versions of the page, kept as-is on save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Loads and saves [`SaveData`] through a [`Storage`] backend
pub struct PersistenceAdapter<S: Storage> {
    storage: S,
    data: SaveData,
}

impl<S: Storage> PersistenceAdapter<S> {
    /// Storage key for the save blob
    pub const STORAGE_KEY: &'static str = "colorSwitchRunner_data";

    pub fn new(storage: S) -> Self {
        Self {
            storage,
            data: SaveData::default(),
        }
    }

    /// Read the save blob. Any failure leaves the defaults in place.
    pub fn load(&mut self) -> &SaveData {
        match self.try_load() {
            Ok(Some(mut data)) => {
                // A blob may carry runs without a matching highScore
                if let Some(top) = data.scores.top_score() {
                    data.high_score = data.high_score.max(top);
                }
                log::info!(
                    "Loaded save data (high score {}, {} runs)",
                    data.high_score,
                    data.scores.entries.len()
                );
                self.data = data;
            }
            Ok(None) => log::info!("No saved data found, starting fresh"),
            Err(e) => log::warn!("Could not load save data, using defaults: {}", e),
        }
        &self.data
    }

    fn try_load(&self) -> Result<Option<SaveData>, StorageError> {
        let Some(json) = self.storage.get_item(Self::STORAGE_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Record a finished run and write the blob.
    /// Returns whether it reached storage; the in-memory copy is updated either way.
    pub fn save(&mut self, player_name: &str, score: u64, timestamp: f64) -> bool {
        self.data.player_name = player_name.to_string();
        self.data.last_player_name = player_name.to_string();
        self.data.high_score = self.data.high_score.max(score);
        self.data.scores.add_score(player_name, score, timestamp);

        match self.write() {
            Ok(()) => {
                log::info!("Saved score {} for {}", score, player_name);
                true
            }
            Err(e) => {
                log::warn!("Save failed, keeping score in memory only: {}", e);
                false
            }
        }
    }

    fn write(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.data)?;
        self.storage.set_item(Self::STORAGE_KEY, &json)
    }

    /// Current (possibly unsaved) data
    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn high_score(&self) -> u64 {
        self.data.high_score
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
