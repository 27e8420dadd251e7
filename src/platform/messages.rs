//! Messages exchanged with an embedding page (`window.parent.postMessage`)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::ScoreReport;
use crate::highscores::ScoreRecord;

pub const SAVE_SCORE: &str = "applaa-game-save-score";
pub const LOAD_DATA: &str = "applaa-game-load-data";
pub const DATA_LOADED: &str = "applaa-game-data-loaded";

/// Outgoing messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "applaa-game-save-score", rename_all = "camelCase")]
    SaveScore {
        game_id: String,
        player_name: String,
        score: u64,
    },
    #[serde(rename = "applaa-game-load-data", rename_all = "camelCase")]
    LoadData { game_id: String },
}

impl From<&ScoreReport> for OutgoingMessage {
    fn from(report: &ScoreReport) -> Self {
        OutgoingMessage::SaveScore {
            game_id: report.game_id.to_string(),
            player_name: report.player_name.clone(),
            score: report.score,
        }
    }
}

/// Payload of a data-loaded message.
///
/// Entries stay untyped until [`IncomingMessage::into_scores`] so one bad
/// record cannot reject the whole list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostData {
    pub scores: Vec<Value>,
}

/// A host score entry with a name and a positive whole score, or None
fn host_record(entry: &Value) -> Option<ScoreRecord> {
    let player_name = entry.get("playerName")?.as_str().filter(|n| !n.is_empty())?;
    let score = entry.get("score")?.as_f64()?;
    if !(score > 0.0 && score.fract() == 0.0 && score <= u64::MAX as f64) {
        return None;
    }
    Some(ScoreRecord {
        player_name: player_name.to_string(),
        score: score as u64,
        timestamp: entry
            .get("timestamp")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    })
}

/// Incoming message envelope; other message types are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<HostData>,
}

impl IncomingMessage {
    /// Listable scores carried by a data-loaded message, if this is one.
    /// Malformed entries are skipped.
    pub fn into_scores(self) -> Option<Vec<ScoreRecord>> {
        if self.kind != DATA_LOADED {
            return None;
        }
        let data = self.data?;
        let skipped = data.scores.iter().filter(|e| host_record(e).is_none()).count();
        if skipped > 0 {
            log::debug!("Skipped {} unusable host score entries", skipped);
        }
        Some(data.scores.iter().filter_map(host_record).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
    }
}
