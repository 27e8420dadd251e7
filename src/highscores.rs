//! Score history and leaderboard
//!
//! Finished runs are kept sorted best-first. The leaderboard shows named,
//! non-zero runs only.

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;

/// Maximum number of runs to keep in the history
pub const MAX_HISTORY: usize = 50;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(default)]
    pub player_name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(default)]
    pub timestamp: f64,
}

impl ScoreRecord {
    /// Whether the run belongs on the leaderboard
    pub fn is_listed(&self) -> bool {
        !self.player_name.is_empty() && self.score > 0
    }
}

/// Score history, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create empty history
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from records in any order (e.g. received from the host page)
    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        let mut entries: Vec<ScoreRecord> = records.into_iter().collect();
        // Stable sort keeps earlier runs ahead on ties
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HISTORY);
        Self { entries }
    }

    /// Check if a score qualifies for the history
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HISTORY {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a finished run (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, player_name: &str, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreRecord {
            player_name: player_name.to_string(),
            score,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HISTORY);

        Some(rank)
    }

    /// Top listed runs, best first
    pub fn leaderboard(&self, limit: usize) -> Vec<&ScoreRecord> {
        self.entries
            .iter()
            .filter(|e| e.is_listed())
            .take(limit)
            .collect()
    }

    /// Leaderboard lines as shown on the start screen ("1. Ana - 42")
    pub fn leaderboard_lines(&self) -> Vec<String> {
        self.leaderboard(LEADERBOARD_SIZE)
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} - {}", i + 1, e.player_name, e.score))
            .collect()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: u64) -> ScoreRecord {
        ScoreRecord {
            player_name: name.to_string(),
            score,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_add_score_ranks() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("a", 10, 0.0), Some(1));
        assert_eq!(scores.add_score("b", 30, 0.0), Some(1));
        assert_eq!(scores.add_score("c", 20, 0.0), Some(2));
        assert_eq!(scores.add_score("d", 0, 0.0), None);
        assert_eq!(scores.top_score(), Some(30));
        assert_eq!(scores.entries.len(), 3);
    }

    #[test]
    fn test_history_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=(MAX_HISTORY as u64 + 5) {
            scores.add_score("p", s, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HISTORY);
        assert!(!scores.qualifies(1));
        assert!(scores.qualifies(1_000));
    }

    #[test]
    fn test_leaderboard_filters_and_sorts() {
        let scores = HighScores::from_records(vec![
            record("ana", 12),
            record("", 99),
            record("bo", 0),
            record("cy", 40),
            record("di", 7),
            record("ed", 3),
            record("fay", 25),
            record("gus", 1),
        ]);
        assert_eq!(
            scores.leaderboard_lines(),
            vec!["1. cy - 40", "2. fay - 25", "3. ana - 12", "4. di - 7", "5. ed - 3"]
        );
    }

    #[test]
    fn test_blank_looking_names_are_listed() {
        let scores = HighScores::from_records(vec![record("  ", 50), record("", 60)]);
        assert_eq!(scores.leaderboard_lines(), vec!["1.    - 50"]);
    }

    #[test]
    fn test_records_use_camel_case() {
        let json = r#"[{"playerName":"zed","score":9,"timestamp":1.5},{"score":3}]"#;
        let scores: HighScores = serde_json::from_str(json).unwrap();
        assert_eq!(scores.entries[0].player_name, "zed");
        assert_eq!(scores.entries[1].player_name, "");
        assert_eq!(scores.leaderboard(5).len(), 1);
    }
}
