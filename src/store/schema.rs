use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighScoreData {
    pub schema_version: u32,
    #[serde(default)]
    pub scores: BTreeMap<String, HighScoreEntry>,
}

impl Default for HighScoreData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            scores: BTreeMap::new(),
        }
    }
}

impl HighScoreData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn best(&self, user: &str) -> u32 {
        self.scores.get(user).map(|e| e.score).unwrap_or(0)
    }

    /// Raise the stored score for `user`. Returns false unless `score` is strictly higher.
    pub fn raise(&mut self, user: &str, score: u32, at: DateTime<Utc>) -> bool {
        if score <= self.best(user) {
            return false;
        }
        self.scores.insert(
            user.to_string(),
            HighScoreEntry {
                score,
                achieved_at: at,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_only_moves_upward() {
        let mut data = HighScoreData::default();
        let now = Utc::now();
        assert!(data.raise("ada", 100, now));
        assert!(!data.raise("ada", 100, now));
        assert!(!data.raise("ada", 40, now));
        assert!(data.raise("ada", 101, now));
        assert_eq!(data.best("ada"), 101);
        assert_eq!(data.best("bob"), 0);
    }

    #[test]
    fn missing_scores_field_defaults_empty() {
        let data: HighScoreData = serde_json::from_str(r#"{"schema_version": 1}"#).unwrap();
        assert!(data.scores.is_empty());
        assert!(!data.needs_reset());
    }
}
