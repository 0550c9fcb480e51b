use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::HighScoreStore;
use crate::store::schema::HighScoreData;

const HIGH_SCORES_FILE: &str = "high_scores.json";

/// File-backed high-score table under the user's data directory.
pub struct JsonStore {
    base_dir: PathBuf,
    high_scores: HighScoreData,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathmatch");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let mut store = Self {
            base_dir,
            high_scores: HighScoreData::default(),
        };
        let loaded: HighScoreData = store.load(HIGH_SCORES_FILE);
        if loaded.needs_reset() {
            tracing::warn!(
                found = loaded.schema_version,
                "high score schema mismatch, starting with an empty table"
            );
        } else {
            store.high_scores = loaded;
        }
        Ok(store)
    }

    pub fn high_scores(&self) -> &HighScoreData {
        &self.high_scores
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), "unreadable store file: {e}");
                    T::default()
                }),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl HighScoreStore for JsonStore {
    fn best_score(&self, user: &str) -> u32 {
        self.high_scores.best(user)
    }

    fn record_best(&mut self, user: &str, score: u32) -> Result<bool> {
        if !self.high_scores.raise(user, score, Utc::now()) {
            return Ok(false);
        }
        self.save(HIGH_SCORES_FILE, &self.high_scores)?;
        tracing::info!(user, score, "new high score saved");
        Ok(true)
    }
}
