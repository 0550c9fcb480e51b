pub mod json_store;
pub mod schema;

use std::collections::HashMap;

use anyhow::Result;

/// Key/value collaborator holding each player's best score.
pub trait HighScoreStore {
    fn best_score(&self, user: &str) -> u32;

    /// Store `score` if strictly above the current best. Returns whether it was stored.
    fn record_best(&mut self, user: &str, score: u32) -> Result<bool>;
}

/// In-process store, used when no data directory is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    scores: HashMap<String, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, user: &str, score: u32) -> Self {
        self.scores.insert(user.to_string(), score);
        self
    }
}

impl HighScoreStore for MemoryStore {
    fn best_score(&self, user: &str) -> u32 {
        self.scores.get(user).copied().unwrap_or(0)
    }

    fn record_best(&mut self, user: &str, score: u32) -> Result<bool> {
        if score <= self.best_score(user) {
            return Ok(false);
        }
        self.scores.insert(user.to_string(), score);
        Ok(true)
    }
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn best_score(&self, user: &str) -> u32 {
        (**self).best_score(user)
    }

    fn record_best(&mut self, user: &str, score: u32) -> Result<bool> {
        (**self).record_best(user, score)
    }
}
