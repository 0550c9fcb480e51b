use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("failed to load problem catalog: {0}")]
    CatalogLoadFailed(String),

    #[error("not enough distinct problems in {pool}: needed {needed}, found {available}")]
    InsufficientPool {
        pool: String,
        needed: usize,
        available: usize,
    },

    #[error("piece {0} is already matched")]
    AlreadyMatched(String),

    #[error("no piece {piece_id} or target {target_id} in the current level")]
    InvalidMatchTarget { piece_id: String, target_id: String },

    /// The level already ended by expiry; only a rebuild can accept matches again.
    #[error("level {0} is no longer active")]
    LevelInactive(u32),

    #[error("no game in progress")]
    NoActiveSession,
}

impl GameError {
    /// Match-attempt errors are local no-ops; the presentation layer may ignore them.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            GameError::AlreadyMatched(_)
                | GameError::InvalidMatchTarget { .. }
                | GameError::LevelInactive(_)
        )
    }
}
