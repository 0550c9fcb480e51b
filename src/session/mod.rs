pub mod events;
pub mod game;

pub use events::{FeedbackCue, GameCommand, GameEvent, StartOptions};
pub use game::{Game, GameSettings, Session};
