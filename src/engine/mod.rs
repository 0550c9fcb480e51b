pub mod level;
pub mod matching;
pub mod scoring;
pub mod selector;
pub mod timer;

pub use level::{LevelBuilder, LevelState, Piece, Target};
pub use matching::{LevelPhase, MatchEngine, MatchResult};
pub use selector::{ProblemSelector, SessionHistory};
