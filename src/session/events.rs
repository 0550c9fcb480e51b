use crate::catalog::{Difficulty, Operation};
use crate::engine::level::{DifficultyMode, LevelState, OperationMode};
use crate::engine::matching::MatchResult;
use crate::engine::timer::TimerHandle;

/// Fire-and-forget cue for the audio/feedback layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackCue {
    Correct,
    Wrong,
    LevelComplete,
}

impl FeedbackCue {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackCue::Correct => "correct",
            FeedbackCue::Wrong => "wrong",
            FeedbackCue::LevelComplete => "levelComplete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelBuilt(LevelState),
    Matched {
        piece_id: String,
        target_id: String,
        result: MatchResult,
    },
    LevelCompleted {
        level_number: u32,
        bonus: u32,
        total_score: u32,
        is_new_high_score: bool,
    },
    TimeExpired {
        level_number: u32,
    },
    TickUpdated(u32),
    Cue(FeedbackCue),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartOptions {
    pub user_name: String,
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operation_mode: OperationMode,
    pub difficulty_mode: DifficultyMode,
}

/// Commands sent by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameCommand {
    StartGame(StartOptions),
    AttemptMatch { piece_id: String, target_id: String },
    Tick(TimerHandle),
    NextLevel,
    RestartLevel,
    ToggleMute,
    Quit,
}
