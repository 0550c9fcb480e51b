use crate::engine::level::LevelState;
use crate::engine::timer::{LevelTimer, TimerTick};
use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelPhase {
    Active,
    Complete,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub result: MatchResult,
    /// Set on the one correct match that finished the level.
    pub level_completed: bool,
}

/// Judges match attempts against one level and runs its countdown.
pub struct MatchEngine {
    level: LevelState,
    timer: LevelTimer,
    phase: LevelPhase,
}

impl MatchEngine {
    pub fn new(level: LevelState) -> Self {
        let timer = LevelTimer::new(level.time_remaining);
        let phase = if level.is_complete() {
            LevelPhase::Complete
        } else {
            LevelPhase::Active
        };
        Self {
            level,
            timer,
            phase,
        }
    }

    pub fn level(&self) -> &LevelState {
        &self.level
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == LevelPhase::Active
    }

    pub fn attempt_match(
        &mut self,
        piece_id: &str,
        target_id: &str,
    ) -> Result<MatchOutcome, GameError> {
        let (Some(piece), Some(target)) = (self.level.piece(piece_id), self.level.target(target_id))
        else {
            return Err(GameError::InvalidMatchTarget {
                piece_id: piece_id.to_string(),
                target_id: target_id.to_string(),
            });
        };

        if self.level.is_matched(piece_id) {
            return Err(GameError::AlreadyMatched(piece_id.to_string()));
        }
        if self.phase == LevelPhase::Expired {
            return Err(GameError::LevelInactive(self.level.level_number));
        }

        // The pairing id decides; equal answers alone are not enough.
        if target.id != piece.id || target.answer != piece.answer {
            return Ok(MatchOutcome {
                result: MatchResult::Incorrect,
                level_completed: false,
            });
        }

        self.level.matched_ids.insert(piece_id.to_string());
        let level_completed = self.level.is_complete();
        if level_completed {
            self.phase = LevelPhase::Complete;
            self.timer.stop();
        }

        Ok(MatchOutcome {
            result: MatchResult::Correct,
            level_completed,
        })
    }

    /// Advance the countdown by one second. No-op once the level has ended.
    pub fn tick(&mut self) -> TimerTick {
        if self.phase != LevelPhase::Active {
            return TimerTick::Idle;
        }
        let tick = self.timer.tick();
        self.level.time_remaining = self.timer.remaining();
        if tick == TimerTick::Expired {
            self.phase = LevelPhase::Expired;
        }
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Answer, Difficulty, Operation, Problem};
    use crate::engine::level::LevelBuilder;

    fn engine_with(count: usize) -> MatchEngine {
        let problems: Vec<Problem> = (0..count)
            .map(|i| Problem {
                text: format!("{i} + 1"),
                answer: Answer::from(i as i64 + 1),
                operation: Operation::Addition,
                difficulty: Difficulty::Easy,
            })
            .collect();
        MatchEngine::new(LevelBuilder::default().build(1, &problems))
    }

    #[test]
    fn completes_exactly_when_all_pieces_matched() {
        for count in 1..=4 {
            let mut engine = engine_with(count);
            for i in 1..=count {
                let id = format!("eq{i}");
                let outcome = engine.attempt_match(&id, &id).unwrap();
                assert_eq!(outcome.result, MatchResult::Correct);
                assert_eq!(outcome.level_completed, i == count, "count {count}, match {i}");
                assert_eq!(engine.phase() == LevelPhase::Complete, i == count);
            }
            assert_eq!(engine.level().matched_ids.len(), count);
        }
    }

    #[test]
    fn wrong_target_leaves_state_untouched() {
        let mut engine = engine_with(3);
        let outcome = engine.attempt_match("eq1", "eq2").unwrap();
        assert_eq!(outcome.result, MatchResult::Incorrect);
        assert!(engine.level().matched_ids.is_empty());
        assert!(engine.is_active());
    }

    #[test]
    fn rematch_is_rejected_without_side_effects() {
        let mut engine = engine_with(3);
        engine.attempt_match("eq2", "eq2").unwrap();
        let before = engine.level().clone();
        let err = engine.attempt_match("eq2", "eq2").unwrap_err();
        assert_eq!(err, GameError::AlreadyMatched("eq2".to_string()));
        assert_eq!(engine.level(), &before);
    }

    #[test]
    fn rematch_after_completion_is_rejected() {
        let mut engine = engine_with(1);
        assert!(engine.attempt_match("eq1", "eq1").unwrap().level_completed);
        let err = engine.attempt_match("eq1", "eq1").unwrap_err();
        assert!(matches!(err, GameError::AlreadyMatched(_)));
        assert_eq!(engine.phase(), LevelPhase::Complete);
    }

    #[test]
    fn unknown_ids_are_invalid() {
        let mut engine = engine_with(2);
        assert!(matches!(
            engine.attempt_match("eq9", "eq1"),
            Err(GameError::InvalidMatchTarget { .. })
        ));
        assert!(matches!(
            engine.attempt_match("eq1", "nope"),
            Err(GameError::InvalidMatchTarget { .. })
        ));
        assert!(engine.level().matched_ids.is_empty());
    }

    #[test]
    fn equal_answer_on_other_target_is_incorrect() {
        let problems = vec![
            Problem {
                text: "1 + 3".to_string(),
                answer: Answer::from(4),
                operation: Operation::Addition,
                difficulty: Difficulty::Easy,
            },
            Problem {
                text: "2 + 2".to_string(),
                answer: Answer::from(4),
                operation: Operation::Addition,
                difficulty: Difficulty::Easy,
            },
        ];
        let mut engine = MatchEngine::new(LevelBuilder::default().build(1, &problems));
        let outcome = engine.attempt_match("eq1", "eq2").unwrap();
        assert_eq!(outcome.result, MatchResult::Incorrect);
    }

    #[test]
    fn tick_updates_level_time_and_expires() {
        let mut engine = MatchEngine::new(LevelBuilder::new(3).build(1, &[Problem {
            text: "1 + 1".to_string(),
            answer: Answer::from(2),
            operation: Operation::Addition,
            difficulty: Difficulty::Easy,
        }]));
        assert_eq!(engine.tick(), TimerTick::Running(2));
        assert_eq!(engine.level().time_remaining, 2);
        engine.tick();
        assert_eq!(engine.tick(), TimerTick::Expired);
        assert_eq!(engine.phase(), LevelPhase::Expired);
        assert_eq!(engine.tick(), TimerTick::Idle);
        assert!(matches!(
            engine.attempt_match("eq1", "eq1"),
            Err(GameError::LevelInactive(1))
        ));
    }

    #[test]
    fn ticks_after_completion_do_nothing() {
        let mut engine = engine_with(1);
        engine.tick();
        engine.attempt_match("eq1", "eq1").unwrap();
        assert_eq!(engine.tick(), TimerTick::Idle);
        assert_eq!(engine.level().time_remaining, 59);
    }
}
