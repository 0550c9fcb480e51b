use rand::rngs::SmallRng;

use crate::catalog::ProblemCatalog;
use crate::config::Config;
use crate::engine::level::{DifficultyPolicy, LevelBuilder, LevelState, OperationPolicy};
use crate::engine::matching::{LevelPhase, MatchEngine, MatchResult};
use crate::engine::scoring::ScoreTracker;
use crate::engine::selector::{ProblemSelector, SessionHistory};
use crate::engine::timer::{TimerHandle, TimerSchedule, TimerTick};
use crate::error::GameError;
use crate::session::events::{FeedbackCue, GameCommand, GameEvent, StartOptions};
use crate::store::HighScoreStore;

pub const HINT: &str = "Match the math problems on the left with their answers on the right!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub level_seconds: u32,
    pub problems_per_level: usize,
    pub muted: bool,
}

impl GameSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            level_seconds: config.level_seconds,
            problems_per_level: config.problems_per_level,
            muted: config.muted,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything that lives from `start_game` until `quit`.
pub struct Session {
    user_name: String,
    difficulty: DifficultyPolicy,
    operations: OperationPolicy,
    history: SessionHistory,
    engine: MatchEngine,
    scores: ScoreTracker,
    schedule: TimerSchedule,
}

impl Session {
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn level(&self) -> &LevelState {
        self.engine.level()
    }

    pub fn level_number(&self) -> u32 {
        self.engine.level().level_number
    }

    pub fn phase(&self) -> LevelPhase {
        self.engine.phase()
    }

    pub fn total_score(&self) -> u32 {
        self.scores.total_score()
    }

    pub fn best_score(&self) -> u32 {
        self.scores.best_score()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn difficulty_policy(&self) -> DifficultyPolicy {
        self.difficulty
    }

    pub fn operation_policy(&self) -> OperationPolicy {
        self.operations
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.schedule.active()
    }
}

/// Owns the catalog and high-score store across sessions; at most one session is live.
pub struct Game<S: HighScoreStore> {
    catalog: ProblemCatalog,
    store: S,
    selector: ProblemSelector,
    builder: LevelBuilder,
    problems_per_level: usize,
    muted: bool,
    session: Option<Session>,
}

impl<S: HighScoreStore> Game<S> {
    pub fn new(catalog: ProblemCatalog, store: S, rng: SmallRng, settings: GameSettings) -> Self {
        Self {
            catalog,
            store,
            selector: ProblemSelector::new(rng),
            builder: LevelBuilder::new(settings.level_seconds),
            problems_per_level: settings.problems_per_level,
            muted: settings.muted,
            session: None,
        }
    }

    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn level(&self) -> Option<&LevelState> {
        self.session.as_ref().map(Session::level)
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.session.as_ref().and_then(Session::active_timer)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn hint(&self) -> &'static str {
        HINT
    }

    pub fn apply(&mut self, command: GameCommand) -> Result<Vec<GameEvent>, GameError> {
        match command {
            GameCommand::StartGame(options) => self.start_game(options),
            GameCommand::AttemptMatch {
                piece_id,
                target_id,
            } => self.attempt_match(&piece_id, &target_id),
            GameCommand::Tick(handle) => self.tick(handle),
            GameCommand::NextLevel => self.next_level(),
            GameCommand::RestartLevel => self.restart_level(),
            GameCommand::ToggleMute => {
                self.toggle_mute();
                Ok(Vec::new())
            }
            GameCommand::Quit => {
                self.quit();
                Ok(Vec::new())
            }
        }
    }

    /// Begin a new session at level 1. On failure any previous session is left as it was.
    pub fn start_game(&mut self, options: StartOptions) -> Result<Vec<GameEvent>, GameError> {
        let difficulty = DifficultyPolicy::from_mode(options.difficulty_mode, options.difficulty);
        let operations = OperationPolicy::from_mode(options.operation_mode, options.operation);
        let mut history = SessionHistory::new();

        let level = build_level(
            &self.catalog,
            &mut self.selector,
            &self.builder,
            self.problems_per_level,
            &mut history,
            difficulty,
            operations,
            1,
        )?;

        let best = self.store.best_score(&options.user_name);
        let mut schedule = TimerSchedule::new();
        schedule.start();

        tracing::info!(
            user = %options.user_name,
            ?difficulty,
            ?operations,
            best,
            "game started"
        );

        self.session = Some(Session {
            user_name: options.user_name,
            difficulty,
            operations,
            history,
            engine: MatchEngine::new(level.clone()),
            scores: ScoreTracker::new(best),
            schedule,
        });

        Ok(vec![GameEvent::LevelBuilt(level)])
    }

    pub fn attempt_match(
        &mut self,
        piece_id: &str,
        target_id: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        let session = self.session.as_mut().ok_or(GameError::NoActiveSession)?;

        let outcome = match session.engine.attempt_match(piece_id, target_id) {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, GameError::InvalidMatchTarget { .. }) {
                    tracing::warn!(piece_id, target_id, "match attempt against unknown ids");
                } else {
                    tracing::debug!(piece_id, target_id, "ignored match attempt: {err}");
                }
                return Err(err);
            }
        };

        let mut events = vec![GameEvent::Matched {
            piece_id: piece_id.to_string(),
            target_id: target_id.to_string(),
            result: outcome.result,
        }];
        let cue = match outcome.result {
            MatchResult::Correct => FeedbackCue::Correct,
            MatchResult::Incorrect => FeedbackCue::Wrong,
        };
        if !self.muted {
            events.push(GameEvent::Cue(cue));
        }

        if outcome.level_completed {
            session.schedule.cancel();
            let level_number = session.level_number();
            let score = session
                .scores
                .record_completion(session.engine.level().time_remaining);

            if score.is_new_high_score
                && let Err(e) = self.store.record_best(&session.user_name, score.total_score)
            {
                tracing::warn!(user = %session.user_name, "failed to save high score: {e:#}");
            }

            tracing::info!(
                level_number,
                bonus = score.bonus,
                total = score.total_score,
                new_high = score.is_new_high_score,
                "level completed"
            );

            events.push(GameEvent::LevelCompleted {
                level_number,
                bonus: score.bonus,
                total_score: score.total_score,
                is_new_high_score: score.is_new_high_score,
            });
            if !self.muted {
                events.push(GameEvent::Cue(FeedbackCue::LevelComplete));
            }
        }

        Ok(events)
    }

    /// One second of countdown for the level that issued `handle`.
    ///
    /// Stale handles and ticks with no session are dropped silently. Expiry
    /// rebuilds the same level with a fresh draw.
    pub fn tick(&mut self, handle: TimerHandle) -> Result<Vec<GameEvent>, GameError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };
        if !session.schedule.is_current(handle) {
            tracing::debug!(?handle, "dropping tick from a cancelled timer");
            return Ok(Vec::new());
        }

        match session.engine.tick() {
            TimerTick::Running(remaining) => Ok(vec![GameEvent::TickUpdated(remaining)]),
            TimerTick::Idle => Ok(Vec::new()),
            TimerTick::Expired => {
                session.schedule.cancel();
                let level_number = session.level_number();
                tracing::info!(level_number, "time expired, restarting level");

                let mut events = vec![
                    GameEvent::TickUpdated(0),
                    GameEvent::TimeExpired { level_number },
                ];
                events.extend(self.rebuild(level_number)?);
                Ok(events)
            }
        }
    }

    /// Advance to the next level. Only valid once the current level is complete.
    pub fn next_level(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let session = self.session.as_ref().ok_or(GameError::NoActiveSession)?;
        if session.phase() != LevelPhase::Complete {
            tracing::debug!(phase = ?session.phase(), "next level requested before completion");
            return Ok(Vec::new());
        }
        let next = session.level_number() + 1;
        self.rebuild(next)
    }

    /// Rebuild the current level. A completed level has been scored and cannot be replayed.
    pub fn restart_level(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let session = self.session.as_ref().ok_or(GameError::NoActiveSession)?;
        if session.phase() == LevelPhase::Complete {
            tracing::debug!("restart requested on a completed level");
            return Ok(Vec::new());
        }
        let current = session.level_number();
        self.rebuild(current)
    }

    /// End the session. Score, level and history go with it.
    pub fn quit(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(
                user = %session.user_name,
                total = session.total_score(),
                "game ended"
            );
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    fn rebuild(&mut self, level_number: u32) -> Result<Vec<GameEvent>, GameError> {
        let session = self.session.as_mut().ok_or(GameError::NoActiveSession)?;
        let level = build_level(
            &self.catalog,
            &mut self.selector,
            &self.builder,
            self.problems_per_level,
            &mut session.history,
            session.difficulty,
            session.operations,
            level_number,
        )?;

        session.engine = MatchEngine::new(level.clone());
        session.schedule.start();
        tracing::debug!(level_number, pieces = level.pieces.len(), "level built");

        Ok(vec![GameEvent::LevelBuilt(level)])
    }
}

#[allow(clippy::too_many_arguments)]
fn build_level(
    catalog: &ProblemCatalog,
    selector: &mut ProblemSelector,
    builder: &LevelBuilder,
    count: usize,
    history: &mut SessionHistory,
    difficulty: DifficultyPolicy,
    operations: OperationPolicy,
    level_number: u32,
) -> Result<LevelState, GameError> {
    let difficulty = difficulty.difficulty_for(level_number);
    let operations = operations.operations_for(level_number);
    let problems = selector.select_mixed(catalog, history, &operations, difficulty, count)?;
    Ok(builder.build(level_number, &problems))
}
