use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use mathmatch::config::Config;
use mathmatch::engine::level::LevelState;
use mathmatch::engine::matching::MatchResult;
use mathmatch::error::GameError;
use mathmatch::session::{FeedbackCue, Game, GameCommand, GameEvent, GameSettings};
use mathmatch::store::json_store::JsonStore;
use mathmatch::store::{HighScoreStore, MemoryStore};
use mathmatch::ProblemCatalog;

use crate::event::SecondTicker;
use crate::ui::components::board::BoardFocus;
use crate::ui::components::level_summary::CompletionSummary;
use crate::ui::components::setup_menu::SetupMenu;
use crate::ui::theme::Theme;

pub type AppGame = Game<Box<dyn HighScoreStore>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Setup,
    Level,
    LevelComplete,
    Error,
}

pub struct App {
    pub screen: AppScreen,
    pub game: Option<AppGame>,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: SetupMenu<'static>,
    pub focus: BoardFocus,
    pub piece_cursor: usize,
    pub target_cursor: usize,
    pub held: Option<String>,
    pub target_order: Vec<usize>,
    pub flash: Option<String>,
    pub last_completion: Option<CompletionSummary>,
    pub error: Option<String>,
    pub show_hint: bool,
    pub should_quit: bool,
    pending_bells: u32,
    ticker: Option<SecondTicker>,
    rng: SmallRng,
}

impl App {
    /// Load the catalog and high-score store named by `config`.
    ///
    /// A missing data directory falls back to an in-memory store; a broken
    /// catalog leaves the app on the error screen.
    pub fn new(config: Config, theme: &'static Theme) -> Self {
        let catalog = match config.catalog_path.as_deref() {
            Some(path) => ProblemCatalog::load(Path::new(path)),
            None => ProblemCatalog::bundled(),
        };

        let store: Box<dyn HighScoreStore> = match JsonStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!("high scores will not persist: {e:#}");
                Box::new(MemoryStore::new())
            }
        };

        let game = catalog.map(|catalog| {
            Game::new(
                catalog,
                store,
                SmallRng::from_entropy(),
                GameSettings::from_config(&config),
            )
        });
        Self::from_parts(config, theme, game, SmallRng::from_entropy())
    }

    pub fn from_parts(
        config: Config,
        theme: &'static Theme,
        game: Result<AppGame, GameError>,
        rng: SmallRng,
    ) -> Self {
        let mut menu = SetupMenu::new(&config.player_name, theme);
        menu.operation = config.operation;
        menu.difficulty = config.difficulty;
        menu.operation_mode = config.operation_mode;
        menu.difficulty_mode = config.difficulty_mode;

        let (screen, game, error) = match game {
            Ok(game) => {
                menu.best_score = game.store().best_score(&config.player_name);
                (AppScreen::Setup, Some(game), None)
            }
            Err(e) => {
                tracing::error!("cannot load problems: {e}");
                (AppScreen::Error, None, Some(e.to_string()))
            }
        };

        Self {
            screen,
            game,
            config,
            theme,
            menu,
            focus: BoardFocus::Pieces,
            piece_cursor: 0,
            target_cursor: 0,
            held: None,
            target_order: Vec::new(),
            flash: None,
            last_completion: None,
            error,
            show_hint: false,
            should_quit: false,
            pending_bells: 0,
            ticker: None,
            rng,
        }
    }

    pub fn level(&self) -> Option<&LevelState> {
        self.game.as_ref().and_then(|g| g.level())
    }

    pub fn total_score(&self) -> u32 {
        self.game
            .as_ref()
            .and_then(|g| g.session())
            .map(|s| s.total_score())
            .unwrap_or(0)
    }

    pub fn best_score(&self) -> u32 {
        self.game
            .as_ref()
            .and_then(|g| g.session())
            .map(|s| s.best_score())
            .unwrap_or(self.menu.best_score)
    }

    pub fn is_muted(&self) -> bool {
        self.game.as_ref().is_some_and(|g| g.is_muted())
    }

    /// Bells queued by feedback cues since the last call.
    pub fn take_bells(&mut self) -> u32 {
        std::mem::take(&mut self.pending_bells)
    }

    pub fn start_game(&mut self, now: Instant) {
        let options = self.menu.start_options();
        self.config.operation = options.operation;
        self.config.difficulty = options.difficulty;
        self.config.operation_mode = options.operation_mode;
        self.config.difficulty_mode = options.difficulty_mode;

        self.last_completion = None;
        self.flash = None;
        self.dispatch(GameCommand::StartGame(options), now);
    }

    /// Deliver any whole seconds that have passed to the running level.
    pub fn on_tick(&mut self, now: Instant) {
        if self.screen != AppScreen::Level {
            return;
        }
        let Some(mut ticker) = self.ticker else {
            return;
        };
        let due = ticker.due(now);
        self.ticker = Some(ticker);
        for _ in 0..due {
            self.dispatch(GameCommand::Tick(ticker.handle()), now);
            if self.screen != AppScreen::Level {
                break;
            }
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = match self.focus {
            BoardFocus::Pieces => self.level().map(|l| l.pieces.len()).unwrap_or(0),
            BoardFocus::Targets => self.target_order.len(),
        };
        if len == 0 {
            return;
        }
        let cursor = match self.focus {
            BoardFocus::Pieces => &mut self.piece_cursor,
            BoardFocus::Targets => &mut self.target_cursor,
        };
        *cursor = if down {
            (*cursor + 1) % len
        } else if *cursor == 0 {
            len - 1
        } else {
            *cursor - 1
        };
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            BoardFocus::Pieces => BoardFocus::Targets,
            BoardFocus::Targets => BoardFocus::Pieces,
        };
    }

    /// Pick up the piece under the cursor, or drop the held piece on the
    /// target under the cursor.
    pub fn select(&mut self, now: Instant) {
        match self.focus {
            BoardFocus::Pieces => self.pick_piece(self.piece_cursor),
            BoardFocus::Targets => {
                let Some(piece_id) = self.held.clone() else {
                    self.flash = Some("Pick a problem first.".to_string());
                    return;
                };
                let target_id = self
                    .target_order
                    .get(self.target_cursor)
                    .and_then(|&idx| self.level().and_then(|l| l.targets.get(idx)))
                    .map(|t| t.id.clone());
                let Some(target_id) = target_id else {
                    return;
                };
                self.held = None;
                self.focus = BoardFocus::Pieces;
                self.dispatch(
                    GameCommand::AttemptMatch {
                        piece_id,
                        target_id,
                    },
                    now,
                );
            }
        }
    }

    pub fn pick_piece(&mut self, index: usize) {
        let Some(piece) = self.level().and_then(|l| l.pieces.get(index)) else {
            return;
        };
        let id = piece.id.clone();
        if self.level().is_some_and(|l| l.is_matched(&id)) {
            self.flash = Some("That one is already matched.".to_string());
            return;
        }
        self.piece_cursor = index;
        self.held = Some(id);
        self.focus = BoardFocus::Targets;
    }

    pub fn next_level(&mut self, now: Instant) {
        self.dispatch(GameCommand::NextLevel, now);
    }

    pub fn restart_level(&mut self, now: Instant) {
        self.flash = None;
        self.dispatch(GameCommand::RestartLevel, now);
    }

    pub fn toggle_mute(&mut self, now: Instant) {
        self.dispatch(GameCommand::ToggleMute, now);
        self.config.muted = self.is_muted();
        self.flash = Some(if self.config.muted {
            "Sound off".to_string()
        } else {
            "Sound on".to_string()
        });
    }

    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }

    pub fn quit_to_setup(&mut self, now: Instant) {
        self.dispatch(GameCommand::Quit, now);
        self.ticker = None;
        self.held = None;
        self.flash = None;
        if let Some(game) = &self.game {
            self.menu.best_score = game.store().best_score(&self.config.player_name);
        }
        self.screen = AppScreen::Setup;
    }

    /// Leave the error screen. Without a game there is nothing to go back to.
    pub fn dismiss_error(&mut self) {
        self.error = None;
        if self.game.is_some() {
            self.screen = AppScreen::Setup;
        } else {
            self.should_quit = true;
        }
    }

    fn dispatch(&mut self, command: GameCommand, now: Instant) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game.apply(command) {
            Ok(events) => {
                for event in events {
                    self.handle_event(event, now);
                }
            }
            Err(e) if e.is_benign() => {
                tracing::debug!("ignored: {e}");
            }
            Err(e) => {
                tracing::error!("{e}");
                self.ticker = None;
                self.error = Some(e.to_string());
                self.screen = AppScreen::Error;
            }
        }
    }

    fn handle_event(&mut self, event: GameEvent, now: Instant) {
        match event {
            GameEvent::LevelBuilt(level) => {
                self.focus = BoardFocus::Pieces;
                self.piece_cursor = 0;
                self.target_cursor = 0;
                self.held = None;
                self.target_order = (0..level.targets.len()).collect();
                self.target_order.shuffle(&mut self.rng);
                self.ticker = self
                    .game
                    .as_ref()
                    .and_then(|g| g.active_timer())
                    .map(|handle| SecondTicker::new(handle, now));
                self.screen = AppScreen::Level;
            }
            GameEvent::Matched { result, .. } => match result {
                MatchResult::Correct => {
                    self.flash = Some("Correct!".to_string());
                    self.advance_piece_cursor();
                }
                MatchResult::Incorrect => {
                    self.flash = Some("Not quite, try again.".to_string());
                }
            },
            GameEvent::LevelCompleted {
                level_number,
                bonus,
                total_score,
                is_new_high_score,
            } => {
                self.ticker = None;
                self.last_completion = Some(CompletionSummary {
                    level_number,
                    bonus,
                    total_score,
                    is_new_high_score,
                });
                self.screen = AppScreen::LevelComplete;
            }
            GameEvent::TimeExpired { .. } => {
                self.ticker = None;
                self.flash = Some("Time's up! Try again.".to_string());
            }
            GameEvent::TickUpdated(_) => {}
            GameEvent::Cue(cue) => {
                tracing::trace!(cue = cue.as_str(), "feedback cue");
                if cue != FeedbackCue::Correct {
                    self.pending_bells += 1;
                }
            }
        }
    }

    fn advance_piece_cursor(&mut self) {
        let Some(level) = self.level() else {
            return;
        };
        let len = level.pieces.len();
        let next = (1..=len)
            .map(|step| (self.piece_cursor + step) % len)
            .find(|&i| !level.is_matched(&level.pieces[i].id));
        if let Some(next) = next {
            self.piece_cursor = next;
        }
    }
}
