use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use mathmatch::engine::level::{DifficultyMode, OperationMode};
use mathmatch::engine::matching::{LevelPhase, MatchResult};
use mathmatch::session::{FeedbackCue, Game, GameCommand, GameEvent, GameSettings, StartOptions};
use mathmatch::store::HighScoreStore;
use mathmatch::store::json_store::JsonStore;
use mathmatch::{Answer, Difficulty, GameError, Operation, ProblemCatalog};

fn options(operation_mode: OperationMode, difficulty_mode: DifficultyMode) -> StartOptions {
    StartOptions {
        user_name: "ada".to_string(),
        operation: Operation::Addition,
        difficulty: Difficulty::Easy,
        operation_mode,
        difficulty_mode,
    }
}

fn json_game(dir: &TempDir, seed: u64) -> Game<JsonStore> {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    Game::new(
        ProblemCatalog::bundled().unwrap(),
        store,
        SmallRng::seed_from_u64(seed),
        GameSettings::default(),
    )
}

fn piece_ids(game: &Game<JsonStore>) -> Vec<String> {
    game.level()
        .unwrap()
        .pieces
        .iter()
        .map(|p| p.id.clone())
        .collect()
}

fn solve(game: &mut Game<JsonStore>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for id in piece_ids(game) {
        events.extend(game.attempt_match(&id, &id).unwrap());
    }
    events
}

#[test]
fn full_session_scores_and_persists() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 21);

    let events = game
        .apply(GameCommand::StartGame(options(
            OperationMode::Fixed,
            DifficultyMode::Chosen,
        )))
        .unwrap();
    assert!(matches!(&events[..], [GameEvent::LevelBuilt(level)] if level.level_number == 1));

    let events = solve(&mut game);
    assert!(events.contains(&GameEvent::LevelCompleted {
        level_number: 1,
        bonus: 6,
        total_score: 6,
        is_new_high_score: true,
    }));
    assert_eq!(
        events.last(),
        Some(&GameEvent::Cue(FeedbackCue::LevelComplete))
    );
    assert_eq!(game.session().unwrap().phase(), LevelPhase::Complete);

    // A second, fresh store over the same directory sees the persisted best.
    let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(reopened.best_score("ada"), 6);

    let events = game.apply(GameCommand::NextLevel).unwrap();
    assert!(matches!(&events[..], [GameEvent::LevelBuilt(level)] if level.level_number == 2));

    let events = solve(&mut game);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::LevelCompleted {
            level_number: 2,
            total_score: 12,
            is_new_high_score: true,
            ..
        }
    )));

    game.apply(GameCommand::Quit).unwrap();
    assert!(game.session().is_none());
    assert_eq!(game.store().best_score("ada"), 12);
}

#[test]
fn wrong_match_leaves_level_untouched() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 5);
    game.start_game(options(OperationMode::Fixed, DifficultyMode::Chosen))
        .unwrap();

    let ids = piece_ids(&game);
    let before = game.level().unwrap().clone();
    let events = game.attempt_match(&ids[0], &ids[1]).unwrap();

    assert_eq!(
        events[0],
        GameEvent::Matched {
            piece_id: ids[0].clone(),
            target_id: ids[1].clone(),
            result: MatchResult::Incorrect,
        }
    );
    assert_eq!(events[1], GameEvent::Cue(FeedbackCue::Wrong));
    assert_eq!(game.level().unwrap(), &before);

    game.attempt_match(&ids[0], &ids[0]).unwrap();
    assert_eq!(
        game.attempt_match(&ids[0], &ids[0]),
        Err(GameError::AlreadyMatched(ids[0].clone()))
    );
    assert!(matches!(
        game.attempt_match("eq9", &ids[0]),
        Err(GameError::InvalidMatchTarget { .. })
    ));
}

#[test]
fn countdown_expiry_restarts_same_level() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 9);
    game.start_game(options(OperationMode::Fixed, DifficultyMode::Chosen))
        .unwrap();
    let handle = game.active_timer().unwrap();

    for expected in (1..60).rev() {
        let events = game.apply(GameCommand::Tick(handle)).unwrap();
        assert_eq!(events, vec![GameEvent::TickUpdated(expected)]);
    }

    let events = game.apply(GameCommand::Tick(handle)).unwrap();
    assert_eq!(events[0], GameEvent::TickUpdated(0));
    assert_eq!(events[1], GameEvent::TimeExpired { level_number: 1 });
    match &events[2] {
        GameEvent::LevelBuilt(level) => {
            assert_eq!(level.level_number, 1);
            assert_eq!(level.time_remaining, 60);
            assert!(level.matched_ids.is_empty());
        }
        other => panic!("expected a rebuilt level, got {other:?}"),
    }

    // The old countdown was cancelled with the level it belonged to.
    assert!(game.apply(GameCommand::Tick(handle)).unwrap().is_empty());
    assert_ne!(game.active_timer(), Some(handle));
    assert_eq!(game.store().best_score("ada"), 0);
}

#[test]
fn restart_cancels_previous_countdown() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 3);
    game.start_game(options(OperationMode::Fixed, DifficultyMode::Chosen))
        .unwrap();
    let first = game.active_timer().unwrap();
    game.apply(GameCommand::Tick(first)).unwrap();

    game.apply(GameCommand::RestartLevel).unwrap();
    let second = game.active_timer().unwrap();

    assert!(game.tick(first).unwrap().is_empty());
    assert_eq!(game.level().unwrap().time_remaining, 60);
    assert_eq!(
        game.tick(second).unwrap(),
        vec![GameEvent::TickUpdated(59)]
    );
}

#[test]
fn by_level_session_widens_operations_without_repeats() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 17);
    let catalog = ProblemCatalog::bundled().unwrap();
    game.start_game(options(OperationMode::ByLevel, DifficultyMode::ByLevel))
        .unwrap();

    let mut seen_texts = HashSet::new();
    for level_number in 1..=3u32 {
        let level = game.level().unwrap().clone();
        assert_eq!(level.level_number, level_number);

        let answers: HashSet<Answer> = level.pieces.iter().map(|p| p.answer).collect();
        assert_eq!(answers.len(), level.pieces.len());

        let allowed = &Operation::ALL[..level_number as usize];
        for piece in &level.pieces {
            assert!(seen_texts.insert(piece.text.clone()), "repeated {}", piece.text);
            let in_allowed_pool = allowed.iter().any(|&op| {
                catalog
                    .problems(op, Difficulty::Easy)
                    .iter()
                    .any(|p| p.text == piece.text)
            });
            assert!(in_allowed_pool, "{} outside level {level_number} mix", piece.text);
        }

        solve(&mut game);
        game.next_level().unwrap();
    }

    assert_eq!(game.level().unwrap().level_number, 4);
}

#[test]
fn muted_session_emits_no_cues() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 2);
    assert!(game.toggle_mute());
    game.start_game(options(OperationMode::Fixed, DifficultyMode::Chosen))
        .unwrap();

    let events = solve(&mut game);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Cue(_))));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::LevelCompleted { .. })));
}

#[test]
fn commands_without_session_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut game = json_game(&dir, 1);
    assert_eq!(game.next_level(), Err(GameError::NoActiveSession));
    assert_eq!(game.restart_level(), Err(GameError::NoActiveSession));
    assert_eq!(
        game.attempt_match("eq1", "eq1"),
        Err(GameError::NoActiveSession)
    );
}

#[test]
fn undersized_catalog_fails_to_start() {
    let json = r#"{"division": {"hard": [
        {"text": "4 ÷ 2", "answer": 2},
        {"text": "6 ÷ 3", "answer": 2}
    ]}}"#;
    let catalog = ProblemCatalog::from_json(json).unwrap();
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut game = Game::new(
        catalog,
        store,
        SmallRng::seed_from_u64(4),
        GameSettings::default(),
    );

    let mut opts = options(OperationMode::Fixed, DifficultyMode::Chosen);
    opts.operation = Operation::Division;
    opts.difficulty = Difficulty::Hard;

    match game.start_game(opts) {
        Err(GameError::InsufficientPool {
            needed, available, ..
        }) => {
            assert_eq!(needed, 3);
            assert_eq!(available, 1);
        }
        other => panic!("expected InsufficientPool, got {other:?}"),
    }
    assert!(game.session().is_none());
}
