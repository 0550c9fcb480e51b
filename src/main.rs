mod app;
mod event;
mod ui;

use std::fs::{self, File};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mathmatch::config::Config;
use mathmatch::engine::level::{DifficultyMode, OperationMode};
use mathmatch::{Difficulty, Operation};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::board::Board;
use ui::components::level_summary::LevelSummary;
use ui::components::progress_bar::TimerBar;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "mathmatch",
    version,
    about = "Match math problems to their answers before the clock runs out"
)]
struct Cli {
    #[arg(short, long, help = "Player name for the high-score table")]
    name: Option<String>,

    #[arg(short, long, value_parser = parse_operation, help = "addition, subtraction, multiplication or division")]
    operation: Option<Operation>,

    #[arg(short, long, value_parser = parse_difficulty, help = "easy, medium or hard")]
    difficulty: Option<Difficulty>,

    #[arg(short, long, help = "Path to a problem catalog JSON file")]
    catalog: Option<String>,

    #[arg(long, help = "Let the level choose both operation mix and difficulty")]
    by_level: bool,

    #[arg(long, help = "Start with feedback cues muted")]
    mute: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::from_key(s).ok_or_else(|| format!("unknown operation '{s}'"))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_key(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(name) = self.name {
            config.player_name = name;
        }
        if let Some(operation) = self.operation {
            config.operation = operation;
            config.operation_mode = OperationMode::Fixed;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
            config.difficulty_mode = DifficultyMode::Chosen;
        }
        if self.catalog.is_some() {
            config.catalog_path = self.catalog;
        }
        if self.by_level {
            config.operation_mode = OperationMode::ByLevel;
            config.difficulty_mode = DifficultyMode::ByLevel;
        }
        if self.mute {
            config.muted = true;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        config.validate();
    }
}

/// File logging, enabled only when `MATHMATCH_LOG` is set.
fn init_logging() -> Result<()> {
    let Ok(filter) = EnvFilter::try_from_env("MATHMATCH_LOG") else {
        return Ok(());
    };
    let dir = dirs::data_dir()
        .context("no data directory for the log file")?
        .join("mathmatch");
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("mathmatch.log"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {e:#}");
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    cli.apply(&mut config);

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(
            theme = %config.theme,
            available = ?Theme::available_themes(),
            "unknown theme, using default"
        );
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let mut app = App::new(config, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = app.config.save() {
        tracing::warn!("failed to save config: {e:#}");
    }

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
        }

        for _ in 0..app.take_bells() {
            let mut out = io::stdout();
            let _ = out.write_all(b"\x07").and_then(|_| out.flush());
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    let now = Instant::now();
    match app.screen {
        AppScreen::Setup => handle_setup_key(app, key, now),
        AppScreen::Level => handle_level_key(app, key, now),
        AppScreen::LevelComplete => handle_complete_key(app, key, now),
        AppScreen::Error => app.dismiss_error(),
    }
}

fn handle_setup_key(app: &mut App, key: KeyEvent, now: Instant) {
    use crate::ui::components::setup_menu::ROW_START;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Left | KeyCode::Char('h') => app.menu.cycle(false),
        KeyCode::Right | KeyCode::Char('l') => app.menu.cycle(true),
        KeyCode::Char('s') => app.start_game(now),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if app.menu.selected == ROW_START {
                app.start_game(now);
            } else {
                app.menu.cycle(true);
            }
        }
        _ => {}
    }
}

fn handle_level_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.quit_to_setup(now),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(true),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
            app.switch_focus()
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.select(now),
        KeyCode::Char('r') => app.restart_level(now),
        KeyCode::Char('m') => app.toggle_mute(now),
        KeyCode::Char('?') => app.toggle_hint(),
        KeyCode::Char(ch) if ch.is_ascii_digit() && ch != '0' => {
            let index = (ch as usize) - ('1' as usize);
            app.pick_piece(index);
        }
        _ => {}
    }
}

fn handle_complete_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char(' ') => app.next_level(now),
        KeyCode::Char('q') | KeyCode::Esc => app.quit_to_setup(now),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Setup => render_setup(frame, app),
        AppScreen::Level => render_level(frame, app),
        AppScreen::LevelComplete => {
            render_level(frame, app);
            if let Some(summary) = &app.last_completion {
                let popup = centered_rect(50, 50, area);
                frame.render_widget(LevelSummary::new(summary, app.theme), popup);
            }
        }
        AppScreen::Error => render_error(frame, app),
    }
}

fn header_line<'a>(app: &App, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            " mathmatch ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn render_setup(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(" {} | Best {}", app.config.player_name, app.best_score());
    frame.render_widget(header_line(app, info), layout[0]);

    let menu_area = centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [j/k] Move  [h/l] Change  [Enter/s] Start  [q] Quit ",
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_level(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let Some(level) = app.level() else {
        return;
    };
    let app_layout = AppLayout::new(area);

    let mute = if app.is_muted() { " | muted" } else { "" };
    let info = format!(
        " Level {} | Score {} | Best {}{}",
        level.level_number,
        app.total_score(),
        app.best_score(),
        mute
    );
    frame.render_widget(header_line(app, info), app_layout.header);

    frame.render_widget(
        TimerBar::new(level.time_remaining, app.config.level_seconds, app.theme),
        app_layout.timer,
    );

    frame.render_widget(
        Board {
            level,
            target_order: &app.target_order,
            focus: app.focus,
            piece_cursor: app.piece_cursor,
            target_cursor: app.target_cursor,
            held: app.held.as_deref(),
            theme: app.theme,
        },
        app_layout.main,
    );

    let status = if app.show_hint {
        app.game.as_ref().map(|g| g.hint().to_string())
    } else {
        app.flash.clone()
    };
    if let Some(text) = status {
        let status_line = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(colors.accent()),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(status_line, app_layout.status);
    }

    let hints = [
        "[1-9] Pick",
        "[Enter] Pick/Drop",
        "[Tab] Switch column",
        "[r] Restart",
        "[m] Mute",
        "[?] Hint",
        "[q] Menu",
    ];
    let lines: Vec<Line> = pack_hint_lines(&hints, app_layout.footer.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), app_layout.footer);
}

fn render_error(frame: &mut ratatui::Frame, app: &App) {
    let area = centered_rect(60, 40, frame.area());
    let colors = &app.theme.colors;
    let message = app.error.as_deref().unwrap_or("unknown error");

    let block = Block::bordered()
        .title(" Error ")
        .border_style(Style::default().fg(colors.error()));
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(colors.fg()))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(colors.text_pending()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
