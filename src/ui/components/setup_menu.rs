use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathmatch::catalog::{Difficulty, Operation};
use mathmatch::engine::level::{DifficultyMode, OperationMode};
use mathmatch::session::StartOptions;

use crate::ui::theme::Theme;

const ROW_OPERATION: usize = 0;
const ROW_DIFFICULTY: usize = 1;
const ROW_OPERATION_MODE: usize = 2;
const ROW_DIFFICULTY_MODE: usize = 3;
pub const ROW_START: usize = 4;
const ROW_COUNT: usize = 5;

/// Operation/difficulty pickers shown before a game starts.
pub struct SetupMenu<'a> {
    pub selected: usize,
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operation_mode: OperationMode,
    pub difficulty_mode: DifficultyMode,
    pub player_name: String,
    pub best_score: u32,
    pub theme: &'a Theme,
}

impl<'a> SetupMenu<'a> {
    pub fn new(player_name: &str, theme: &'a Theme) -> Self {
        Self {
            selected: ROW_START,
            operation: Operation::Addition,
            difficulty: Difficulty::Easy,
            operation_mode: OperationMode::Fixed,
            difficulty_mode: DifficultyMode::Chosen,
            player_name: player_name.to_string(),
            best_score: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % ROW_COUNT;
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = ROW_COUNT - 1;
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        match self.selected {
            ROW_OPERATION => {
                self.operation = cycle_in(&Operation::ALL, self.operation, forward);
            }
            ROW_DIFFICULTY => {
                self.difficulty = cycle_in(&Difficulty::ALL, self.difficulty, forward);
            }
            ROW_OPERATION_MODE => {
                self.operation_mode = match self.operation_mode {
                    OperationMode::Fixed => OperationMode::ByLevel,
                    OperationMode::ByLevel => OperationMode::Fixed,
                };
            }
            ROW_DIFFICULTY_MODE => {
                self.difficulty_mode = match self.difficulty_mode {
                    DifficultyMode::Chosen => DifficultyMode::ByLevel,
                    DifficultyMode::ByLevel => DifficultyMode::Chosen,
                };
            }
            _ => {}
        }
    }

    pub fn start_options(&self) -> StartOptions {
        StartOptions {
            user_name: self.player_name.clone(),
            operation: self.operation,
            difficulty: self.difficulty,
            operation_mode: self.operation_mode,
            difficulty_mode: self.difficulty_mode,
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let operation = match self.operation_mode {
            OperationMode::Fixed => self.operation.label().to_string(),
            OperationMode::ByLevel => format!("{} (ignored)", self.operation.label()),
        };
        let difficulty = match self.difficulty_mode {
            DifficultyMode::Chosen => self.difficulty.label().to_string(),
            DifficultyMode::ByLevel => format!("{} (ignored)", self.difficulty.label()),
        };
        vec![
            ("Operation", operation),
            ("Difficulty", difficulty),
            (
                "Operation mix",
                match self.operation_mode {
                    OperationMode::Fixed => "Fixed".to_string(),
                    OperationMode::ByLevel => "Grows with level".to_string(),
                },
            ),
            (
                "Difficulty mode",
                match self.difficulty_mode {
                    DifficultyMode::Chosen => "Chosen".to_string(),
                    DifficultyMode::ByLevel => "Rises with level".to_string(),
                },
            ),
            ("Start game", String::new()),
        ]
    }
}

fn cycle_in<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else if idx == 0 {
        all.len() - 1
    } else {
        idx - 1
    };
    all[next]
}

impl Widget for &SetupMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "mathmatch",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Player: {}  |  Best: {}", self.player_name, self.best_score),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let rows = self.rows();
        let row_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(rows.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
            .split(layout[2]);

        for (i, (label, value)) in rows.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = Style::default()
                .fg(if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let mut spans = vec![Span::styled(format!(" {indicator} {label}"), label_style)];
            if !value.is_empty() {
                spans.push(Span::styled(
                    format!("   < {value} >"),
                    Style::default().fg(if is_selected {
                        colors.selected()
                    } else {
                        colors.text_pending()
                    }),
                ));
            }

            if i < row_layout.len() {
                Paragraph::new(Line::from(spans)).render(row_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_both_ways() {
        let theme = Theme::default();
        let mut menu = SetupMenu::new("ada", &theme);
        menu.selected = ROW_OPERATION;
        menu.cycle(false);
        assert_eq!(menu.operation, Operation::Division);
        menu.cycle(true);
        assert_eq!(menu.operation, Operation::Addition);

        menu.next();
        menu.cycle(true);
        assert_eq!(menu.difficulty, Difficulty::Medium);
    }

    #[test]
    fn navigation_wraps_around_rows() {
        let theme = Theme::default();
        let mut menu = SetupMenu::new("ada", &theme);
        assert_eq!(menu.selected, ROW_START);
        menu.next();
        assert_eq!(menu.selected, ROW_OPERATION);
        menu.prev();
        assert_eq!(menu.selected, ROW_START);
    }

    #[test]
    fn start_options_reflect_choices() {
        let theme = Theme::default();
        let mut menu = SetupMenu::new("ada", &theme);
        menu.selected = ROW_DIFFICULTY_MODE;
        menu.cycle(true);
        let options = menu.start_options();
        assert_eq!(options.user_name, "ada");
        assert_eq!(options.difficulty_mode, DifficultyMode::ByLevel);
        assert_eq!(options.operation_mode, OperationMode::Fixed);
    }
}
