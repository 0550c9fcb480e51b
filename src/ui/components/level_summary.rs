use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionSummary {
    pub level_number: u32,
    pub bonus: u32,
    pub total_score: u32,
    pub is_new_high_score: bool,
}

pub struct LevelSummary<'a> {
    pub summary: &'a CompletionSummary,
    pub theme: &'a Theme,
}

impl<'a> LevelSummary<'a> {
    pub fn new(summary: &'a CompletionSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

impl Widget for LevelSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(format!(" Level {} Complete! ", self.summary.level_number))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let bonus_line = Line::from(vec![
            Span::styled("  Time bonus:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("+{}", self.summary.bonus),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(bonus_line).render(layout[1], buf);

        let total_line = Line::from(vec![
            Span::styled("  Total score: ", Style::default().fg(colors.fg())),
            Span::styled(
                self.summary.total_score.to_string(),
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(total_line).render(layout[2], buf);

        if self.summary.is_new_high_score {
            Paragraph::new(Line::from(Span::styled(
                "New high score!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[3], buf);
        }

        Paragraph::new(Line::from(vec![
            Span::styled("  [Enter/n] Next level  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Menu", Style::default().fg(colors.accent())),
        ]))
        .render(layout[5], buf);
    }
}
