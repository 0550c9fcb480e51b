use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathmatch::engine::level::LevelState;

use crate::ui::layout::board_columns;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardFocus {
    Pieces,
    Targets,
}

/// Pieces on the left, targets on the right in their shuffled display order.
pub struct Board<'a> {
    pub level: &'a LevelState,
    pub target_order: &'a [usize],
    pub focus: BoardFocus,
    pub piece_cursor: usize,
    pub target_cursor: usize,
    pub held: Option<&'a str>,
    pub theme: &'a Theme,
}

struct Slot {
    label: String,
    matched: bool,
    held: bool,
    under_cursor: bool,
}

impl Board<'_> {
    fn piece_slots(&self) -> Vec<Slot> {
        self.level
            .pieces
            .iter()
            .enumerate()
            .map(|(i, p)| Slot {
                label: format!("{}. {}", i + 1, p.text),
                matched: self.level.is_matched(&p.id),
                held: self.held == Some(p.id.as_str()),
                under_cursor: self.focus == BoardFocus::Pieces && i == self.piece_cursor,
            })
            .collect()
    }

    fn target_slots(&self) -> Vec<Slot> {
        self.target_order
            .iter()
            .enumerate()
            .filter_map(|(display_idx, &idx)| {
                let t = self.level.targets.get(idx)?;
                Some(Slot {
                    label: t.answer.to_string(),
                    matched: self.level.is_matched(&t.id),
                    held: false,
                    under_cursor: self.focus == BoardFocus::Targets
                        && display_idx == self.target_cursor,
                })
            })
            .collect()
    }

    fn render_column(&self, title: &str, focused: bool, slots: &[Slot], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(if focused {
                colors.border_focused()
            } else {
                colors.border()
            }));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(slots.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
            .split(inner);

        for (slot, row) in slots.iter().zip(rows.iter()) {
            let border_color = if slot.matched {
                colors.matched()
            } else if slot.held || slot.under_cursor {
                colors.selected()
            } else {
                colors.border()
            };
            let mut text_style = Style::default().fg(if slot.matched {
                colors.matched()
            } else {
                colors.fg()
            });
            if slot.under_cursor {
                text_style = text_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            } else if slot.held {
                text_style = text_style.add_modifier(Modifier::BOLD);
            }

            let suffix = if slot.matched {
                "  \u{2713}"
            } else if slot.held {
                "  (held)"
            } else {
                ""
            };

            let cell = Block::bordered().border_style(Style::default().fg(border_color));
            let cell_inner = cell.inner(*row);
            cell.render(*row, buf);
            Paragraph::new(Line::from(vec![
                Span::styled(slot.label.as_str(), text_style),
                Span::styled(suffix, Style::default().fg(colors.text_pending())),
            ]))
            .alignment(Alignment::Center)
            .render(cell_inner, buf);
        }
    }
}

impl Widget for Board<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (left, right) = board_columns(area);
        let pieces = self.piece_slots();
        let targets = self.target_slots();
        let pieces_title = format!("Problems ({} left)", self.level.unmatched_count());
        self.render_column(
            &pieces_title,
            self.focus == BoardFocus::Pieces,
            &pieces,
            left,
            buf,
        );
        self.render_column(
            "Answers",
            self.focus == BoardFocus::Targets,
            &targets,
            right,
            buf,
        );
    }
}
