use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Countdown bar; turns to the warning colour in the last ten seconds.
pub struct TimerBar<'a> {
    pub remaining: u32,
    pub total: u32,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(remaining: u32, total: u32, theme: &'a Theme) -> Self {
        Self {
            remaining,
            total,
            theme,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.remaining as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Time ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let fill = if self.remaining <= 10 {
            colors.warning()
        } else {
            colors.bar_filled()
        };
        let label = format!("{}s", self.remaining);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        let theme = Theme::default();
        assert_eq!(TimerBar::new(30, 60, &theme).ratio(), 0.5);
        assert_eq!(TimerBar::new(90, 60, &theme).ratio(), 1.0);
        assert_eq!(TimerBar::new(5, 0, &theme).ratio(), 0.0);
    }
}
