//! # StatusBar Component
//!
//! Bottom line: key hints on the left, the current location and theme
//! transition marker on the right.
//!
//! Stateless. Everything it shows arrives as props.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;
use crate::tui::components::truncate_str;
use crate::tui::palette::Palette;

pub const KEY_HINTS: &str = "1-9 guide · \\ theme · Tab focus · Enter open · Esc close · q quit";

pub struct StatusBar {
    pub location: String,
    pub transitioning: bool,
    pub palette: Palette,
}

impl StatusBar {
    pub fn new(location: String, transitioning: bool, palette: Palette) -> Self {
        Self {
            location,
            transitioning,
            palette,
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let right = if self.transitioning {
            format!("{} ✦", self.location)
        } else {
            self.location.clone()
        };
        let width = area.width as usize;
        let right_width = right.width().min(width);
        let hints = truncate_str(KEY_HINTS, width.saturating_sub(right_width + 1));
        let gap = width.saturating_sub(hints.width() + right_width);

        let line = Line::from(vec![
            Span::styled(hints, self.palette.muted()),
            Span::raw(" ".repeat(gap)),
            Span::styled(truncate_str(&right, width), self.palette.base()),
        ]);
        frame.render_widget(Paragraph::new(line).style(self.palette.base()), area);
    }
}
