//! Terminal colours for each theme.

use ratatui::style::{Color, Modifier, Style};

use crate::core::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(250, 250, 247),
                fg: Color::Rgb(30, 30, 30),
                accent: Color::Rgb(37, 99, 235),
                muted: Color::Rgb(120, 120, 120),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(18, 18, 22),
                fg: Color::Rgb(220, 220, 225),
                accent: Color::Cyan,
                muted: Color::DarkGray,
            },
            Theme::Ember => Self {
                bg: Color::Rgb(28, 20, 16),
                fg: Color::Rgb(240, 222, 205),
                accent: Color::Rgb(255, 138, 61),
                muted: Color::Rgb(140, 110, 90),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn muted(&self) -> Style {
        self.base().fg(self.muted)
    }

    /// Open panels and the current nav link.
    pub fn active(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Keyboard focus.
    pub fn focused(&self, style: Style) -> Style {
        style.add_modifier(Modifier::REVERSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_theme_has_its_own_palette() {
        let light = Palette::for_theme(Theme::Light);
        let dark = Palette::for_theme(Theme::Dark);
        let ember = Palette::for_theme(Theme::Ember);
        assert_ne!(light.bg, dark.bg);
        assert_ne!(dark.accent, ember.accent);
    }
}
