//! # Header Component
//!
//! One line across the top: search field, site title, theme control and,
//! on narrow viewports, the menu toggle.
//!
//! ```text
//! [ search: plug_ ]  Claude God · Plugins            [◐ dark] [☰ Menu]
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::markup::{BRAND_TOGGLE, MOBILE_MENU_TOGGLE, SEARCH};
use crate::core::page::{ElementId, Page, Query};
use crate::core::theme::Theme;
use crate::tui::component::{Component, HitRegion};
use crate::tui::components::truncate_str;
use crate::tui::palette::Palette;

pub const SITE_TITLE: &str = "Claude God";

pub struct Header<'a> {
    pub page: &'a Page,
    pub theme: Theme,
    /// Title of the guide whose panel was opened last.
    pub open_title: Option<&'a str>,
    pub show_menu_toggle: bool,
    pub palette: Palette,
    pub hits: Vec<HitRegion>,
}

impl<'a> Header<'a> {
    pub fn new(page: &'a Page, theme: Theme, open_title: Option<&'a str>, show_menu_toggle: bool) -> Self {
        Self {
            page,
            theme,
            open_title,
            show_menu_toggle,
            palette: Palette::for_theme(theme),
            hits: Vec::new(),
        }
    }

    fn style_for(&self, el: ElementId, base: Style) -> Style {
        if self.page.focused() == Some(el) {
            self.palette.focused(base)
        } else {
            base
        }
    }
}

impl Component for Header<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let page = self.page;
        let root = page.root();
        let mut left: Vec<(String, Style, Option<ElementId>)> = Vec::new();

        if let Some(search) = page.query_first(root, &Query::attr(SEARCH)) {
            let value = page.attr(search, "value").unwrap_or_default();
            let cursor = if page.focused() == Some(search) { "_" } else { "" };
            let field = format!("{}{}", truncate_str(value, 11), cursor);
            let style = self.style_for(search, self.palette.muted());
            left.push((format!("[ search: {field:<12} ]"), style, Some(search)));
        }

        let title = match self.open_title {
            Some(open) => format!("  {SITE_TITLE} · {open}"),
            None => format!("  {SITE_TITLE}"),
        };
        left.push((title, self.palette.active(), None));

        let mut right: Vec<(String, Style, Option<ElementId>)> = Vec::new();
        if let Some(brand) = page.query_first(root, &Query::attr(BRAND_TOGGLE)) {
            let style = self.style_for(brand, self.palette.base());
            right.push((format!("[◐ {}]", self.theme), style, Some(brand)));
        }
        if self.show_menu_toggle
            && let Some(toggle) = page.query_first(root, &Query::attr(MOBILE_MENU_TOGGLE))
        {
            right.push((" ".to_string(), self.palette.base(), None));
            let style = self.style_for(toggle, self.palette.base());
            right.push(("[☰ Menu]".to_string(), style, Some(toggle)));
        }

        let width_of = |items: &[(String, Style, Option<ElementId>)]| -> u16 {
            items.iter().map(|(t, _, _)| t.width() as u16).sum()
        };
        let gap = area.width.saturating_sub(width_of(&left)).saturating_sub(width_of(&right));
        left.push((" ".repeat(gap as usize), self.palette.base(), None));
        left.extend(right);

        let mut spans = Vec::new();
        let mut x = area.x;
        for (text, style, el) in left {
            let width = text.width() as u16;
            if let Some(element) = el
                && x < area.right()
            {
                let visible = width.min(area.right() - x);
                self.hits.push(HitRegion {
                    rect: Rect::new(x, area.y, visible, 1),
                    element,
                });
            }
            x = x.saturating_add(width);
            spans.push(Span::styled(text, style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).style(self.palette.base()), area);
    }
}
