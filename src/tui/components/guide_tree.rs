//! # GuideTree Component
//!
//! Draws the accordion toggles of one scope with the links of any open
//! panel beneath them. Used for the desktop sidebar and inside the mobile
//! menu panel. What is expanded comes straight from the page: the chevron
//! class and the content region's `hidden` class.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::accordion::Scope;
use crate::core::markup::{ACCORDION_ACTIVE, ACCORDION_TOGGLE, ACTIVE, CHEVRON, CHEVRON_OPEN, content_id};
use crate::core::page::{ElementId, Page, Query};
use crate::tui::component::{Component, HitRegion};
use crate::tui::components::truncate_str;
use crate::tui::palette::Palette;

pub struct GuideTree<'a> {
    pub page: &'a Page,
    pub root: ElementId,
    pub scope: Scope,
    pub palette: Palette,
    pub hits: Vec<HitRegion>,
}

impl<'a> GuideTree<'a> {
    pub fn new(page: &'a Page, root: ElementId, scope: Scope, palette: Palette) -> Self {
        Self {
            page,
            root,
            scope,
            palette,
            hits: Vec::new(),
        }
    }

    /// One row per toggle, then one per link of each rendered panel.
    pub fn rows(&self) -> Vec<(String, Style, ElementId)> {
        let page = self.page;
        let mut rows = Vec::new();
        for toggle in page.query(self.root, &self.scope.toggle_query()) {
            let open = page
                .query_first(toggle, &Query::class(CHEVRON))
                .is_some_and(|c| page.has_class(c, CHEVRON_OPEN));
            let marker = if open { "▾" } else { "▸" };
            let style = if page.has_class(toggle, ACCORDION_ACTIVE) {
                self.palette.active()
            } else {
                self.palette.base()
            };
            rows.push((format!("{marker} {}", page.text(toggle)), self.focus(toggle, style), toggle));

            let guide_id = page.attr(toggle, ACCORDION_TOGGLE).unwrap_or_default();
            let region = content_id(guide_id, self.scope == Scope::Mobile);
            let Some(content) = page.find_by_id(self.root, &region) else {
                continue;
            };
            if !page.is_rendered(content) {
                continue;
            }
            for link in page.query(content, &Query::tag("a")) {
                let (prefix, style) = if page.has_class(link, ACTIVE) {
                    ("  ● ", self.palette.active())
                } else {
                    ("    ", self.palette.muted())
                };
                rows.push((format!("{prefix}{}", page.text(link)), self.focus(link, style), link));
            }
        }
        rows
    }

    fn focus(&self, el: ElementId, style: Style) -> Style {
        if self.page.focused() == Some(el) {
            self.palette.focused(style)
        } else {
            style
        }
    }
}

impl Component for GuideTree<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;
        let mut lines = Vec::new();
        for (row, (text, style, el)) in self.rows().into_iter().enumerate() {
            if row >= area.height as usize {
                break;
            }
            self.hits.push(HitRegion {
                rect: Rect::new(area.x, area.y + row as u16, area.width, 1),
                element: el,
            });
            lines.push(Line::from(Span::styled(truncate_str(&text, width), style)));
        }
        frame.render_widget(Paragraph::new(lines).style(self.palette.base()), area);
    }
}
