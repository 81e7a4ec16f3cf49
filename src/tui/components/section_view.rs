//! # SectionView Component
//!
//! The main column: one block per section of the current guide, followed by
//! the code tab block for guides that have one. Scrolls vertically; the
//! laid-out section boxes feed the active-section band.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::active_section::SectionBox;
use crate::core::markup::{ACTIVE, CODE_TAB_BUTTON, CODE_TAB_CONTENT, CODE_TABS};
use crate::core::page::{ElementId, Page, Query};
use crate::tui::component::{Component, HitRegion};
use crate::tui::components::truncate_str;
use crate::tui::palette::Palette;

/// Rows taken by each section block.
pub const SECTION_HEIGHT: u16 = 8;

pub struct SectionView<'a> {
    pub page: &'a Page,
    pub scroll: u16,
    pub palette: Palette,
    pub hits: Vec<HitRegion>,
    /// Section boxes relative to the top of the area, after scrolling.
    pub layout: Vec<SectionBox>,
    /// Content row where each section starts.
    pub offsets: Vec<(String, u16)>,
    pub content_height: u16,
}

impl<'a> SectionView<'a> {
    pub fn new(page: &'a Page, scroll: u16, palette: Palette) -> Self {
        Self {
            page,
            scroll,
            palette,
            hits: Vec::new(),
            layout: Vec::new(),
            offsets: Vec::new(),
            content_height: 0,
        }
    }

    fn section_lines(&self, section: ElementId, lines: &mut Vec<Line<'static>>) {
        let page = self.page;
        let start = lines.len();
        let id = page.attr(section, "id").unwrap_or_default().to_string();
        let heading = page
            .query_first(section, &Query::tag("h2"))
            .map(|h| page.text(h).to_string())
            .unwrap_or_else(|| id.clone());

        lines.push(Line::from(Span::styled(
            format!("§ {heading}"),
            self.palette.active().add_modifier(Modifier::UNDERLINED),
        )));
        lines.push(Line::from(Span::styled(format!("#{id}"), self.palette.muted())));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Content for \"{heading}\" renders here."),
            self.palette.base(),
        )));
        while lines.len() < start + SECTION_HEIGHT as usize {
            lines.push(Line::default());
        }
    }

    /// Buttons on one row, then the visible tab's content. Returns the hit
    /// spans of the button row as (x offset, width, element).
    fn code_tab_lines(&self, container: ElementId, lines: &mut Vec<Line<'static>>) -> Vec<(u16, u16, ElementId)> {
        let page = self.page;
        let mut spans = Vec::new();
        let mut buttons = Vec::new();
        let mut x = 0u16;
        for button in page.query(container, &Query::class(CODE_TAB_BUTTON)) {
            let text = format!("[{}]", page.text(button));
            let width = text.width() as u16;
            let mut style = if page.has_class(button, ACTIVE) {
                self.palette.active()
            } else {
                self.palette.muted()
            };
            if page.focused() == Some(button) {
                style = self.palette.focused(style);
            }
            buttons.push((x, width, button));
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
            x = x.saturating_add(width + 1);
        }
        lines.push(Line::from(spans));
        for content in page.query(container, &Query::class(CODE_TAB_CONTENT)) {
            if page.is_rendered(content) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", page.text(content)),
                    self.palette.base(),
                )));
            }
        }
        lines.push(Line::default());
        buttons
    }
}

impl Component for SectionView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let page = self.page;
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut button_rows: Vec<(u16, Vec<(u16, u16, ElementId)>)> = Vec::new();

        let main = page.query_first(page.root(), &Query::tag("main"));
        let children: Vec<ElementId> = main.map(|m| page.children(m).to_vec()).unwrap_or_default();
        for child in children {
            let Some(el) = page.element(child) else {
                continue;
            };
            if el.tag == "section" {
                let start = lines.len() as u16;
                let id = page.attr(child, "id").unwrap_or_default().to_string();
                self.section_lines(child, &mut lines);
                self.offsets.push((id.clone(), start));
                let top = start as f64 - self.scroll as f64;
                self.layout.push(SectionBox {
                    section_id: id,
                    top,
                    bottom: top + SECTION_HEIGHT as f64,
                });
            } else if page.has_class(child, CODE_TABS) {
                let row = lines.len() as u16;
                let buttons = self.code_tab_lines(child, &mut lines);
                button_rows.push((row, buttons));
            }
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No guide lives at this address.",
                self.palette.muted(),
            )));
        }
        self.content_height = lines.len() as u16;

        for (row, buttons) in button_rows {
            if row < self.scroll || row - self.scroll >= area.height {
                continue;
            }
            let y = area.y + row - self.scroll;
            for (x, width, element) in buttons {
                if x >= area.width {
                    break;
                }
                self.hits.push(HitRegion {
                    rect: Rect::new(area.x + x, y, width.min(area.width - x), 1),
                    element,
                });
            }
        }

        let width = area.width as usize;
        let lines: Vec<Line> = lines
            .into_iter()
            .map(|line| {
                if line.width() > width {
                    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                    let style = line.spans.first().map(|s| s.style).unwrap_or_default();
                    Line::from(Span::styled(truncate_str(&text, width), style))
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).style(self.palette.base()).scroll((self.scroll, 0)),
            area,
        );
    }
}
