use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::core::accordion::Scope;
use crate::core::markup::MOBILE_MENU_BACKDROP;
use crate::core::page::Query;
use crate::core::site::Site;
use crate::tui::TuiState;
use crate::tui::component::{Component, HitRegion};
use crate::tui::components::{GuideTree, Header, SectionView, StatusBar};
use crate::tui::palette::Palette;

pub const SIDEBAR_WIDTH: u16 = 30;
pub const PANEL_WIDTH: u16 = 34;

pub fn draw_ui(frame: &mut Frame, site: &Site, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let page = site.page();
    let palette = Palette::for_theme(site.theme());
    tui.hits.clear();

    frame.render_widget(Block::default().style(palette.base()), frame.area());
    let [header_area, body_area, status_area] = Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    let wide = page.viewport_width() >= tui.breakpoint_px;
    let mut header = Header::new(page, site.theme(), tui.open_title.as_deref(), !wide);
    header.render(frame, header_area);
    tui.hits.append(&mut header.hits);

    let main_area = if wide {
        let [sidebar_area, main_area] = Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(body_area);
        let block = Block::default().borders(Borders::RIGHT).style(palette.muted());
        let inner = block.inner(sidebar_area);
        frame.render_widget(block, sidebar_area);
        let mut tree = GuideTree::new(page, page.root(), Scope::Desktop, palette);
        tree.render(frame, inner);
        tui.hits.append(&mut tree.hits);
        main_area
    } else {
        body_area
    };

    let main_area = Rect {
        x: main_area.x + 1,
        width: main_area.width.saturating_sub(1),
        ..main_area
    };
    let mut sections = SectionView::new(page, tui.scroll, palette);
    sections.render(frame, main_area);
    tui.hits.append(&mut sections.hits);
    tui.section_layout = std::mem::take(&mut sections.layout);
    tui.section_offsets = std::mem::take(&mut sections.offsets);
    tui.content_height = sections.content_height;
    tui.main_height = main_area.height;

    if site.overlay().is_visible(page) {
        draw_overlay(frame, site, tui, body_area, palette);
    }

    let mut status = StatusBar::new(page.path().to_string(), site.snapshot().theme_transitioning, palette);
    status.render(frame, status_area);
}

/// Backdrop over the body, panel sliding in from the right edge.
fn draw_overlay(frame: &mut Frame, site: &Site, tui: &mut TuiState, area: Rect, palette: Palette) {
    let page = site.page();
    let (Some(panel), Some(close)) = (site.overlay().panel(), site.overlay().close_control()) else {
        return;
    };

    frame
        .buffer_mut()
        .set_style(area, Style::default().add_modifier(Modifier::DIM));
    if let Some(backdrop) = page.query_first(page.root(), &Query::attr(MOBILE_MENU_BACKDROP)) {
        tui.hits.push(HitRegion {
            rect: area,
            element: backdrop,
        });
    }

    let width = PANEL_WIDTH.min(area.width);
    let hidden = ((1.0 - tui.overlay_progress.clamp(0.0, 1.0)) * width as f32).round() as u16;
    let shown = width.saturating_sub(hidden);
    if shown == 0 {
        return;
    }
    let rect = Rect::new(area.right() - shown, area.y, shown, area.height);
    frame.render_widget(Clear, rect);
    let block = Block::bordered().title(" Menu ").style(palette.base());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    tui.hits.push(HitRegion { rect, element: panel });

    if inner.height == 0 {
        return;
    }
    let close_style = if page.focused() == Some(close) {
        palette.focused(palette.base())
    } else {
        palette.base()
    };
    let close_rect = Rect::new(inner.x, inner.y, inner.width.min(9), 1);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled("[✕ Close]", close_style))),
        close_rect,
    );
    tui.hits.push(HitRegion {
        rect: close_rect,
        element: close,
    });

    let tree_area = Rect {
        y: inner.y + 2,
        height: inner.height.saturating_sub(2),
        ..inner
    };
    let mut tree = GuideTree::new(page, panel, Scope::Mobile, palette);
    tree.render(frame, tree_area);
    tui.hits.append(&mut tree.hits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markup::{ACCORDION_TOGGLE, MOBILE_MENU_TOGGLE};
    use crate::test_support::test_site;
    use crate::tui::component::hit_test;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(site: &Site, tui: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, site, tui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_wide_layout_shows_sidebar() {
        let site = test_site("/claude-god/plugins");
        let mut tui = TuiState::new(768, 300);
        let text = draw(&site, &mut tui, 120, 30);
        assert!(text.contains("▾ Plugins"));
        assert!(text.contains("§ Overview"));
        assert!(!text.contains("Menu]"));
        let toggle = site
            .page()
            .query_first(site.page().root(), &Query::attr(ACCORDION_TOGGLE).equals(ACCORDION_TOGGLE, "plugins"))
            .unwrap();
        assert!(tui.hits.iter().any(|h| h.element == toggle));
    }

    #[test]
    fn test_narrow_layout_hides_sidebar() {
        let mut site = test_site("/claude-god/plugins");
        site.resize(60 * 8);
        let mut tui = TuiState::new(768, 300);
        let text = draw(&site, &mut tui, 60, 30);
        assert!(text.contains("Menu]"));
        assert!(!text.contains("▾ Plugins"));
    }

    #[test]
    fn test_open_menu_is_drawn_on_top() {
        let mut site = test_site("/claude-god/");
        site.resize(60 * 8);
        let toggle = site
            .page()
            .query_first(site.page().root(), &Query::attr(MOBILE_MENU_TOGGLE))
            .unwrap();
        site.click(toggle);
        site.advance(300);

        let mut tui = TuiState::new(768, 300);
        tui.overlay_progress = 1.0;
        let text = draw(&site, &mut tui, 60, 30);
        assert!(text.contains("✕ Close"));

        let close = site.overlay().close_control().unwrap();
        assert_eq!(hit_test(&tui.hits, 60 - PANEL_WIDTH + 2, 2), Some(close));
    }
}
