//! # TUI Adapter
//!
//! The terminal is the browser. This module renders the page the core
//! controllers maintain, turns terminal input into page events, and performs
//! navigations the page requests.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Viewport
//!
//! One terminal column counts as 8 CSS pixels, so a 96-column terminal sits
//! exactly on the default 768px mobile breakpoint.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (menu sliding, timers pending): draws every ~16ms and feeds
//!   real elapsed time into the site's timer queue.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.

mod component;
mod components;
mod event;
mod palette;
mod ui;

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::active_section::{ActiveBand, SectionBox};
use crate::core::config::ResolvedConfig;
use crate::core::guides::url_for;
use crate::core::keyboard::Key;
use crate::core::site::Site;
use crate::core::storage::Storage;
use crate::tui::component::{HitRegion, hit_test};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// CSS pixels per terminal column.
pub const PX_PER_COLUMN: u32 = 8;

/// TUI-specific presentation state (not part of the page)
pub struct TuiState {
    pub scroll: u16,
    pub hits: Vec<HitRegion>,
    pub section_layout: Vec<SectionBox>,
    pub section_offsets: Vec<(String, u16)>,
    pub content_height: u16,
    pub main_height: u16,
    /// Title from the last accordion change broadcast.
    pub open_title: Option<String>,
    /// 0.0 = menu off-screen, 1.0 = fully slid in.
    pub overlay_progress: f32,
    pub breakpoint_px: u32,
    pub transition_ms: u64,
    /// Scroll or content changed since sections were last observed.
    pub layout_dirty: bool,
}

impl TuiState {
    pub fn new(breakpoint_px: u32, transition_ms: u64) -> Self {
        Self {
            scroll: 0,
            hits: Vec::new(),
            section_layout: Vec::new(),
            section_offsets: Vec::new(),
            content_height: 0,
            main_height: 0,
            open_title: None,
            overlay_progress: 0.0,
            breakpoint_px,
            transition_ms,
            layout_dirty: true,
        }
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.main_height)
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll as i32 + delta).clamp(0, self.max_scroll() as i32);
        if next as u16 != self.scroll {
            self.scroll = next as u16;
            self.layout_dirty = true;
        }
    }

    /// Scrolls so that `section_id` sits on the active band.
    pub fn scroll_to(&mut self, section_id: &str) {
        let Some((_, offset)) = self.section_offsets.iter().find(|(id, _)| id == section_id) else {
            debug!("No laid-out section #{}", section_id);
            return;
        };
        let line = ActiveBand::default().line(self.main_height as f64) as u16;
        self.scroll = offset.saturating_sub(line).min(self.max_scroll());
        self.layout_dirty = true;
    }

    /// Moves the menu slide towards `open` by `elapsed_ms`. Returns whether
    /// it is still moving.
    pub fn step_overlay(&mut self, open: bool, elapsed_ms: u64) -> bool {
        let target = if open { 1.0 } else { 0.0 };
        let step = elapsed_ms as f32 / self.transition_ms.max(1) as f32;
        if self.overlay_progress < target {
            self.overlay_progress = (self.overlay_progress + step).min(target);
        } else if self.overlay_progress > target {
            self.overlay_progress = (self.overlay_progress - step).max(target);
        }
        (self.overlay_progress - target).abs() > f32::EPSILON
    }

    /// New page: start at the top.
    fn reset_for_page(&mut self) {
        self.scroll = 0;
        self.section_offsets.clear();
        self.section_layout.clear();
        self.layout_dirty = true;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

pub fn run(config: ResolvedConfig, storage: Box<dyn Storage>) -> std::io::Result<()> {
    let mut site = Site::new(&config, storage);
    let mut tui = TuiState::new(config.mobile_breakpoint_px, config.overlay_transition_ms);
    let changes = site.subscribe();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard =
        TerminalModeGuard::new().inspect_err(|e| warn!("Failed to enable mouse capture: {}", e));

    let size = terminal.size()?;
    site.resize(size.width as u32 * PX_PER_COLUMN);
    site.visit(&url_for(&config.start_route, &config.base_path));

    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    loop {
        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_millis() as u64;
        last_tick = now;
        if elapsed > 0 {
            site.advance(elapsed);
        }
        let sliding = tui.step_overlay(site.overlay().state().is_open, elapsed);
        let animating = sliding || site.next_timer_in().is_some();
        if animating {
            needs_redraw = true;
        }

        while let Ok(change) = changes.try_recv() {
            debug!("accordion:change {:?}", change);
            tui.open_title = change.title;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &site, &mut tui))?;
            needs_redraw = false;
            if tui.layout_dirty {
                let band = ActiveBand::default();
                let entries = band.evaluate(&tui.section_layout, tui.main_height as f64);
                site.observe_sections(&entries);
                tui.layout_dirty = false;
                needs_redraw = true;
            }
        }

        let timeout = if animating {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut site, &mut tui, event) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        if let Some(url) = site.take_navigation() {
            info!("Navigating to {}", url);
            site.visit(&url);
            tui.reset_for_page();
            needs_redraw = true;
        }
        if let Some(target) = site.take_scroll_target() {
            tui.scroll_to(&target);
            needs_redraw = true;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Applies one terminal event. Returns true when the user asked to quit.
fn handle_event(site: &mut Site, tui: &mut TuiState, event: TuiEvent) -> bool {
    let typing = site
        .page()
        .focused()
        .is_some_and(|f| site.page().is_text_input(f));

    match event {
        TuiEvent::ForceQuit => return true,
        TuiEvent::Key(Key::Char('q')) if !typing => return true,
        TuiEvent::Key(Key::Char(c)) => {
            site.key_down(Key::Char(c));
            site.type_char(c);
        }
        TuiEvent::Key(Key::Enter) => {
            site.key_down(Key::Enter);
            if let Some(focused) = site.page().focused()
                && !typing
            {
                site.click(focused);
            }
        }
        TuiEvent::Key(key) => site.key_down(key),
        TuiEvent::Backspace => {
            site.backspace();
        }
        TuiEvent::FocusNext => {
            site.focus_next(false);
        }
        TuiEvent::FocusPrev => {
            site.focus_next(true);
        }
        TuiEvent::MouseClick(col, row) => match hit_test(&tui.hits, col, row) {
            Some(el) => site.click(el),
            None => debug!("Click at ({}, {}) hit nothing", col, row),
        },
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            if site.page().scroll_locked() {
                return false;
            }
            let page = tui.main_height.max(1) as i32;
            let delta = match event {
                TuiEvent::ScrollUp => -1,
                TuiEvent::ScrollDown => 1,
                TuiEvent::ScrollPageUp => -page,
                _ => page,
            };
            tui.scroll_by(delta);
        }
        TuiEvent::Resize(cols, _rows) => {
            site.resize(cols as u32 * PX_PER_COLUMN);
            tui.layout_dirty = true;
        }
    }
    false
}
