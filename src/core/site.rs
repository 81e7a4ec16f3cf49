//! # Site
//!
//! The composition root. Owns the page, the shared registry and bus, the
//! timer queue, persisted storage, and one instance of every controller.
//!
//! ```text
//! click / key_down / resize
//!          │
//!          ▼
//!   ListenerRegistry::handlers_for ──▶ Vec<Handler> ──▶ dispatch ──▶ controller
//!                                                                      │
//!   advance(ms) ──▶ Scheduler ──▶ Deferred ──▶ controller::on_deferred ◀┘
//! ```
//!
//! Every input entry point logs handler failures and keeps going: one broken
//! handler never stops the others.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::accordion::{AccordionController, AccordionSnapshot, Scope};
use crate::core::active_section::{ActiveSectionTracker, ActiveSnapshot, Visibility};
use crate::core::bus::{AccordionChange, EventBus};
use crate::core::code_tabs::CodeTabsController;
use crate::core::config::ResolvedConfig;
use crate::core::error::UiError;
use crate::core::guides::{GuideRegistry, route_from_path};
use crate::core::keyboard::{Key, KeyCommand, KeyboardRouter};
use crate::core::listeners::{EventKind, Handler, Target};
use crate::core::markup::render_page;
use crate::core::overlay::{MobileOverlayController, OverlaySnapshot};
use crate::core::page::{ElementId, Page};
use crate::core::storage::{Storage, THEME_KEY};
use crate::core::theme::{Theme, ThemeController};
use crate::core::timer::{Deferred, Scheduler};

/// Read-only view of every controller, for diagnostics and `--dump-state`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteSnapshot {
    pub path: String,
    pub theme: Theme,
    pub theme_transitioning: bool,
    pub desktop: AccordionSnapshot,
    pub overlay: OverlaySnapshot,
    pub keyboard_initialized: bool,
    pub active: ActiveSnapshot,
    pub code_lang: String,
    pub listener_count: usize,
    pub pending_timers: usize,
    pub clock_ms: u64,
    pub bus_subscribers: usize,
    pub scroll_locked: bool,
    pub viewport_width: u32,
    pub focused: Option<ElementId>,
    pub loads: u32,
}

pub struct Site {
    page: Page,
    guides: Arc<GuideRegistry>,
    bus: EventBus,
    timers: Scheduler,
    storage: Box<dyn Storage>,
    base_path: String,
    accordion: AccordionController,
    overlay: MobileOverlayController,
    keyboard: KeyboardRouter,
    theme: ThemeController,
    active: ActiveSectionTracker,
    code_tabs: CodeTabsController,
    scroll_target: Option<String>,
    loads: u32,
}

impl Site {
    /// Builds every controller. Nothing is attached until `load`.
    pub fn new(config: &ResolvedConfig, mut storage: Box<dyn Storage>) -> Self {
        let guides = Arc::new(config.guides.clone());
        let bus = EventBus::new();
        let base_path = config.base_path.clone();

        if let Some(theme) = config.theme_override
            && let Err(e) = storage.set(THEME_KEY, theme.as_str())
        {
            warn!("site: failed to store theme override {}: {}", theme, e);
        }

        let accordion = AccordionController::new(Scope::Desktop, guides.clone(), bus.clone(), &base_path);
        let overlay = MobileOverlayController::new(
            guides.clone(),
            bus.clone(),
            &base_path,
            config.overlay_transition_ms,
            config.mobile_breakpoint_px,
        );
        let keyboard = KeyboardRouter::new(guides.clone(), &base_path);
        let theme = ThemeController::load(storage.as_ref(), config.default_theme, config.theme_transition_ms);
        let code_tabs = CodeTabsController::load(storage.as_ref(), &config.default_code_lang);

        Self {
            page: Page::new(""),
            guides,
            bus,
            timers: Scheduler::new(),
            storage,
            base_path,
            accordion,
            overlay,
            keyboard,
            theme,
            active: ActiveSectionTracker::new(),
            code_tabs,
            scroll_target: None,
            loads: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// A page transition: tear down everything attached to the old page,
    /// install `page`, attach to it, then open the guide owning its path.
    pub fn load(&mut self, page: Page) {
        let width = self.page.viewport_width();
        self.teardown();
        self.page = page;
        self.page.set_viewport_width(width);
        self.setup();
        self.loads += 1;
        info!(
            "site: loaded {} ({} listeners)",
            self.page.path(),
            self.page.listeners.len()
        );
    }

    /// Renders `path` and loads it.
    pub fn visit(&mut self, path: &str) {
        let page = render_page(&self.guides, path, &self.base_path);
        self.load(page);
    }

    /// Runs the page-load hooks again on the current page, as a client-side
    /// transition to the same document would.
    pub fn reinit(&mut self) {
        self.teardown();
        self.setup();
        self.loads += 1;
    }

    fn teardown(&mut self) {
        let page = &mut self.page;
        self.accordion.cleanup(page);
        self.overlay.cleanup(page);
        self.keyboard.cleanup(page);
        self.theme.cleanup(page);
        self.active.cleanup(page);
        self.code_tabs.cleanup(page);
        page.set_scroll_locked(false);
    }

    fn setup(&mut self) {
        let page = &mut self.page;
        self.accordion.init(page, None);
        if let Err(e) = self.overlay.init(page) {
            warn!("site: mobile overlay unavailable: {}", e);
        }
        self.keyboard.init(page);
        self.theme.init(page);
        self.active.init(page);
        self.code_tabs.init(page);

        let path = page.path().to_string();
        match self.accordion.sync_with_route(page, &path) {
            Ok(true) => debug!("site: route {} opened its guide", path),
            Ok(false) => {}
            Err(UiError::InvalidRoute(route)) => debug!("site: no guide for route {}", route),
            Err(e) => warn!("site: route sync failed: {}", e),
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// A click on `el`. Listeners on `el` and its ancestors run innermost
    /// first, then the default action of the nearest enclosing link.
    pub fn click(&mut self, el: ElementId) {
        let Some(tag) = self.page.element(el).map(|e| e.tag.clone()) else {
            warn!("site: {}", UiError::MissingElement(format!("{el:?}")));
            return;
        };
        if matches!(tag.as_str(), "a" | "button" | "input" | "textarea") {
            self.page.focus(el);
        }

        let mut handlers = Vec::new();
        let mut link = None;
        let mut node = Some(el);
        while let Some(current) = node {
            handlers.extend(
                self.page
                    .listeners
                    .handlers_for(Target::Element(current), EventKind::Click),
            );
            if link.is_none()
                && let Some(href) = self.link_href(current)
            {
                link = Some(href);
            }
            node = self.page.parent(current);
        }

        for handler in handlers {
            self.dispatch(handler, None);
        }
        if let Some(href) = link {
            self.follow_link(&href);
        }
    }

    pub fn key_down(&mut self, key: Key) {
        for handler in self.page.listeners.handlers_for(Target::Document, EventKind::KeyDown) {
            self.dispatch(handler, Some(key));
        }
    }

    pub fn resize(&mut self, width_px: u32) {
        self.page.set_viewport_width(width_px);
        for handler in self.page.listeners.handlers_for(Target::Document, EventKind::Resize) {
            self.dispatch(handler, None);
        }
    }

    /// Moves the clock forward and runs whatever transition work came due.
    pub fn advance(&mut self, ms: u64) {
        for work in self.timers.advance(ms) {
            match work {
                Deferred::ThemeTransitionEnd { .. } => self.theme.on_deferred(&mut self.page, work),
                _ => self.overlay.on_deferred(&mut self.page, work),
            }
        }
    }

    pub fn observe_sections(&mut self, entries: &[Visibility]) {
        self.active.observe(&mut self.page, entries);
    }

    /// Moves focus to the next (or previous) rendered interactive element.
    /// While the mobile menu is open, focus stays inside its panel.
    pub fn focus_next(&mut self, backwards: bool) -> Option<ElementId> {
        let root = match self.overlay.panel() {
            Some(panel) if self.overlay.state().is_open => panel,
            _ => self.page.root(),
        };
        let candidates: Vec<ElementId> = self
            .page
            .interactive(root)
            .into_iter()
            .filter(|&el| self.page.is_rendered(el))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let len = candidates.len();
        let current = self
            .page
            .focused()
            .and_then(|f| candidates.iter().position(|&c| c == f));
        let next = match (current, backwards) {
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };
        self.page.focus(candidates[next]);
        Some(candidates[next])
    }

    /// Types into the focused text field, if any. Returns whether the
    /// character was consumed.
    pub fn type_char(&mut self, c: char) -> bool {
        let Some(field) = self.page.focused().filter(|&f| self.page.is_text_input(f)) else {
            return false;
        };
        let mut value = self.page.attr(field, "value").unwrap_or_default().to_string();
        value.push(c);
        self.page.set_attr(field, "value", &value);
        true
    }

    pub fn backspace(&mut self) -> bool {
        let Some(field) = self.page.focused().filter(|&f| self.page.is_text_input(f)) else {
            return false;
        };
        let mut value = self.page.attr(field, "value").unwrap_or_default().to_string();
        value.pop();
        self.page.set_attr(field, "value", &value);
        true
    }

    fn dispatch(&mut self, handler: Handler, key: Option<Key>) {
        let page = &mut self.page;
        match handler {
            Handler::ToggleGuide { scope, guide_id } => {
                let controller = match scope {
                    Scope::Desktop => &mut self.accordion,
                    Scope::Mobile => self.overlay.accordion_mut(),
                };
                if let Err(e) = controller.on_click(page, &guide_id) {
                    warn!("site: toggle {} failed: {}", guide_id, e);
                }
            }
            Handler::OpenMenu => {
                self.overlay.open_menu(page, &mut self.timers);
            }
            Handler::CloseMenu => {
                self.overlay.close_menu(page, &mut self.timers);
            }
            Handler::MenuKey => {
                if let Some(key) = key {
                    self.overlay.on_key(page, &mut self.timers, key);
                }
            }
            Handler::MenuResize => {
                self.overlay.on_resize(page, &mut self.timers);
            }
            Handler::RouteKey => {
                if let Some(command) = key.and_then(|k| self.keyboard.resolve(page, k)) {
                    self.run_key_command(command);
                }
            }
            Handler::CycleTheme => {
                self.theme.cycle(page, self.storage.as_mut(), &mut self.timers);
            }
            Handler::ActivateNavLink { section_id } => {
                self.active.update_active(page, &section_id);
            }
            Handler::SelectCodeTab { lang } => {
                self.code_tabs.select(page, self.storage.as_mut(), &lang);
            }
        }
    }

    fn run_key_command(&mut self, command: KeyCommand) {
        match command {
            KeyCommand::ActivateTrigger {
                trigger,
                navigate_to,
            } => {
                self.click(trigger);
                if let Some(url) = navigate_to {
                    self.page.navigate(&url);
                }
            }
            KeyCommand::CycleTheme { control } => self.click(control),
        }
    }

    fn link_href(&self, el: ElementId) -> Option<String> {
        let element = self.page.element(el)?;
        if element.tag != "a" {
            return None;
        }
        element.attrs.get("href").cloned()
    }

    /// Default action of a link. Same-page fragments scroll; anything else
    /// is a full navigation.
    fn follow_link(&mut self, href: &str) {
        let (path, fragment) = match href.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (href, None),
        };
        self.scroll_target = fragment.filter(|f| !f.is_empty()).map(str::to_string);

        let same_page = path.is_empty()
            || route_from_path(path, &self.base_path) == route_from_path(self.page.path(), &self.base_path);
        if same_page {
            debug!("site: in-page link to #{:?}", self.scroll_target);
        } else {
            self.page.navigate(path);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn guides(&self) -> &GuideRegistry {
        &self.guides
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> Receiver<AccordionChange> {
        self.bus.subscribe()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn accordion(&self) -> &AccordionController {
        &self.accordion
    }

    pub fn overlay(&self) -> &MobileOverlayController {
        &self.overlay
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active.active()
    }

    pub fn code_lang(&self) -> &str {
        self.code_tabs.lang()
    }

    /// Milliseconds until the next timer fires, if any are pending.
    pub fn next_timer_in(&self) -> Option<u64> {
        self.timers.next_due_in()
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.page.take_navigation()
    }

    /// Section id of the last same-page link followed.
    pub fn take_scroll_target(&mut self) -> Option<String> {
        self.scroll_target.take()
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            path: self.page.path().to_string(),
            theme: self.theme.current(),
            theme_transitioning: self.theme.is_transitioning(),
            desktop: self.accordion.snapshot(),
            overlay: self.overlay.snapshot(),
            keyboard_initialized: self.keyboard.is_initialized(),
            active: self.active.snapshot(),
            code_lang: self.code_tabs.lang().to_string(),
            listener_count: self.page.listeners.len(),
            pending_timers: self.timers.pending(),
            clock_ms: self.timers.now(),
            bus_subscribers: self.bus.subscriber_count(),
            scroll_locked: self.page.scroll_locked(),
            viewport_width: self.page.viewport_width(),
            focused: self.page.focused(),
            loads: self.loads,
        }
    }
}
