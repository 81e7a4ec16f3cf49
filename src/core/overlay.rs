//! # Mobile Overlay Controller
//!
//! Slide-over navigation panel for narrow viewports.
//!
//! ```text
//!              open_menu()                      +transition_ms
//!   Closed ─────────────────▶ Opening (busy) ─────────────────▶ Open
//!     ▲                                                          │
//!     │        +transition_ms                     close_menu()   │
//!     └──────────────────────── Closing (busy) ◀─────────────────┘
//! ```
//!
//! While busy, both `open_menu` and `close_menu` are rejected. That guard is
//! the only concurrency control in the layer: it keeps a second request from
//! starting while the first transition's completion timer is still pending.
//!
//! The panel's own expandable sections are run by a second
//! `AccordionController` scoped to the panel and to mobile-marked toggles.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::accordion::{AccordionController, AccordionSnapshot, Scope};
use crate::core::bus::EventBus;
use crate::core::error::UiError;
use crate::core::guides::GuideRegistry;
use crate::core::keyboard::Key;
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::{
    ARIA_EXPANDED, ARIA_HIDDEN, HIDDEN, MOBILE_MENU, MOBILE_MENU_BACKDROP, MOBILE_MENU_CLOSE,
    MOBILE_MENU_LINK, MOBILE_MENU_PANEL, MOBILE_MENU_TOGGLE,
};
use crate::core::page::{ElementId, Page, Query};
use crate::core::timer::{Deferred, Scheduler};

pub const DEFAULT_TRANSITION_MS: u64 = 300;
pub const DEFAULT_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub is_open: bool,
    pub is_animating: bool,
    pub last_focused: Option<ElementId>,
}

#[derive(Debug, Clone, Copy)]
struct OverlayElements {
    menu: ElementId,
    toggle: ElementId,
    backdrop: ElementId,
    panel: ElementId,
    close: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlaySnapshot {
    pub is_open: bool,
    pub is_animating: bool,
    pub has_last_focused: bool,
    pub completed_opens: u32,
    pub completed_closes: u32,
    pub accordion: AccordionSnapshot,
}

#[derive(Debug)]
pub struct MobileOverlayController {
    state: OverlayState,
    elements: Option<OverlayElements>,
    accordion: AccordionController,
    token: Option<CancellationToken>,
    transition_ms: u64,
    breakpoint_px: u32,
    generation: u64,
    completed_opens: u32,
    completed_closes: u32,
}

impl MobileOverlayController {
    pub fn new(
        guides: Arc<GuideRegistry>,
        bus: EventBus,
        base_path: &str,
        transition_ms: u64,
        breakpoint_px: u32,
    ) -> Self {
        Self {
            state: OverlayState::default(),
            elements: None,
            accordion: AccordionController::new(Scope::Mobile, guides, bus, base_path),
            token: None,
            transition_ms,
            breakpoint_px,
            generation: 0,
            completed_opens: 0,
            completed_closes: 0,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn accordion(&self) -> &AccordionController {
        &self.accordion
    }

    pub fn accordion_mut(&mut self) -> &mut AccordionController {
        &mut self.accordion
    }

    pub fn is_initialized(&self) -> bool {
        self.elements.is_some()
    }

    /// Locates the overlay markup and attaches its listeners. Any missing
    /// piece leaves the overlay inert.
    pub fn init(&mut self, page: &mut Page) -> Result<(), UiError> {
        if self.is_initialized() {
            warn!("overlay: {}", UiError::DuplicateInit("mobile overlay"));
            return Ok(());
        }
        self.cleanup(page);

        let root = page.root();
        let find = |attr: &str| page.query_first(root, &Query::attr(attr));
        let (Some(menu), Some(toggle), Some(backdrop), Some(panel), Some(close)) = (
            find(MOBILE_MENU),
            find(MOBILE_MENU_TOGGLE),
            find(MOBILE_MENU_BACKDROP),
            find(MOBILE_MENU_PANEL),
            find(MOBILE_MENU_CLOSE),
        ) else {
            return Err(UiError::MissingElement("mobile menu elements".to_string()));
        };

        let token = page.listeners.token();
        let listeners = &mut page.listeners;
        listeners.listen(Target::Element(toggle), EventKind::Click, Handler::OpenMenu, &token);
        listeners.listen(Target::Element(close), EventKind::Click, Handler::CloseMenu, &token);
        listeners.listen(Target::Element(backdrop), EventKind::Click, Handler::CloseMenu, &token);
        listeners.listen(Target::Document, EventKind::KeyDown, Handler::MenuKey, &token);
        listeners.listen(Target::Document, EventKind::Resize, Handler::MenuResize, &token);
        let links = page.query(panel, &Query::attr(MOBILE_MENU_LINK));
        for link in &links {
            page.listeners
                .listen(Target::Element(*link), EventKind::Click, Handler::CloseMenu, &token);
        }

        self.token = Some(token);
        self.elements = Some(OverlayElements {
            menu,
            toggle,
            backdrop,
            panel,
            close,
        });
        self.accordion.init(page, Some(panel));
        info!("overlay: initialized with {} menu links", links.len());
        Ok(())
    }

    /// Detaches all overlay listeners, including the inner accordion's, and
    /// invalidates pending transition timers. A menu left open or mid-transition
    /// is put back in its closed markup state.
    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.token.take() {
            page.listeners.revoke(&token);
        }
        if let Some(els) = self.elements
            && (self.state.is_open || self.state.is_animating || !page.has_class(els.menu, HIDDEN))
        {
            debug!("overlay: cleanup closing menu markup");
            page.add_class(els.menu, HIDDEN);
            page.set_attr(els.menu, ARIA_HIDDEN, "true");
            page.set_style(els.backdrop, "opacity", "0");
            page.set_style(els.panel, "transform", "translateX(100%)");
            page.set_attr(els.toggle, ARIA_EXPANDED, "false");
            page.set_scroll_locked(false);
        }
        self.accordion.cleanup(page);
        self.elements = None;
        self.state = OverlayState::default();
        self.generation += 1;
    }

    /// Starts the open transition. Returns `false` if the request was
    /// rejected (busy, already open, or not initialised).
    pub fn open_menu(&mut self, page: &mut Page, timers: &mut Scheduler) -> bool {
        let Some(els) = self.elements else {
            return false;
        };
        if self.state.is_animating {
            debug!("overlay: open rejected, transition in progress");
            return false;
        }
        if self.state.is_open {
            return false;
        }

        self.state.is_animating = true;
        self.state.is_open = true;
        self.state.last_focused = page.focused();

        page.remove_class(els.menu, HIDDEN);
        page.set_attr(els.menu, ARIA_HIDDEN, "false");
        page.set_attr(els.toggle, ARIA_EXPANDED, "true");
        page.set_style(els.backdrop, "opacity", "1");
        page.set_style(els.panel, "transform", "translateX(0)");
        page.set_scroll_locked(true);

        let generation = self.generation;
        timers.schedule(self.transition_ms, Deferred::OverlayFocusFirst { generation });
        timers.schedule(self.transition_ms, Deferred::OverlayOpenSettled { generation });
        debug!("overlay: opening");
        true
    }

    /// Starts the close transition. Returns `false` if rejected.
    pub fn close_menu(&mut self, page: &mut Page, timers: &mut Scheduler) -> bool {
        let Some(els) = self.elements else {
            return false;
        };
        if self.state.is_animating {
            debug!("overlay: close rejected, transition in progress");
            return false;
        }
        if !self.state.is_open {
            return false;
        }

        self.state.is_animating = true;
        self.state.is_open = false;

        page.set_style(els.backdrop, "opacity", "0");
        page.set_style(els.panel, "transform", "translateX(100%)");
        page.set_attr(els.toggle, ARIA_EXPANDED, "false");
        page.set_scroll_locked(false);

        timers.schedule(
            self.transition_ms,
            Deferred::OverlayCloseSettled {
                generation: self.generation,
            },
        );
        debug!("overlay: closing");
        true
    }

    /// Escape closes an open menu.
    pub fn on_key(&mut self, page: &mut Page, timers: &mut Scheduler, key: Key) -> bool {
        if key == Key::Escape && self.state.is_open {
            return self.close_menu(page, timers);
        }
        false
    }

    /// Widening past the breakpoint closes an open menu.
    pub fn on_resize(&mut self, page: &mut Page, timers: &mut Scheduler) -> bool {
        if page.viewport_width() >= self.breakpoint_px && self.state.is_open {
            info!("overlay: viewport {}px past breakpoint, closing", page.viewport_width());
            return self.close_menu(page, timers);
        }
        false
    }

    /// Runs a transition-completion step. Timers from an older page load are
    /// ignored.
    pub fn on_deferred(&mut self, page: &mut Page, work: Deferred) {
        let Some(els) = self.elements else {
            return;
        };
        match work {
            Deferred::OverlayFocusFirst { generation } if generation == self.generation => {
                if self.state.is_open {
                    match page.interactive(els.panel).first() {
                        Some(first) => page.focus(*first),
                        None => warn!("overlay: no focusable element in panel"),
                    }
                }
            }
            Deferred::OverlayOpenSettled { generation } if generation == self.generation => {
                self.state.is_animating = false;
                self.completed_opens += 1;
                debug!("overlay: open transition complete");
            }
            Deferred::OverlayCloseSettled { generation } if generation == self.generation => {
                page.add_class(els.menu, HIDDEN);
                page.set_attr(els.menu, ARIA_HIDDEN, "true");
                match self.state.last_focused.take() {
                    Some(el) if page.element(el).is_some() => page.focus(el),
                    _ => page.blur(),
                }
                self.state.is_animating = false;
                self.completed_closes += 1;
                debug!("overlay: close transition complete");
            }
            other => debug!("overlay: ignoring stale or foreign timer {:?}", other),
        }
    }

    /// Whether the menu is part of the interaction tree. Stays true for the
    /// whole close transition.
    pub fn is_visible(&self, page: &Page) -> bool {
        self.elements
            .is_some_and(|els| !page.has_class(els.menu, HIDDEN))
    }

    pub fn panel(&self) -> Option<ElementId> {
        self.elements.map(|els| els.panel)
    }

    pub fn close_control(&self) -> Option<ElementId> {
        self.elements.map(|els| els.close)
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            is_open: self.state.is_open,
            is_animating: self.state.is_animating,
            has_last_focused: self.state.last_focused.is_some(),
            completed_opens: self.completed_opens,
            completed_closes: self.completed_closes,
            accordion: self.accordion.snapshot(),
        }
    }
}
