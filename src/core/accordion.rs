//! # Accordion Controller
//!
//! Exclusive-open guide panels within one scope. The page-level instance owns
//! every toggle that lacks the mobile marker; the overlay's instance owns only
//! toggles carrying it. Because the two queries are disjoint, opening a panel
//! on one side never touches the other side's state.
//!
//! ```text
//!            init(container?)                 cleanup()
//!   Idle ─────────────────────────▶ Ready ──────────────────▶ Idle
//!     ▲   fresh token, 1 listener     │   token revoked,
//!     │   per toggle in scope         │   open panel forgotten
//!     └───────────────────────────────┘
//! ```
//!
//! State changes go through `toggle`, `open_by_id`, `close_all`, and
//! `sync_with_route`. Each publishes at most one `accordion:change`
//! describing the final state.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::bus::{AccordionChange, EventBus};
use crate::core::error::UiError;
use crate::core::guides::{GuideRegistry, route_from_path};
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::{
    ACCORDION_ACTIVE, ACCORDION_TOGGLE, ARIA_EXPANDED, CHEVRON, CHEVRON_OPEN, HIDDEN,
    MOBILE_ACCORDION, content_id,
};
use crate::core::page::{ElementId, Page, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Desktop,
    Mobile,
}

impl Scope {
    pub fn label(self) -> &'static str {
        match self {
            Scope::Desktop => "desktop",
            Scope::Mobile => "mobile",
        }
    }

    /// Toggles owned by this scope. Each scope excludes the other's markers.
    pub fn toggle_query(self) -> Query {
        match self {
            Scope::Desktop => Query::attr(ACCORDION_TOGGLE).without(MOBILE_ACCORDION),
            Scope::Mobile => Query::attr(ACCORDION_TOGGLE).with(MOBILE_ACCORDION),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccordionState {
    pub scope: Scope,
    pub open_guide_id: Option<String>,
    pub token: Option<CancellationToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Listeners attached, one per toggle.
    Attached(usize),
    /// Already initialised; nothing changed.
    AlreadyInitialized,
    /// Scope has no toggles; nothing attached.
    NoToggles,
}

/// Read-only view for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccordionSnapshot {
    pub scope: Scope,
    pub initialized: bool,
    pub open_guide_id: Option<String>,
    pub has_token: bool,
    pub init_count: u32,
    pub click_count: u32,
}

#[derive(Debug)]
pub struct AccordionController {
    guides: Arc<GuideRegistry>,
    bus: EventBus,
    base_path: String,
    state: AccordionState,
    container: Option<ElementId>,
    initialized: bool,
    init_count: u32,
    click_count: u32,
}

impl AccordionController {
    pub fn new(scope: Scope, guides: Arc<GuideRegistry>, bus: EventBus, base_path: &str) -> Self {
        debug!("accordion[{}]: controller created", scope.label());
        Self {
            guides,
            bus,
            base_path: base_path.to_string(),
            state: AccordionState {
                scope,
                open_guide_id: None,
                token: None,
            },
            container: None,
            initialized: false,
            init_count: 0,
            click_count: 0,
        }
    }

    pub fn scope(&self) -> Scope {
        self.state.scope
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> &AccordionState {
        &self.state
    }

    /// Attaches one click listener per toggle in `container` (or the whole
    /// page). A second call without `cleanup` in between is a no-op.
    pub fn init(&mut self, page: &mut Page, container: Option<ElementId>) -> InitOutcome {
        self.init_count += 1;
        let label = self.state.scope.label();
        debug!(
            "accordion[{}]: init() attempt #{} (initialized={}, container={:?})",
            label, self.init_count, self.initialized, container
        );

        if self.initialized {
            warn!("accordion[{}]: {}", label, UiError::DuplicateInit("accordion"));
            return InitOutcome::AlreadyInitialized;
        }

        self.cleanup(page);
        let token = page.listeners.token();
        self.state.token = Some(token.clone());
        self.container = container;

        let root = container.unwrap_or_else(|| page.root());
        let toggles = page.query(root, &self.state.scope.toggle_query());
        if toggles.is_empty() {
            warn!("accordion[{}]: no accordion toggles found in scope", label);
            return InitOutcome::NoToggles;
        }

        let mut attached = 0;
        for toggle in toggles {
            let guide_id = page.attr(toggle, ACCORDION_TOGGLE).unwrap_or_default().to_string();
            if guide_id.is_empty() {
                warn!("accordion[{}]: toggle {:?} has an empty guide id, skipped", label, toggle);
                continue;
            }
            page.listeners.listen(
                Target::Element(toggle),
                EventKind::Click,
                Handler::ToggleGuide {
                    scope: self.state.scope,
                    guide_id,
                },
                &token,
            );
            attached += 1;
        }

        // A re-init on the same page keeps whatever panel is already expanded.
        self.state.open_guide_id = page
            .query(root, &self.state.scope.toggle_query())
            .into_iter()
            .find(|&t| page.attr(t, ARIA_EXPANDED) == Some("true"))
            .and_then(|t| page.attr(t, ACCORDION_TOGGLE))
            .map(str::to_string);

        self.initialized = true;
        info!("accordion[{}]: initialized, {} accordions ready", label, attached);
        InitOutcome::Attached(attached)
    }

    /// Detaches every listener from the last `init` and resets state.
    /// Safe to call when not initialised.
    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.state.token.take() {
            let removed = page.listeners.revoke(&token);
            debug!(
                "accordion[{}]: cleanup detached {} listeners",
                self.state.scope.label(),
                removed
            );
        }
        self.initialized = false;
        self.state.open_guide_id = None;
        self.container = None;
    }

    /// Click entry point for listeners attached by `init`.
    pub fn on_click(&mut self, page: &mut Page, guide_id: &str) -> Result<(), UiError> {
        self.click_count += 1;
        debug!(
            "accordion[{}]: click #{} on {}",
            self.state.scope.label(),
            self.click_count,
            guide_id
        );
        self.toggle(page, guide_id)
    }

    /// Closes every other panel in scope, then flips `guide_id`.
    pub fn toggle(&mut self, page: &mut Page, guide_id: &str) -> Result<(), UiError> {
        let root = self.root(page);
        let toggle = self.find_toggle(page, root, guide_id)?;
        let was_expanded = page.attr(toggle, ARIA_EXPANDED) == Some("true");

        for other in page.query(root, &self.state.scope.toggle_query()) {
            if other != toggle {
                self.apply_visual(page, root, other, false);
            }
        }

        if was_expanded {
            self.apply_visual(page, root, toggle, false);
            self.state.open_guide_id = None;
            self.bus.publish(AccordionChange::closed());
        } else {
            self.apply_visual(page, root, toggle, true);
            self.state.open_guide_id = Some(guide_id.to_string());
            let title = self.guides.title_or_id(guide_id);
            self.bus.publish(AccordionChange::opened(guide_id, title));
        }

        debug!(
            "accordion[{}]: toggle({}) done, open={:?}",
            self.state.scope.label(),
            guide_id,
            self.state.open_guide_id
        );
        Ok(())
    }

    /// Opens `guide_id` unless it is already open. Returns whether anything
    /// changed.
    pub fn open_by_id(&mut self, page: &mut Page, guide_id: &str) -> Result<bool, UiError> {
        let root = self.root(page);
        let toggle = self.find_toggle(page, root, guide_id)?;
        if page.attr(toggle, ARIA_EXPANDED) == Some("true") {
            debug!(
                "accordion[{}]: open_by_id({}) skipped, already open",
                self.state.scope.label(),
                guide_id
            );
            self.state.open_guide_id = Some(guide_id.to_string());
            return Ok(false);
        }
        self.toggle(page, guide_id)?;
        Ok(true)
    }

    /// Force-closes every panel in scope and publishes one close event.
    /// Returns how many panels were open.
    pub fn close_all(&mut self, page: &mut Page) -> usize {
        let root = self.root(page);
        let mut closed = 0;
        for toggle in page.query(root, &self.state.scope.toggle_query()) {
            if page.attr(toggle, ARIA_EXPANDED) == Some("true") {
                closed += 1;
            }
            self.apply_visual(page, root, toggle, false);
        }
        self.state.open_guide_id = None;
        self.bus.publish(AccordionChange::closed());
        debug!("accordion[{}]: close_all closed {}", self.state.scope.label(), closed);
        closed
    }

    pub fn current_open(&self) -> Option<&str> {
        self.state.open_guide_id.as_deref()
    }

    /// Opens the panel for the guide that owns `path`. Unknown routes and
    /// already-open guides leave state untouched.
    pub fn sync_with_route(&mut self, page: &mut Page, path: &str) -> Result<bool, UiError> {
        let route = route_from_path(path, &self.base_path);
        let guide_id = match self.guides.guide_for_route(&route) {
            Some(guide) => guide.id.clone(),
            None => return Err(UiError::InvalidRoute(route)),
        };
        if self.state.open_guide_id.as_deref() == Some(guide_id.as_str()) {
            debug!(
                "accordion[{}]: {} already open, sync skipped",
                self.state.scope.label(),
                guide_id
            );
            return Ok(false);
        }
        self.open_by_id(page, &guide_id)
    }

    pub fn snapshot(&self) -> AccordionSnapshot {
        AccordionSnapshot {
            scope: self.state.scope,
            initialized: self.initialized,
            open_guide_id: self.state.open_guide_id.clone(),
            has_token: self.state.token.is_some(),
            init_count: self.init_count,
            click_count: self.click_count,
        }
    }

    fn root(&self, page: &Page) -> ElementId {
        self.container.unwrap_or_else(|| page.root())
    }

    fn find_toggle(&self, page: &Page, root: ElementId, guide_id: &str) -> Result<ElementId, UiError> {
        let query = self.state.scope.toggle_query().equals(ACCORDION_TOGGLE, guide_id);
        page.query_first(root, &query).ok_or_else(|| {
            UiError::MissingElement(format!("[{ACCORDION_TOGGLE}=\"{guide_id}\"]"))
        })
    }

    /// Expanded/collapsed visuals for one toggle. Missing content regions or
    /// chevrons are skipped with a warning.
    fn apply_visual(&self, page: &mut Page, root: ElementId, toggle: ElementId, expanded: bool) {
        let label = self.state.scope.label();
        page.set_attr(toggle, ARIA_EXPANDED, if expanded { "true" } else { "false" });
        if expanded {
            page.add_class(toggle, ACCORDION_ACTIVE);
        } else {
            page.remove_class(toggle, ACCORDION_ACTIVE);
        }

        let guide_id = page.attr(toggle, ACCORDION_TOGGLE).unwrap_or_default().to_string();
        let mobile = self.state.scope == Scope::Mobile;
        let region = content_id(&guide_id, mobile);
        match page.find_by_id(root, &region) {
            Some(content) if expanded => page.remove_class(content, HIDDEN),
            Some(content) => page.add_class(content, HIDDEN),
            None => warn!("accordion[{}]: {}", label, UiError::MissingElement(format!("#{region}"))),
        }

        match page.query_first(toggle, &Query::class(CHEVRON)) {
            Some(chevron) if expanded => page.add_class(chevron, CHEVRON_OPEN),
            Some(chevron) => page.remove_class(chevron, CHEVRON_OPEN),
            None => warn!(
                "accordion[{}]: {}",
                label,
                UiError::MissingElement(format!("{guide_id} .{CHEVRON}"))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BASE, drain, test_page};

    fn controller(scope: Scope, bus: &EventBus) -> AccordionController {
        AccordionController::new(scope, Arc::new(GuideRegistry::builtin()), bus.clone(), BASE)
    }

    fn open_toggles(page: &Page, scope: Scope) -> Vec<String> {
        page.query(page.root(), &scope.toggle_query())
            .into_iter()
            .filter(|t| page.attr(*t, ARIA_EXPANDED) == Some("true"))
            .filter_map(|t| page.attr(t, ACCORDION_TOGGLE).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_toggle_open_then_close() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);

        acc.toggle(&mut page, "quickStart").unwrap();
        assert_eq!(acc.current_open(), Some("quickStart"));
        assert_eq!(drain(&rx), vec![AccordionChange::opened("quickStart", "Quick Start")]);

        acc.toggle(&mut page, "quickStart").unwrap();
        assert_eq!(acc.current_open(), None);
        assert_eq!(drain(&rx), vec![AccordionChange::closed()]);
    }

    #[test]
    fn test_switching_panels_broadcasts_final_state_once() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        acc.toggle(&mut page, "plugins").unwrap();
        drain(&rx);

        acc.toggle(&mut page, "agentSdk").unwrap();
        assert_eq!(drain(&rx), vec![AccordionChange::opened("agentSdk", "Agent SDK")]);
        assert_eq!(open_toggles(&page, Scope::Desktop), vec!["agentSdk".to_string()]);
    }

    #[test]
    fn test_at_most_one_open_after_any_sequence() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        let ids = ["quickStart", "noCode", "architecture", "agentSdk", "plugins"];
        for step in 0..40usize {
            let id = ids[(step * 7 + step / 3) % ids.len()];
            acc.toggle(&mut page, id).unwrap();
            let open = open_toggles(&page, Scope::Desktop);
            assert!(open.len() <= 1, "step {step}: {open:?}");
            assert_eq!(open.first().map(String::as_str), acc.current_open());
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        assert_eq!(acc.init(&mut page, None), InitOutcome::Attached(5));
        let once = page.listeners.len();
        assert_eq!(acc.init(&mut page, None), InitOutcome::AlreadyInitialized);
        assert_eq!(page.listeners.len(), once);
    }

    #[test]
    fn test_reinit_picks_up_expanded_panel() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        acc.toggle(&mut page, "plugins").unwrap();

        acc.cleanup(&mut page);
        assert_eq!(acc.current_open(), None);
        acc.init(&mut page, None);
        assert_eq!(acc.current_open(), Some("plugins"));
        assert!(matches!(acc.open_by_id(&mut page, "plugins"), Ok(false)));
        assert_eq!(acc.current_open(), Some("plugins"));

        acc.toggle(&mut page, "plugins").unwrap();
        assert!(open_toggles(&page, Scope::Desktop).is_empty());
    }

    #[test]
    fn test_cleanup_then_init_matches_fresh_init() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        let fresh = page.listeners.len();
        acc.cleanup(&mut page);
        assert_eq!(page.listeners.len(), 0);
        assert!(!acc.is_initialized());
        acc.cleanup(&mut page);
        acc.init(&mut page, None);
        assert_eq!(page.listeners.len(), fresh);
    }

    #[test]
    fn test_scopes_are_independent() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let panel = page
            .query_first(page.root(), &Query::attr(crate::core::markup::MOBILE_MENU_PANEL))
            .unwrap();
        let mut desktop = controller(Scope::Desktop, &bus);
        let mut mobile = controller(Scope::Mobile, &bus);
        desktop.init(&mut page, None);
        mobile.init(&mut page, Some(panel));

        desktop.toggle(&mut page, "plugins").unwrap();
        mobile.toggle(&mut page, "noCode").unwrap();

        assert_eq!(desktop.current_open(), Some("plugins"));
        assert_eq!(mobile.current_open(), Some("noCode"));
        assert_eq!(open_toggles(&page, Scope::Desktop), vec!["plugins".to_string()]);
        assert_eq!(open_toggles(&page, Scope::Mobile), vec!["noCode".to_string()]);
        let mobile_content = page.find_by_id(panel, "mobile-accordion-content-noCode").unwrap();
        assert!(!page.has_class(mobile_content, HIDDEN));
    }

    #[test]
    fn test_no_toggles_in_scope() {
        let bus = EventBus::new();
        let mut page = Page::new("/");
        let mut acc = controller(Scope::Desktop, &bus);
        assert_eq!(acc.init(&mut page, None), InitOutcome::NoToggles);
        assert!(!acc.is_initialized());
        assert!(page.listeners.is_empty());
    }

    #[test]
    fn test_open_by_id_skips_open_panel() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        assert!(acc.open_by_id(&mut page, "noCode").unwrap());
        assert!(!acc.open_by_id(&mut page, "noCode").unwrap());
        assert_eq!(drain(&rx).len(), 1);
        assert!(matches!(
            acc.open_by_id(&mut page, "ghost"),
            Err(UiError::MissingElement(_))
        ));
    }

    #[test]
    fn test_close_all_broadcasts_once() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        acc.toggle(&mut page, "plugins").unwrap();
        drain(&rx);

        assert_eq!(acc.close_all(&mut page), 1);
        assert_eq!(drain(&rx), vec![AccordionChange::closed()]);
        assert!(open_toggles(&page, Scope::Desktop).is_empty());
        assert_eq!(acc.close_all(&mut page), 0);
        assert_eq!(drain(&rx).len(), 1);
    }

    #[test]
    fn test_sync_with_route() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/agent-sdk");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);

        assert!(acc.sync_with_route(&mut page, "/claude-god/agent-sdk").unwrap());
        assert_eq!(open_toggles(&page, Scope::Desktop), vec!["agentSdk".to_string()]);
        assert!(!acc.sync_with_route(&mut page, "/claude-god/agent-sdk").unwrap());
        assert_eq!(drain(&rx).len(), 1);

        assert!(matches!(
            acc.sync_with_route(&mut page, "/claude-god/unknown"),
            Err(UiError::InvalidRoute(_))
        ));
        assert_eq!(acc.current_open(), Some("agentSdk"));
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_missing_content_region_degrades() {
        let bus = EventBus::new();
        let mut page = test_page("/claude-god/");
        let content = page.find_by_id(page.root(), "accordion-content-plugins").unwrap();
        page.remove_attr(content, "id");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        acc.toggle(&mut page, "plugins").unwrap();
        assert_eq!(acc.current_open(), Some("plugins"));
    }

    #[test]
    fn test_unknown_guide_title_falls_back_to_id() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut page = test_page("/claude-god/");
        let nav = page.query_first(page.root(), &Query::tag("nav")).unwrap();
        let extra = page.append_new(nav, "button");
        page.set_attr(extra, ACCORDION_TOGGLE, "changelog");
        let mut acc = controller(Scope::Desktop, &bus);
        acc.init(&mut page, None);
        acc.toggle(&mut page, "changelog").unwrap();
        assert_eq!(drain(&rx), vec![AccordionChange::opened("changelog", "changelog")]);
    }
}
