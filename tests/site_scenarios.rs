//! End-to-end interaction scenarios against the public API.
//!
//! Every test renders the built-in guides into a headless page and drives it
//! the way the terminal front-end does: clicks, keys, resizes and clock ticks.

use std::sync::Arc;

use guidenav::core::accordion::{AccordionController, InitOutcome, Scope};
use guidenav::core::bus::{AccordionChange, EventBus};
use guidenav::core::config::ResolvedConfig;
use guidenav::core::guides::{GuideRegistry, url_for};
use guidenav::core::keyboard::{Key, KeyboardRouter};
use guidenav::core::listeners::{EventKind, Target};
use guidenav::core::markup::{
    ACCORDION_TOGGLE, ARIA_EXPANDED, BRAND_TOGGLE, CODE_TAB_BUTTON, CODE_TAB_CONTENT, DATA_LANG,
    HIDDEN, MOBILE_ACCORDION, MOBILE_MENU_TOGGLE, render_page,
};
use guidenav::core::page::{ElementId, Page, Query};
use guidenav::core::storage::{CODE_TAB_KEY, MemoryStorage, Storage, THEME_KEY};
use guidenav::core::theme::Theme;
use guidenav::core::{Site, UiError};

const BASE: &str = "/claude-god";

fn site_at(path: &str, storage: MemoryStorage) -> Site {
    let mut site = Site::new(&ResolvedConfig::default(), Box::new(storage));
    site.visit(path);
    site
}

fn desktop_toggle(page: &Page, guide_id: &str) -> ElementId {
    page.query_first(
        page.root(),
        &Query::attr(ACCORDION_TOGGLE)
            .equals(ACCORDION_TOGGLE, guide_id)
            .without(MOBILE_ACCORDION),
    )
    .unwrap()
}

fn expanded_count(page: &Page, scope: Scope) -> usize {
    page.query(page.root(), &scope.toggle_query())
        .into_iter()
        .filter(|&t| page.attr(t, ARIA_EXPANDED) == Some("true"))
        .count()
}

fn desktop_accordion(bus: &EventBus) -> AccordionController {
    AccordionController::new(Scope::Desktop, Arc::new(GuideRegistry::builtin()), bus.clone(), BASE)
}

// ============================================================================
// Accordion
// ============================================================================

#[test]
fn test_at_most_one_guide_open_per_scope() {
    let mut site = site_at("/claude-god/", MemoryStorage::new());
    let ids = ["quickStart", "plugins", "plugins", "noCode", "architecture", "agentSdk", "agentSdk"];
    for id in ids {
        let toggle = desktop_toggle(site.page(), id);
        site.click(toggle);
        assert!(expanded_count(site.page(), Scope::Desktop) <= 1);
        let open = site.accordion().current_open().map(str::to_string);
        match open {
            Some(open) => assert_eq!(
                site.page().attr(desktop_toggle(site.page(), &open), ARIA_EXPANDED),
                Some("true")
            ),
            None => assert_eq!(expanded_count(site.page(), Scope::Desktop), 0),
        }
    }
}

#[test]
fn test_toggle_quick_start_open_then_closed() {
    let bus = EventBus::new();
    let rx = bus.subscribe();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/missing", BASE);
    let mut accordion = desktop_accordion(&bus);
    accordion.init(&mut page, None);

    accordion.toggle(&mut page, "quickStart").unwrap();
    assert_eq!(accordion.current_open(), Some("quickStart"));
    accordion.toggle(&mut page, "quickStart").unwrap();
    assert_eq!(accordion.current_open(), None);

    let changes: Vec<AccordionChange> = rx.try_iter().collect();
    assert_eq!(
        changes,
        vec![
            AccordionChange::opened("quickStart", "Quick Start"),
            AccordionChange::closed()
        ]
    );
}

#[test]
fn test_switching_guides_broadcasts_once() {
    let bus = EventBus::new();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/missing", BASE);
    let mut accordion = desktop_accordion(&bus);
    accordion.init(&mut page, None);
    accordion.toggle(&mut page, "plugins").unwrap();

    let rx = bus.subscribe();
    accordion.toggle(&mut page, "agentSdk").unwrap();
    assert_eq!(accordion.current_open(), Some("agentSdk"));
    let plugins = desktop_toggle(&page, "plugins");
    assert_eq!(page.attr(plugins, ARIA_EXPANDED), Some("false"));

    let changes: Vec<AccordionChange> = rx.try_iter().collect();
    assert_eq!(changes, vec![AccordionChange::opened("agentSdk", "Agent SDK")]);
}

#[test]
fn test_double_init_attaches_once() {
    let bus = EventBus::new();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/", BASE);
    let mut accordion = desktop_accordion(&bus);
    assert_eq!(accordion.init(&mut page, None), InitOutcome::Attached(5));
    let once = page.listeners.len();
    assert_eq!(accordion.init(&mut page, None), InitOutcome::AlreadyInitialized);
    assert_eq!(page.listeners.len(), once);
}

#[test]
fn test_cleanup_then_init_matches_fresh_init() {
    let bus = EventBus::new();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/", BASE);
    let mut accordion = desktop_accordion(&bus);
    accordion.init(&mut page, None);
    let fresh = page.listeners.len();

    accordion.cleanup(&mut page);
    let toggle = desktop_toggle(&page, "plugins");
    assert!(page.listeners.handlers_for(Target::Element(toggle), EventKind::Click).is_empty());
    assert!(page.listeners.is_empty());

    accordion.init(&mut page, None);
    assert_eq!(page.listeners.len(), fresh);
}

#[test]
fn test_reload_does_not_leak_listeners() {
    let mut site = site_at("/claude-god/", MemoryStorage::new());
    let fresh_count = site.snapshot().listener_count;

    for path in ["/claude-god/quick-start", "/claude-god/plugins", "/claude-god/"] {
        site.visit(path);
    }
    assert_eq!(site.snapshot().listener_count, fresh_count);

    let toggle = desktop_toggle(site.page(), "plugins");
    site.click(toggle);
    assert_eq!(site.accordion().snapshot().click_count, 1);
    assert_eq!(site.accordion().current_open(), Some("plugins"));
}

#[test]
fn test_sync_with_registered_route() {
    let bus = EventBus::new();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/missing", BASE);
    let mut accordion = desktop_accordion(&bus);
    accordion.init(&mut page, None);
    accordion.toggle(&mut page, "noCode").unwrap();

    assert!(matches!(accordion.sync_with_route(&mut page, "/claude-god/plugins"), Ok(true)));
    assert_eq!(accordion.current_open(), Some("plugins"));
    assert_eq!(expanded_count(&page, Scope::Desktop), 1);
}

#[test]
fn test_sync_with_unregistered_route_leaves_state() {
    let bus = EventBus::new();
    let mut page = render_page(&GuideRegistry::builtin(), "/claude-god/missing", BASE);
    let mut accordion = desktop_accordion(&bus);
    accordion.init(&mut page, None);
    accordion.toggle(&mut page, "noCode").unwrap();

    assert!(matches!(
        accordion.sync_with_route(&mut page, "/claude-god/nowhere"),
        Err(UiError::InvalidRoute(route)) if route == "/nowhere"
    ));
    assert_eq!(accordion.current_open(), Some("noCode"));
}

#[test]
fn test_desktop_and_mobile_are_independent() {
    let mut site = site_at("/claude-god/plugins", MemoryStorage::new());
    site.resize(400);
    let menu_toggle = site
        .page()
        .query_first(site.page().root(), &Query::attr(MOBILE_MENU_TOGGLE))
        .unwrap();
    site.click(menu_toggle);
    site.advance(300);

    let mobile_no_code = site
        .page()
        .query_first(
            site.page().root(),
            &Query::attr(ACCORDION_TOGGLE)
                .equals(ACCORDION_TOGGLE, "noCode")
                .with(MOBILE_ACCORDION),
        )
        .unwrap();
    site.click(mobile_no_code);

    assert_eq!(site.overlay().accordion().current_open(), Some("noCode"));
    assert_eq!(site.accordion().current_open(), Some("plugins"));
    assert_eq!(expanded_count(site.page(), Scope::Mobile), 1);
    assert_eq!(expanded_count(site.page(), Scope::Desktop), 1);
}

// ============================================================================
// Keyboard and theme
// ============================================================================

#[test]
fn test_digit_key_equals_clicking_the_trigger() {
    let mut by_key = site_at("/claude-god/", MemoryStorage::new());
    let mut by_click = site_at("/claude-god/", MemoryStorage::new());

    by_key.key_down(Key::Char('2'));
    let trigger = KeyboardRouter::triggers(by_click.page())[1];
    by_click.click(trigger);
    assert_eq!(
        serde_json::to_value(by_key.snapshot()).unwrap(),
        serde_json::to_value(by_click.snapshot()).unwrap()
    );

    // The shortcut also follows the guide's route.
    let guide_id = by_click.page().attr(trigger, ACCORDION_TOGGLE).unwrap().to_string();
    let route = by_click.guides().get(&guide_id).unwrap().route.clone();
    let key_nav = by_key.take_navigation().unwrap();
    assert_eq!(key_nav, url_for(&route, BASE));
    assert_eq!(key_nav, "/claude-god/no-code");

    by_key.visit(&key_nav);
    by_click.visit(&url_for(&route, BASE));
    assert_eq!(
        serde_json::to_value(by_key.snapshot()).unwrap(),
        serde_json::to_value(by_click.snapshot()).unwrap()
    );
    assert_eq!(by_key.accordion().current_open(), Some("noCode"));
}

#[test]
fn test_theme_cycles_back_to_light() {
    let mut site = site_at("/claude-god/", MemoryStorage::new().with(THEME_KEY, "light"));
    assert_eq!(site.theme(), Theme::Light);
    let brand = site
        .page()
        .query_first(site.page().root(), &Query::attr(BRAND_TOGGLE))
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        site.click(brand);
        site.advance(200);
        seen.push(site.theme());
    }
    assert_eq!(seen, vec![Theme::Dark, Theme::Ember, Theme::Light]);
    assert_eq!(site.page().attr(site.page().root(), "data-theme"), Some("light"));
    assert_eq!(site.storage().get(THEME_KEY).as_deref(), Some("light"));
}

#[test]
fn test_invalid_stored_theme_falls_back_to_default() {
    let site = site_at("/claude-god/", MemoryStorage::new().with(THEME_KEY, "neon"));
    assert_eq!(site.theme(), Theme::Dark);
}

// ============================================================================
// Mobile overlay
// ============================================================================

#[test]
fn test_double_open_completes_one_transition() {
    let mut site = site_at("/claude-god/", MemoryStorage::new());
    site.resize(400);
    let toggle = site
        .page()
        .query_first(site.page().root(), &Query::attr(MOBILE_MENU_TOGGLE))
        .unwrap();

    site.click(toggle);
    let pending = site.snapshot().pending_timers;
    site.advance(50);
    site.click(toggle);
    assert_eq!(site.snapshot().pending_timers, pending);

    site.advance(300);
    let overlay = site.snapshot().overlay;
    assert!(overlay.is_open);
    assert!(!overlay.is_animating);
    assert_eq!(overlay.completed_opens, 1);
}

#[test]
fn test_widening_past_breakpoint_closes_menu() {
    let mut site = site_at("/claude-god/", MemoryStorage::new());
    site.resize(400);
    let toggle = site
        .page()
        .query_first(site.page().root(), &Query::attr(MOBILE_MENU_TOGGLE))
        .unwrap();
    site.click(toggle);
    site.advance(300);

    site.resize(1024);
    assert!(!site.overlay().state().is_open);
    assert!(!site.page().scroll_locked());
    site.advance(300);
    assert!(!site.overlay().is_visible(site.page()));
}

// ============================================================================
// Code tabs
// ============================================================================

#[test]
fn test_code_tab_choice_survives_navigation() {
    let mut site = site_at("/claude-god/agent-sdk", MemoryStorage::new());
    let typescript = site
        .page()
        .query_first(
            site.page().root(),
            &Query::class(CODE_TAB_BUTTON).equals(DATA_LANG, "typescript"),
        )
        .unwrap();
    site.click(typescript);
    assert_eq!(site.storage().get(CODE_TAB_KEY).as_deref(), Some("typescript"));

    site.visit("/claude-god/plugins");
    assert_eq!(site.code_lang(), "typescript");
    let page = site.page();
    for content in page.query(page.root(), &Query::class(CODE_TAB_CONTENT)) {
        let shown = !page.has_class(content, HIDDEN);
        assert_eq!(shown, page.attr(content, DATA_LANG) == Some("typescript"));
    }
}
