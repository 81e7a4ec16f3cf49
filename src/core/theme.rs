//! # Theme Controller
//!
//! Three presentation themes cycled in a fixed order:
//!
//! ```text
//! light ──▶ dark ──▶ ember ──▶ light
//! ```
//!
//! The controller is the only writer of the theme. It persists every change
//! and mirrors it to the document's `data-theme` attribute, which renderers
//! read but never write.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::error::UiError;
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::BRAND_TOGGLE;
use crate::core::page::{Page, Query};
use crate::core::storage::{Storage, THEME_KEY};
use crate::core::timer::{Deferred, Scheduler, TimerId};

pub const DEFAULT_THEME_TRANSITION_MS: u64 = 200;
pub const THEME_ATTR: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Ember,
}

impl Theme {
    /// Cycles to the next theme (wraps around)
    pub fn next(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Ember,
            Theme::Ember => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Ember => "ember",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "ember" => Ok(Theme::Ember),
            other => Err(UiError::InvalidPersistedValue {
                key: THEME_KEY,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct ThemeController {
    current: Theme,
    default: Theme,
    transition_ms: u64,
    transitioning: bool,
    generation: u64,
    /// Timer that ends the running transition.
    pending: Option<TimerId>,
    token: Option<CancellationToken>,
}

impl ThemeController {
    /// Reads the persisted theme. Missing or unknown values fall back to
    /// `default`.
    pub fn load(storage: &dyn Storage, default: Theme, transition_ms: u64) -> Self {
        let current = match storage.get(THEME_KEY) {
            Some(saved) => saved.parse().unwrap_or_else(|e: UiError| {
                warn!("theme: {}, using {}", e, default);
                default
            }),
            None => default,
        };
        info!("theme: starting with {}", current);
        Self {
            current,
            default,
            transition_ms,
            transitioning: false,
            pending: None,
            generation: 0,
            token: None,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn default_theme(&self) -> Theme {
        self.default
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_initialized(&self) -> bool {
        self.token.is_some()
    }

    /// Applies the current theme to the page and wires the theme control.
    /// A missing control is logged; the theme is applied regardless.
    pub fn init(&mut self, page: &mut Page) {
        if self.is_initialized() {
            warn!("theme: {}", UiError::DuplicateInit("theme controller"));
            return;
        }
        self.apply(page);
        let token = page.listeners.token();
        match page.query_first(page.root(), &Query::attr(BRAND_TOGGLE)) {
            Some(control) => page.listeners.listen(
                Target::Element(control),
                EventKind::Click,
                Handler::CycleTheme,
                &token,
            ),
            None => warn!("theme: {}", UiError::MissingElement(format!("[{BRAND_TOGGLE}]"))),
        }
        self.token = Some(token);
    }

    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.token.take() {
            page.listeners.revoke(&token);
        }
        self.transitioning = false;
        self.pending = None;
        self.generation += 1;
    }

    /// Advances to the next theme, persists it, and starts the short visual
    /// transition. A storage failure is logged; the page still switches.
    pub fn cycle(&mut self, page: &mut Page, storage: &mut dyn Storage, timers: &mut Scheduler) -> Theme {
        self.current = self.current.next();
        self.apply(page);
        if let Err(e) = storage.set(THEME_KEY, self.current.as_str()) {
            warn!("theme: failed to persist {}: {}", self.current, e);
        }

        let root = page.root();
        let ms = self.transition_ms;
        page.set_style(
            root,
            "transition",
            &format!("background-color {ms}ms ease-out, color {ms}ms ease-out"),
        );
        self.transitioning = true;
        // Only the newest cycle's timer may end the transition.
        if let Some(previous) = self.pending.take() {
            timers.cancel(previous);
        }
        self.pending = Some(timers.schedule(
            self.transition_ms,
            Deferred::ThemeTransitionEnd {
                generation: self.generation,
            },
        ));
        debug!("theme: cycled to {}", self.current);
        self.current
    }

    pub fn on_deferred(&mut self, page: &mut Page, work: Deferred) {
        if let Deferred::ThemeTransitionEnd { generation } = work
            && generation == self.generation
        {
            let root = page.root();
            page.set_style(root, "transition", "");
            self.transitioning = false;
            self.pending = None;
        }
    }

    /// The single write point for the document theme attribute.
    fn apply(&self, page: &mut Page) {
        let root = page.root();
        page.set_attr(root, THEME_ATTR, self.current.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use crate::test_support::test_page;

    #[test]
    fn test_three_cycles_return_to_light() {
        let mut storage = MemoryStorage::new().with(THEME_KEY, "light");
        let mut page = test_page("/claude-god/");
        let mut timers = Scheduler::new();
        let mut theme = ThemeController::load(&storage, Theme::Dark, DEFAULT_THEME_TRANSITION_MS);
        theme.init(&mut page);
        assert_eq!(theme.current(), Theme::Light);

        let seen: Vec<Theme> = (0..3)
            .map(|_| theme.cycle(&mut page, &mut storage, &mut timers))
            .collect();
        assert_eq!(seen, vec![Theme::Dark, Theme::Ember, Theme::Light]);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(page.attr(page.root(), THEME_ATTR), Some("light"));
    }

    #[test]
    fn test_invalid_persisted_value_falls_back() {
        let storage = MemoryStorage::new().with(THEME_KEY, "neon");
        let theme = ThemeController::load(&storage, Theme::Dark, DEFAULT_THEME_TRANSITION_MS);
        assert_eq!(theme.current(), Theme::Dark);
    }

    #[test]
    fn test_missing_value_uses_default() {
        let theme = ThemeController::load(&MemoryStorage::new(), Theme::Ember, 200);
        assert_eq!(theme.current(), Theme::Ember);
    }

    #[test]
    fn test_transition_flag_clears_itself() {
        let mut storage = MemoryStorage::new();
        let mut page = test_page("/claude-god/");
        let mut timers = Scheduler::new();
        let mut theme = ThemeController::load(&storage, Theme::Dark, 200);
        theme.init(&mut page);
        theme.cycle(&mut page, &mut storage, &mut timers);
        assert!(theme.is_transitioning());
        assert!(page.style(page.root(), "transition").is_some());
        assert_eq!(timers.pending(), 1);

        for work in timers.advance(200) {
            theme.on_deferred(&mut page, work);
        }
        assert!(!theme.is_transitioning());
        assert_eq!(page.style(page.root(), "transition"), None);
    }

    #[test]
    fn test_quick_second_cycle_keeps_transition_running() {
        let mut storage = MemoryStorage::new();
        let mut page = test_page("/claude-god/");
        let mut timers = Scheduler::new();
        let mut theme = ThemeController::load(&storage, Theme::Dark, 350);
        theme.init(&mut page);

        theme.cycle(&mut page, &mut storage, &mut timers);
        assert_eq!(
            page.style(page.root(), "transition"),
            Some("background-color 350ms ease-out, color 350ms ease-out")
        );
        for work in timers.advance(200) {
            theme.on_deferred(&mut page, work);
        }
        theme.cycle(&mut page, &mut storage, &mut timers);
        for work in timers.advance(150) {
            theme.on_deferred(&mut page, work);
        }
        assert!(theme.is_transitioning());
        assert!(page.style(page.root(), "transition").is_some());
        assert_eq!(timers.pending(), 1);

        for work in timers.advance(200) {
            theme.on_deferred(&mut page, work);
        }
        assert!(!theme.is_transitioning());
        assert_eq!(page.style(page.root(), "transition"), None);
    }

    #[test]
    fn test_parse_round_trip_of_labels() {
        for t in [Theme::Light, Theme::Dark, Theme::Ember] {
            assert_eq!(t.as_str().parse::<Theme>().unwrap(), t);
        }
        assert!("Dark".parse::<Theme>().is_err());
    }
}
