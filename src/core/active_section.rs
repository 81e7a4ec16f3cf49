//! # Active Section Tracker
//!
//! Keeps exactly one in-page navigation link marked as current. Two inputs
//! drive it: section visibility reports (a section crossing the active band)
//! and clicks on the links themselves, which apply the marker immediately
//! instead of waiting for the next visibility report.

use log::{debug, warn};
use serde::Serialize;

use crate::core::error::UiError;
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::{ACTIVE, ARIA_CURRENT, NAV_LINK};
use crate::core::page::{Page, Query};

/// One visibility report for a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub section_id: String,
    pub intersecting: bool,
}

impl Visibility {
    pub fn new(section_id: &str, intersecting: bool) -> Self {
        Self {
            section_id: section_id.to_string(),
            intersecting,
        }
    }
}

/// Laid-out vertical extent of a section, relative to the top of the
/// viewport. `bottom` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBox {
    pub section_id: String,
    pub top: f64,
    pub bottom: f64,
}

/// The horizontal line a section must cross to become active. The band is
/// inset 20% from the top and 80% from the bottom, leaving a zero-height
/// line at 20% of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBand {
    pub top_ratio: f64,
}

impl Default for ActiveBand {
    fn default() -> Self {
        Self { top_ratio: 0.2 }
    }
}

impl ActiveBand {
    pub fn line(&self, viewport_height: f64) -> f64 {
        viewport_height * self.top_ratio
    }

    pub fn contains(&self, top: f64, bottom: f64, viewport_height: f64) -> bool {
        let line = self.line(viewport_height);
        top <= line && bottom > line
    }

    /// Turns a layout into visibility reports, one per section.
    pub fn evaluate(&self, layout: &[SectionBox], viewport_height: f64) -> Vec<Visibility> {
        layout
            .iter()
            .map(|b| Visibility::new(&b.section_id, self.contains(b.top, b.bottom, viewport_height)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActiveSnapshot {
    pub initialized: bool,
    pub active_section: Option<String>,
    pub link_count: usize,
}

#[derive(Debug, Default)]
pub struct ActiveSectionTracker {
    active: Option<String>,
    token: Option<CancellationToken>,
    link_count: usize,
}

impl ActiveSectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.token.is_some()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn init(&mut self, page: &mut Page) {
        if self.is_initialized() {
            warn!("active-section: {}", UiError::DuplicateInit("active section tracker"));
            return;
        }
        let token = page.listeners.token();
        let links = page.query(page.root(), &Query::attr(NAV_LINK));
        for &link in &links {
            let Some(section_id) = page.attr(link, NAV_LINK).map(str::to_string) else {
                continue;
            };
            page.listeners.listen(
                Target::Element(link),
                EventKind::Click,
                Handler::ActivateNavLink { section_id },
                &token,
            );
        }
        self.link_count = links.len();
        self.token = Some(token);
        debug!("active-section: tracking {} links", self.link_count);
    }

    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.token.take() {
            page.listeners.revoke(&token);
        }
        self.active = None;
        self.link_count = 0;
    }

    /// Clears the current marker from every link, then marks the link for
    /// `section_id`. Returns false when no link points at the section, in
    /// which case no link is left current.
    pub fn update_active(&mut self, page: &mut Page, section_id: &str) -> bool {
        let links = page.query(page.root(), &Query::attr(NAV_LINK));
        let mut found = false;
        for link in links {
            if page.attr(link, NAV_LINK) == Some(section_id) {
                page.add_class(link, ACTIVE);
                page.set_attr(link, ARIA_CURRENT, "page");
                found = true;
            } else {
                page.remove_class(link, ACTIVE);
                page.set_attr(link, ARIA_CURRENT, "false");
            }
        }
        if !found {
            debug!("active-section: no link for #{}", section_id);
        }
        self.active = found.then(|| section_id.to_string());
        found
    }

    /// Applies a batch of visibility reports. Every intersecting entry is
    /// applied in order, so the last one wins.
    pub fn observe(&mut self, page: &mut Page, entries: &[Visibility]) {
        for entry in entries.iter().filter(|e| e.intersecting) {
            self.update_active(page, &entry.section_id);
        }
    }

    pub fn snapshot(&self) -> ActiveSnapshot {
        ActiveSnapshot {
            initialized: self.is_initialized(),
            active_section: self.active.clone(),
            link_count: self.link_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_page;

    fn active_links(page: &Page) -> Vec<String> {
        page.query(page.root(), &Query::attr(NAV_LINK).with_class(ACTIVE))
            .into_iter()
            .filter_map(|l| page.attr(l, NAV_LINK).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_band_is_line_at_twenty_percent() {
        let band = ActiveBand::default();
        assert!(band.contains(0.0, 30.0, 100.0));
        assert!(band.contains(20.0, 21.0, 100.0));
        assert!(!band.contains(21.0, 80.0, 100.0));
        assert!(!band.contains(0.0, 20.0, 100.0));
    }

    #[test]
    fn test_single_active_link() {
        let mut page = test_page("/claude-god/quick-start");
        let mut tracker = ActiveSectionTracker::new();
        tracker.init(&mut page);
        assert!(tracker.update_active(&mut page, "installation"));
        assert!(tracker.update_active(&mut page, "first-steps"));
        assert_eq!(active_links(&page), vec!["first-steps"]);

        let current: Vec<_> = page
            .query(page.root(), &Query::attr(NAV_LINK).equals(ARIA_CURRENT, "page"))
            .into_iter()
            .collect();
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_unknown_section_clears_marker() {
        let mut page = test_page("/claude-god/quick-start");
        let mut tracker = ActiveSectionTracker::new();
        tracker.update_active(&mut page, "installation");
        assert!(!tracker.update_active(&mut page, "nope"));
        assert_eq!(tracker.active(), None);
        assert!(active_links(&page).is_empty());
        let links = page.query(page.root(), &Query::attr(NAV_LINK));
        assert!(links.iter().all(|&l| page.attr(l, ARIA_CURRENT) == Some("false")));
    }

    #[test]
    fn test_observe_last_intersecting_wins() {
        let mut page = test_page("/claude-god/quick-start");
        let mut tracker = ActiveSectionTracker::new();
        tracker.observe(
            &mut page,
            &[
                Visibility::new("installation", true),
                Visibility::new("first-steps", false),
                Visibility::new("common-tasks", true),
            ],
        );
        assert_eq!(tracker.active(), Some("common-tasks"));
    }

    #[test]
    fn test_evaluate_layout() {
        let band = ActiveBand::default();
        let layout = vec![
            SectionBox { section_id: "a".into(), top: -50.0, bottom: 10.0 },
            SectionBox { section_id: "b".into(), top: 10.0, bottom: 60.0 },
        ];
        let seen = band.evaluate(&layout, 100.0);
        assert_eq!(seen, vec![Visibility::new("a", false), Visibility::new("b", true)]);
    }

    #[test]
    fn test_init_registers_one_listener_per_link() {
        let mut page = test_page("/claude-god/quick-start");
        let mut tracker = ActiveSectionTracker::new();
        tracker.init(&mut page);
        tracker.init(&mut page);
        assert_eq!(page.listeners.len(), 3);
        tracker.cleanup(&mut page);
        assert!(page.listeners.is_empty());
        assert_eq!(tracker.active(), None);
    }
}
