//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::mpsc::Receiver;

use crate::core::bus::AccordionChange;
use crate::core::config::ResolvedConfig;
use crate::core::guides::GuideRegistry;
use crate::core::markup::render_page;
use crate::core::page::Page;
use crate::core::site::Site;
use crate::core::storage::MemoryStorage;

pub const BASE: &str = "/claude-god";

/// Renders the built-in guides at `path`.
pub fn test_page(path: &str) -> Page {
    render_page(&GuideRegistry::builtin(), path, BASE)
}

/// A loaded site with default config and in-memory storage.
pub fn test_site(path: &str) -> Site {
    let mut site = Site::new(&ResolvedConfig::default(), Box::new(MemoryStorage::new()));
    site.visit(path);
    site
}

/// Everything published so far.
pub fn drain(rx: &Receiver<AccordionChange>) -> Vec<AccordionChange> {
    rx.try_iter().collect()
}
