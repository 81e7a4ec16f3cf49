//! # TUI Components
//!
//! Each component draws one part of the rendered page. They follow the
//! transient wrapper pattern: built every frame from borrowed props, then
//! dropped once their hit regions have been collected.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file, shared helpers)
//! ├── header.rs        (search field, theme control, menu toggle)
//! ├── guide_tree.rs    (accordion toggles and their links, either scope)
//! ├── section_view.rs  (sections of the current guide, code tabs)
//! └── status_bar.rs    (location, key hints, theme transition)
//! ```
//!
//! Components never change the page. Clicks go back through the `Site`
//! using the regions they record.

pub mod guide_tree;
pub mod header;
pub mod section_view;
pub mod status_bar;

pub use guide_tree::GuideTree;
pub use header::Header;
pub use section_view::SectionView;
pub use status_bar::StatusBar;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to fit within `max_width` columns, adding "…" if needed.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
