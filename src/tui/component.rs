use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::page::ElementId;

/// A reusable UI component.
///
/// Components follow the React pattern:
/// - They receive data via props (struct fields).
/// - They render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so a component can record what it drew, such
/// as the clickable regions in [`HitRegion`]s.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A screen rectangle that stands for a page element. Clicking inside it
/// clicks the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub rect: Rect,
    pub element: ElementId,
}

/// The element under (`col`, `row`). Later regions are drawn on top, so they
/// win.
pub fn hit_test(regions: &[HitRegion], col: u16, row: u16) -> Option<ElementId> {
    regions
        .iter()
        .rev()
        .find(|r| {
            col >= r.rect.x
                && col < r.rect.x.saturating_add(r.rect.width)
                && row >= r.rect.y
                && row < r.rect.y.saturating_add(r.rect.height)
        })
        .map(|r| r.element)
}
