//! # Keyboard Router
//!
//! Global shortcuts. Digits `1`-`9` activate the nth guide trigger, `\`
//! cycles the theme. Shortcuts are ignored while a text field has focus.
//!
//! The router only decides *what* a key means. Activation is performed by the
//! `Site` as a synthetic click on the same element a user would click, so a
//! shortcut and a click always end in the same state.

use std::sync::Arc;

use log::{debug, warn};

use crate::core::error::UiError;
use crate::core::guides::{GuideRegistry, url_for};
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::{ACCORDION_HEADER, ACCORDION_TOGGLE, BRAND_TOGGLE};
use crate::core::page::{ElementId, Page, Query};

/// Key that cycles the theme.
pub const THEME_SHORTCUT: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    Tab,
    BackTab,
    Up,
    Down,
    Other,
}

/// What a key press resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    /// Click `trigger`, then navigate if the guide has a route.
    ActivateTrigger {
        trigger: ElementId,
        navigate_to: Option<String>,
    },
    /// Click the theme control.
    CycleTheme { control: ElementId },
}

#[derive(Debug)]
pub struct KeyboardRouter {
    guides: Arc<GuideRegistry>,
    base_path: String,
    token: Option<CancellationToken>,
}

impl KeyboardRouter {
    pub fn new(guides: Arc<GuideRegistry>, base_path: &str) -> Self {
        Self {
            guides,
            base_path: base_path.to_string(),
            token: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.token.is_some()
    }

    pub fn init(&mut self, page: &mut Page) {
        if self.is_initialized() {
            warn!("keyboard: {}", UiError::DuplicateInit("keyboard router"));
            return;
        }
        let token = page.listeners.token();
        page.listeners
            .listen(Target::Document, EventKind::KeyDown, Handler::RouteKey, &token);
        self.token = Some(token);
    }

    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.token.take() {
            page.listeners.revoke(&token);
        }
    }

    /// Guide triggers in document order, queried fresh on every call so
    /// content swaps are picked up.
    pub fn triggers(page: &Page) -> Vec<ElementId> {
        page.query(
            page.root(),
            &Query::class(ACCORDION_HEADER).with(ACCORDION_TOGGLE),
        )
    }

    pub fn resolve(&self, page: &Page, key: Key) -> Option<KeyCommand> {
        if let Some(focused) = page.focused()
            && page.is_text_input(focused)
        {
            return None;
        }

        match key {
            Key::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let trigger = *Self::triggers(page).get(index)?;
                let navigate_to = page
                    .attr(trigger, ACCORDION_TOGGLE)
                    .and_then(|id| self.guides.get(id))
                    .map(|guide| url_for(&guide.route, &self.base_path));
                debug!("keyboard: {} -> trigger #{} ({:?})", c, index + 1, navigate_to);
                Some(KeyCommand::ActivateTrigger {
                    trigger,
                    navigate_to,
                })
            }
            Key::Char(THEME_SHORTCUT) => {
                match page.query_first(page.root(), &Query::attr(BRAND_TOGGLE)) {
                    Some(control) => Some(KeyCommand::CycleTheme { control }),
                    None => {
                        warn!("keyboard: {}", UiError::MissingElement(format!("[{BRAND_TOGGLE}]")));
                        None
                    }
                }
            }
            _ => None,
        }
    }
}
