//! Code example language tabs. One preference shared by every tab block on
//! the page, persisted under `code-tab-lang`.

use log::{debug, warn};

use crate::core::error::UiError;
use crate::core::listeners::{CancellationToken, EventKind, Handler, Target};
use crate::core::markup::{ACTIVE, CODE_TAB_BUTTON, CODE_TAB_CONTENT, CODE_TABS, DATA_LANG, HIDDEN};
use crate::core::page::{Page, Query};
use crate::core::storage::{CODE_TAB_KEY, Storage};

pub const DEFAULT_CODE_LANG: &str = "python";

#[derive(Debug)]
pub struct CodeTabsController {
    lang: String,
    token: Option<CancellationToken>,
}

impl CodeTabsController {
    /// Reads the stored language. Blank values are replaced by `default`.
    pub fn load(storage: &dyn Storage, default: &str) -> Self {
        let lang = match storage.get(CODE_TAB_KEY) {
            Some(saved) if !saved.trim().is_empty() => saved,
            Some(saved) => {
                let e = UiError::InvalidPersistedValue {
                    key: CODE_TAB_KEY,
                    value: saved,
                };
                warn!("code-tabs: {}, using {}", e, default);
                default.to_string()
            }
            None => default.to_string(),
        };
        Self { lang, token: None }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn is_initialized(&self) -> bool {
        self.token.is_some()
    }

    pub fn init(&mut self, page: &mut Page) {
        if self.is_initialized() {
            warn!("code-tabs: {}", UiError::DuplicateInit("code tabs"));
            return;
        }
        let token = page.listeners.token();
        for button in page.query(page.root(), &Query::class(CODE_TAB_BUTTON).with(DATA_LANG)) {
            let Some(lang) = page.attr(button, DATA_LANG).map(str::to_string) else {
                continue;
            };
            page.listeners.listen(
                Target::Element(button),
                EventKind::Click,
                Handler::SelectCodeTab { lang },
                &token,
            );
        }
        self.token = Some(token);
        self.sync(page);
    }

    pub fn cleanup(&mut self, page: &mut Page) {
        if let Some(token) = self.token.take() {
            page.listeners.revoke(&token);
        }
    }

    /// Switches every tab block to `lang` and persists the choice.
    pub fn select(&mut self, page: &mut Page, storage: &mut dyn Storage, lang: &str) {
        if lang.trim().is_empty() {
            return;
        }
        self.lang = lang.to_string();
        if let Err(e) = storage.set(CODE_TAB_KEY, lang) {
            warn!("code-tabs: failed to persist {}: {}", lang, e);
        }
        self.sync(page);
        debug!("code-tabs: selected {}", lang);
    }

    fn sync(&self, page: &mut Page) {
        for container in page.query(page.root(), &Query::class(CODE_TABS)) {
            for button in page.query(container, &Query::class(CODE_TAB_BUTTON)) {
                if page.attr(button, DATA_LANG) == Some(self.lang.as_str()) {
                    page.add_class(button, ACTIVE);
                } else {
                    page.remove_class(button, ACTIVE);
                }
            }
            for content in page.query(container, &Query::class(CODE_TAB_CONTENT)) {
                if page.attr(content, DATA_LANG) == Some(self.lang.as_str()) {
                    page.add_class(content, ACTIVE);
                    page.remove_class(content, HIDDEN);
                } else {
                    page.remove_class(content, ACTIVE);
                    page.add_class(content, HIDDEN);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use crate::test_support::test_page;

    fn active_lang(page: &Page, class: &str) -> Vec<String> {
        page.query(page.root(), &Query::class(class).with_class(ACTIVE))
            .into_iter()
            .filter_map(|el| page.attr(el, DATA_LANG).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_init_applies_stored_language() {
        let storage = MemoryStorage::new().with(CODE_TAB_KEY, "typescript");
        let mut page = test_page("/claude-god/agent-sdk");
        let mut tabs = CodeTabsController::load(&storage, DEFAULT_CODE_LANG);
        tabs.init(&mut page);
        assert_eq!(active_lang(&page, CODE_TAB_BUTTON), vec!["typescript"]);
        assert_eq!(active_lang(&page, CODE_TAB_CONTENT), vec!["typescript"]);
    }

    #[test]
    fn test_blank_value_uses_default() {
        let storage = MemoryStorage::new().with(CODE_TAB_KEY, "  ");
        let tabs = CodeTabsController::load(&storage, DEFAULT_CODE_LANG);
        assert_eq!(tabs.lang(), "python");
    }

    #[test]
    fn test_select_persists_and_syncs() {
        let mut storage = MemoryStorage::new();
        let mut page = test_page("/claude-god/plugins");
        let mut tabs = CodeTabsController::load(&storage, DEFAULT_CODE_LANG);
        tabs.init(&mut page);
        tabs.select(&mut page, &mut storage, "typescript");
        assert_eq!(storage.get(CODE_TAB_KEY).as_deref(), Some("typescript"));
        assert_eq!(active_lang(&page, CODE_TAB_CONTENT), vec!["typescript"]);
        let hidden = page.query(page.root(), &Query::class(CODE_TAB_CONTENT).with_class(HIDDEN));
        assert_eq!(hidden.len(), 1);
    }

    #[test]
    fn test_page_without_tabs_is_fine() {
        let mut page = test_page("/claude-god/no-code");
        let mut tabs = CodeTabsController::load(&MemoryStorage::new(), DEFAULT_CODE_LANG);
        tabs.init(&mut page);
        assert!(tabs.is_initialized());
        assert!(page.listeners.is_empty());
    }
}
