//! # Page Markup
//!
//! Builds the rendered page the controllers attach to. Content rendering is
//! somebody else's job; this module only produces the structural contract:
//!
//! ```text
//! body
//! ├── header
//! │   ├── input[data-search]
//! │   ├── button[data-brand-toggle]
//! │   └── button[data-mobile-menu-toggle][aria-expanded]
//! ├── aside > nav                                   (desktop scope)
//! │   └── per guide:
//! │       ├── button.accordion-header[data-accordion-toggle=<id>][aria-expanded]
//! │       │   └── span.accordion-chevron
//! │       └── div#accordion-content-<id>.hidden > a[data-nav-link]...
//! ├── div[data-mobile-menu].hidden                  (mobile scope)
//! │   ├── div[data-mobile-menu-backdrop]
//! │   └── div[data-mobile-menu-panel]
//! │       ├── button[data-mobile-menu-close]
//! │       └── per guide: toggle with [data-mobile-menu-accordion],
//! │           div#mobile-accordion-content-<id> > a[data-mobile-menu-link]...
//! └── main > section#<nav item>... , div.code-tabs
//! ```

use crate::core::guides::{GuideDescriptor, GuideRegistry, route_from_path, url_for};
use crate::core::page::{ElementId, Page};

pub const ACCORDION_TOGGLE: &str = "data-accordion-toggle";
pub const MOBILE_ACCORDION: &str = "data-mobile-menu-accordion";
pub const ARIA_EXPANDED: &str = "aria-expanded";
pub const ARIA_HIDDEN: &str = "aria-hidden";
pub const ARIA_CURRENT: &str = "aria-current";
pub const ACCORDION_HEADER: &str = "accordion-header";
pub const CHEVRON: &str = "accordion-chevron";
pub const CHEVRON_OPEN: &str = "rotate-90";
pub const ACCORDION_ACTIVE: &str = "accordion-active";
pub const HIDDEN: &str = "hidden";
pub const ACTIVE: &str = "active";

pub const BRAND_TOGGLE: &str = "data-brand-toggle";
pub const SEARCH: &str = "data-search";
pub const NAV_LINK: &str = "data-nav-link";

pub const MOBILE_MENU: &str = "data-mobile-menu";
pub const MOBILE_MENU_TOGGLE: &str = "data-mobile-menu-toggle";
pub const MOBILE_MENU_BACKDROP: &str = "data-mobile-menu-backdrop";
pub const MOBILE_MENU_PANEL: &str = "data-mobile-menu-panel";
pub const MOBILE_MENU_CLOSE: &str = "data-mobile-menu-close";
pub const MOBILE_MENU_LINK: &str = "data-mobile-menu-link";

pub const CODE_TABS: &str = "code-tabs";
pub const CODE_TAB_BUTTON: &str = "code-tab-btn";
pub const CODE_TAB_CONTENT: &str = "code-tab-content";
pub const DATA_LANG: &str = "data-lang";

/// Languages offered by every code-tab block.
pub const CODE_LANGUAGES: &[(&str, &str)] = &[("python", "Python"), ("typescript", "TypeScript")];

/// Content region id for a guide's panel in the given scope.
pub fn content_id(guide_id: &str, mobile: bool) -> String {
    if mobile {
        format!("mobile-accordion-content-{guide_id}")
    } else {
        format!("accordion-content-{guide_id}")
    }
}

/// Renders the page for location `path`.
pub fn render_page(guides: &GuideRegistry, path: &str, base_path: &str) -> Page {
    let mut page = Page::new(path);
    let route = route_from_path(path, base_path);
    let current = guides.guide_for_route(&route);
    let body = page.body();

    let header = page.append_new(body, "header");
    let search = page.append_new(header, "input");
    page.set_attr(search, SEARCH, "");
    page.set_attr(search, "type", "search");
    let brand = page.append_new(header, "button");
    page.set_attr(brand, BRAND_TOGGLE, "");
    page.set_text(brand, "Theme");
    let menu_toggle = page.append_new(header, "button");
    page.set_attr(menu_toggle, MOBILE_MENU_TOGGLE, "");
    page.set_attr(menu_toggle, ARIA_EXPANDED, "false");
    page.set_text(menu_toggle, "Menu");

    let aside = page.append_new(body, "aside");
    let nav = page.append_new(aside, "nav");
    for guide in guides.iter() {
        let is_current = current.is_some_and(|c| c.id == guide.id);
        render_panel(&mut page, nav, guide, base_path, false, is_current);
    }

    let menu = page.append_new(body, "div");
    page.set_attr(menu, MOBILE_MENU, "");
    page.set_attr(menu, ARIA_HIDDEN, "true");
    page.add_class(menu, HIDDEN);
    let backdrop = page.append_new(menu, "div");
    page.set_attr(backdrop, MOBILE_MENU_BACKDROP, "");
    page.set_style(backdrop, "opacity", "0");
    let panel = page.append_new(menu, "div");
    page.set_attr(panel, MOBILE_MENU_PANEL, "");
    page.set_style(panel, "transform", "translateX(100%)");
    let close = page.append_new(panel, "button");
    page.set_attr(close, MOBILE_MENU_CLOSE, "");
    page.set_text(close, "Close");
    for guide in guides.iter() {
        render_panel(&mut page, panel, guide, base_path, true, false);
    }

    let main = page.append_new(body, "main");
    if let Some(guide) = current {
        for item in &guide.nav_items {
            let section = page.append_new(main, "section");
            page.set_attr(section, "id", &item.id);
            let heading = page.append_new(section, "h2");
            page.set_text(heading, &item.label);
        }
        if guide.features.code_tabs {
            render_code_tabs(&mut page, main);
        }
    }

    page
}

fn render_panel(
    page: &mut Page,
    parent: ElementId,
    guide: &GuideDescriptor,
    base_path: &str,
    mobile: bool,
    is_current: bool,
) {
    let toggle = page.append_new(parent, "button");
    page.set_attr(toggle, ACCORDION_TOGGLE, &guide.id);
    page.set_attr(toggle, ARIA_EXPANDED, "false");
    if mobile {
        page.set_attr(toggle, MOBILE_ACCORDION, "");
        page.add_class(toggle, "mobile-accordion-header");
    } else {
        page.add_class(toggle, ACCORDION_HEADER);
    }
    page.set_text(toggle, &guide.title);
    let chevron = page.append_new(toggle, "span");
    page.add_class(chevron, CHEVRON);

    let content = page.append_new(parent, "div");
    page.set_attr(content, "id", &content_id(&guide.id, mobile));
    page.add_class(content, HIDDEN);

    let guide_url = url_for(&guide.route, base_path);
    for item in &guide.nav_items {
        let link = page.append_new(content, "a");
        page.set_attr(link, "href", &format!("{guide_url}#{}", item.id));
        page.set_text(link, &item.label);
        if mobile {
            page.set_attr(link, MOBILE_MENU_LINK, "");
        } else if is_current {
            page.set_attr(link, NAV_LINK, &item.id);
            page.set_attr(link, ARIA_CURRENT, "false");
        }
    }
}

fn render_code_tabs(page: &mut Page, parent: ElementId) {
    let tabs = page.append_new(parent, "div");
    page.add_class(tabs, CODE_TABS);
    for (lang, label) in CODE_LANGUAGES {
        let button = page.append_new(tabs, "button");
        page.add_class(button, CODE_TAB_BUTTON);
        page.set_attr(button, DATA_LANG, lang);
        page.set_text(button, label);
    }
    for (lang, label) in CODE_LANGUAGES {
        let content = page.append_new(tabs, "pre");
        page.add_class(content, CODE_TAB_CONTENT);
        page.set_attr(content, DATA_LANG, lang);
        page.set_text(content, &format!("# {label} example"));
    }
}
