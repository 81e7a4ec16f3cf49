//! # Page Model
//!
//! A small headless document: an arena of elements with attributes, classes,
//! and inline styles, plus the bits of window state the controllers touch
//! (focus, scroll lock, viewport width, location).
//!
//! ```text
//! Page
//! ├── elements: Vec<Element>        // arena, ElementId indexes into it
//! ├── focused: Option<ElementId>    // document.activeElement
//! ├── scroll_locked: bool           // body overflow hidden
//! ├── viewport_width: u32           // window.innerWidth
//! ├── path / pending_navigation     // window.location
//! └── listeners: ListenerRegistry   // every attached event listener
//! ```
//!
//! Element ids are only meaningful for the page that created them. Lookups
//! with a stale id return `None` instead of panicking.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::listeners::ListenerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A structural selector, roughly `tag.class[attr][attr=value]:not([attr])`.
#[derive(Debug, Clone, Default)]
pub struct Query {
    tag: Option<String>,
    class: Option<String>,
    has_attr: Vec<String>,
    lacks_attr: Vec<String>,
    attr_eq: Vec<(String, String)>,
}

impl Query {
    pub fn attr(name: &str) -> Self {
        Query::default().with(name)
    }

    pub fn tag(tag: &str) -> Self {
        Query {
            tag: Some(tag.to_string()),
            ..Default::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Query {
            class: Some(class.to_string()),
            ..Default::default()
        }
    }

    pub fn with(mut self, name: &str) -> Self {
        self.has_attr.push(name.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.lacks_attr.push(name.to_string());
        self
    }

    pub fn equals(mut self, name: &str, value: &str) -> Self {
        self.attr_eq.push((name.to_string(), value.to_string()));
        self
    }

    pub fn matches(&self, el: &Element) -> bool {
        if let Some(ref tag) = self.tag
            && el.tag != *tag
        {
            return false;
        }
        if let Some(ref class) = self.class
            && !el.classes.contains(class)
        {
            return false;
        }
        self.has_attr.iter().all(|a| el.attrs.contains_key(a))
            && self.lacks_attr.iter().all(|a| !el.attrs.contains_key(a))
            && self
                .attr_eq
                .iter()
                .all(|(k, v)| el.attrs.get(k).is_some_and(|actual| actual == v))
    }
}

#[derive(Debug)]
pub struct Page {
    elements: Vec<Element>,
    focused: Option<ElementId>,
    scroll_locked: bool,
    viewport_width: u32,
    path: String,
    pending_navigation: Option<String>,
    pub listeners: ListenerRegistry,
}

impl Page {
    /// Creates an empty document (`html > body`) located at `path`.
    pub fn new(path: &str) -> Self {
        let mut page = Self {
            elements: Vec::new(),
            focused: None,
            scroll_locked: false,
            viewport_width: 1280,
            path: path.to_string(),
            pending_navigation: None,
            listeners: ListenerRegistry::default(),
        };
        let root = page.create("html");
        page.append_new(root, "body");
        page
    }

    /// The document element. Always the first element in the arena.
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn body(&self) -> ElementId {
        ElementId(1)
    }

    /// Creates a detached element.
    pub fn create(&mut self, tag: &str) -> ElementId {
        self.elements.push(Element {
            tag: tag.to_string(),
            ..Default::default()
        });
        ElementId(self.elements.len() - 1)
    }

    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        if parent.0 >= self.elements.len() || child.0 >= self.elements.len() {
            return;
        }
        if let Some(old) = self.elements[child.0].parent {
            self.elements[old.0].children.retain(|c| *c != child);
        }
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
    }

    /// Creates an element and appends it to `parent` in one step.
    pub fn append_new(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let child = self.create(tag);
        self.append(parent, child);
        child
    }

    pub fn element(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.element(el).and_then(|e| e.parent)
    }

    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.element(el).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    pub fn attr(&self, el: ElementId, name: &str) -> Option<&str> {
        self.element(el)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, el: ElementId, name: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.attrs.remove(name);
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el).is_some_and(|e| e.classes.contains(class))
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.classes.remove(class);
        }
    }

    pub fn style(&self, el: ElementId, prop: &str) -> Option<&str> {
        self.element(el)
            .and_then(|e| e.styles.get(prop))
            .map(String::as_str)
    }

    /// Sets an inline style. An empty value clears the property, as in CSSOM.
    pub fn set_style(&mut self, el: ElementId, prop: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            if value.is_empty() {
                e.styles.remove(prop);
            } else {
                e.styles.insert(prop.to_string(), value.to_string());
            }
        }
    }

    pub fn text(&self, el: ElementId) -> &str {
        self.element(el).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.text = text.to_string();
        }
    }

    /// All descendants of `root` matching `query`, in document order.
    /// `root` itself is never included.
    pub fn query(&self, root: ElementId, query: &Query) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            if let Some(e) = self.element(el) {
                if query.matches(e) {
                    out.push(el);
                }
                stack.extend(e.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_first(&self, root: ElementId, query: &Query) -> Option<ElementId> {
        self.query(root, query).into_iter().next()
    }

    /// Looks up `#id` below `root`.
    pub fn find_by_id(&self, root: ElementId, id: &str) -> Option<ElementId> {
        self.query_first(root, &Query::default().equals("id", id))
    }

    pub fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// False if `el` or any ancestor carries the `hidden` class.
    pub fn is_rendered(&self, el: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if self.has_class(current, "hidden") {
                return false;
            }
            cursor = self.parent(current);
        }
        self.element(el).is_some()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn focus(&mut self, el: ElementId) {
        if self.element(el).is_some() {
            self.focused = Some(el);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn is_text_input(&self, el: ElementId) -> bool {
        self.element(el)
            .is_some_and(|e| e.tag == "input" || e.tag == "textarea")
    }

    /// Elements a keyboard user can land on, in document order.
    pub fn interactive(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        for el in self.query(root, &Query::default()) {
            if let Some(e) = self.element(el)
                && matches!(e.tag.as_str(), "a" | "button" | "input" | "textarea")
            {
                out.push(el);
            }
        }
        out
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Requests a full navigation. The embedding shell performs it.
    pub fn navigate(&mut self, url: &str) {
        self.pending_navigation = Some(url.to_string());
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.pending_navigation.take()
    }

    pub fn pending_navigation(&self) -> Option<&str> {
        self.pending_navigation.as_deref()
    }
}
