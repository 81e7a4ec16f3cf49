//! # Guide Registry
//!
//! Static, read-only description of every guide on the site: title, route,
//! and the ordered in-page navigation entries. Built once at startup and
//! shared by every controller behind an `Arc`.
//!
//! The registry is also the single route table. Both route sync and the
//! keyboard shortcuts resolve routes through it, so they cannot disagree.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Strips the site base path from a location path. What is left is a
/// registry route: `/claude-god/plugins/` becomes `/plugins`, and the bare
/// base becomes `/`.
pub fn route_from_path(path: &str, base_path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let rest = if base.is_empty() {
        path
    } else {
        match path.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    };
    let trimmed = rest.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The full location path for a registry route under `base_path`.
pub fn url_for(route: &str, base_path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if route == "/" {
        format!("{base}/")
    } else {
        format!("{base}{route}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GuideFeatures {
    #[serde(default)]
    pub code_tabs: bool,
    #[serde(default)]
    pub diagrams: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GuideDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub route: String,
    pub nav_items: Vec<NavItem>,
    #[serde(default)]
    pub features: GuideFeatures,
}

/// Problems `validate` can find in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptyId,
    EmptyTitle(String),
    BadRoute { guide: String, route: String },
    NoNavItems(String),
    DuplicateNavIds { guide: String, ids: Vec<String> },
    DuplicateGuide(String),
    DuplicateRoute(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EmptyId => write!(f, "guide with empty id"),
            RegistryError::EmptyTitle(id) => write!(f, "guide \"{id}\" has no title"),
            RegistryError::BadRoute { guide, route } => {
                write!(f, "guide \"{guide}\" route must start with /: {route}")
            }
            RegistryError::NoNavItems(id) => write!(f, "guide \"{id}\" has no navigation items"),
            RegistryError::DuplicateNavIds { guide, ids } => {
                write!(f, "guide \"{guide}\" has duplicate nav IDs: {}", ids.join(", "))
            }
            RegistryError::DuplicateGuide(id) => write!(f, "duplicate guide id: {id}"),
            RegistryError::DuplicateRoute(route) => write!(f, "duplicate route: {route}"),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideRegistry {
    guides: Vec<GuideDescriptor>,
}

impl GuideRegistry {
    pub fn new(guides: Vec<GuideDescriptor>) -> Self {
        Self { guides }
    }

    /// The five guides the site ships with, in sidebar order.
    pub fn builtin() -> Self {
        fn nav(items: &[(&str, &str)]) -> Vec<NavItem> {
            items
                .iter()
                .map(|(id, label)| NavItem {
                    id: id.to_string(),
                    label: label.to_string(),
                })
                .collect()
        }
        fn guide(
            id: &str,
            title: &str,
            subtitle: &str,
            route: &str,
            code_tabs: bool,
            nav_items: Vec<NavItem>,
        ) -> GuideDescriptor {
            GuideDescriptor {
                id: id.to_string(),
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                route: route.to_string(),
                nav_items,
                features: GuideFeatures {
                    code_tabs,
                    diagrams: code_tabs,
                },
            }
        }

        Self::new(vec![
            guide(
                "quickStart",
                "Quick Start",
                "5-Minute Setup",
                "/quick-start",
                false,
                nav(&[
                    ("installation", "Installation"),
                    ("first-steps", "First Steps"),
                    ("common-tasks", "Common Tasks"),
                ]),
            ),
            guide(
                "noCode",
                "No-Code",
                "Non-Coding Workflows",
                "/no-code",
                false,
                nav(&[
                    ("overview", "Overview"),
                    ("research-workflows", "Research Workflows"),
                    ("writing-automation", "Writing & Content"),
                    ("document-processing", "Document Processing"),
                    ("data-analysis", "Data Analysis"),
                    ("web-research", "Web Research"),
                    ("automation-scripts", "Simple Automation"),
                ]),
            ),
            guide(
                "architecture",
                "Claude CLI",
                "Architecture Guide",
                "/",
                false,
                nav(&[
                    ("overview", "Overview"),
                    ("architecture-levels", "Architecture Levels"),
                    ("migration-summary", "Migration Summary"),
                    ("configuration-files", "Configuration Files"),
                    ("agents-skills", "Agents & Skills"),
                    ("best-practices", "Best Practices"),
                    ("examples", "Examples"),
                    ("troubleshooting", "Troubleshooting"),
                    ("quick-reference", "Quick Reference"),
                ]),
            ),
            guide(
                "agentSdk",
                "Agent SDK",
                "Complete Guide",
                "/agent-sdk",
                true,
                nav(&[
                    ("what-is-sdk", "What is Agent SDK?"),
                    ("relation-to-cli", "Relationship to CLI"),
                    ("use-cases", "What Can You Build?"),
                    ("basic-workflow", "Basic Workflow"),
                    ("key-apis", "Key APIs"),
                    ("code-examples", "Code Examples"),
                    ("cli-vs-sdk", "CLI vs SDK"),
                    ("concepts-patterns", "Concepts & Patterns"),
                    ("getting-started", "Getting Started"),
                    ("documentation", "Documentation"),
                ]),
            ),
            guide(
                "plugins",
                "Plugins",
                "Complete Guide",
                "/plugins",
                true,
                nav(&[
                    ("overview", "Overview"),
                    ("installation", "Installation"),
                    ("essential-plugins", "Essential Plugins"),
                    ("ralph-wiggum", "Ralph Wiggum"),
                    ("hookify", "Hookify"),
                    ("frontend-security", "Frontend & Security"),
                    ("agent-sdk-dev", "Agent Development"),
                    ("marketplace", "Marketplace"),
                ]),
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&GuideDescriptor> {
        self.guides.iter().find(|g| g.id == id)
    }

    /// Title for `id`, or the raw id when the guide is unknown.
    pub fn title_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|g| g.title.as_str()).unwrap_or(id)
    }

    pub fn guide_for_route(&self, route: &str) -> Option<&GuideDescriptor> {
        self.guides.iter().find(|g| g.route == route)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuideDescriptor> {
        self.guides.iter()
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    /// Checks the invariants the controllers rely on. Returns every problem
    /// found rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<RegistryError>> {
        let mut errors = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_routes = HashSet::new();

        for guide in &self.guides {
            if guide.id.is_empty() {
                errors.push(RegistryError::EmptyId);
            } else if !seen_ids.insert(guide.id.as_str()) {
                errors.push(RegistryError::DuplicateGuide(guide.id.clone()));
            }
            if guide.title.is_empty() {
                errors.push(RegistryError::EmptyTitle(guide.id.clone()));
            }
            if !guide.route.starts_with('/') {
                errors.push(RegistryError::BadRoute {
                    guide: guide.id.clone(),
                    route: guide.route.clone(),
                });
            } else if !seen_routes.insert(guide.route.as_str()) {
                errors.push(RegistryError::DuplicateRoute(guide.route.clone()));
            }
            if guide.nav_items.is_empty() {
                errors.push(RegistryError::NoNavItems(guide.id.clone()));
            }

            let mut nav_seen = HashSet::new();
            let mut dupes: Vec<String> = Vec::new();
            for item in &guide.nav_items {
                if !nav_seen.insert(item.id.as_str()) && !dupes.contains(&item.id) {
                    dupes.push(item.id.clone());
                }
            }
            if !dupes.is_empty() {
                errors.push(RegistryError::DuplicateNavIds {
                    guide: guide.id.clone(),
                    ids: dupes,
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for GuideRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
