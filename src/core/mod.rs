//! # Core Interaction Layer
//!
//! The state controllers behind the documentation site's navigation. They
//! run against a headless page model and know nothing about any specific
//! UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Page (document)      │
//!                    │  • Controllers          │
//!                    │  • Site (composition)   │
//!                    │                         │
//!                    │  No terminal. No UI.    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │ --dump-    │      │   Tests    │
//!     │  Adapter   │      │   state    │      │ (headless) │
//!     │ (ratatui)  │      │  (JSON)    │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`page`]: The headless document controllers query and mutate
//! - [`listeners`]: Listener registry and cancellation tokens
//! - [`accordion`]: Exclusive-open guide panels, one instance per scope
//! - [`overlay`]: The animated mobile menu
//! - [`keyboard`], [`theme`], [`active_section`], [`code_tabs`]: The smaller controllers
//! - [`site`]: Owns everything and routes events to it

pub mod accordion;
pub mod active_section;
pub mod bus;
pub mod code_tabs;
pub mod config;
pub mod error;
pub mod guides;
pub mod keyboard;
pub mod listeners;
pub mod markup;
pub mod overlay;
pub mod page;
pub mod site;
pub mod storage;
pub mod theme;
pub mod timer;

// Re-export commonly used types for convenience
pub use error::UiError;
pub use site::{Site, SiteSnapshot};
