//! # Errors
//!
//! Every failure in the interaction layer is local. Controllers return
//! `UiError` and the `Site` logs it and keeps going, so one broken widget
//! never takes the rest of the page down with it.

use std::fmt;

#[derive(Debug)]
pub enum UiError {
    /// An expected trigger, content region, or indicator is not in the page.
    MissingElement(String),
    /// `init` called on a controller that is already initialised.
    DuplicateInit(&'static str),
    /// No guide is registered for the current path.
    InvalidRoute(String),
    /// A persisted value is outside the known set.
    InvalidPersistedValue { key: &'static str, value: String },
    /// Durable storage could not be written.
    Storage(std::io::Error),
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::MissingElement(what) => write!(f, "missing element: {what}"),
            UiError::DuplicateInit(who) => write!(f, "{who} already initialized"),
            UiError::InvalidRoute(route) => write!(f, "no guide for route: {route}"),
            UiError::InvalidPersistedValue { key, value } => {
                write!(f, "invalid persisted value for {key}: {value:?}")
            }
            UiError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UiError {
    fn from(e: std::io::Error) -> Self {
        UiError::Storage(e)
    }
}
