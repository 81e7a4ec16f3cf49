//! Guidenav library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

use crate::core::theme::Theme;

/// Theme names accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    Ember,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Ember => Theme::Ember,
        }
    }
}
