//! Command dispatcher and command-line front end for BioView.
//!
//! [`dispatcher::Dispatcher`] maps user intents (fetch an accession, open
//! files, open a folder, append files) onto sessions from `bioview-runtime`.
//! The host seams in [`host`] decide how the user is asked and told things.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod folder;
pub mod host;
pub mod logging;
pub mod shell;
pub mod styles;

pub use config::{Config, ConfigOverrides};
pub use dispatcher::{BatchReport, Dispatcher, DispatcherContext, Input};
pub use error::{BioviewError, Result};
pub use host::{ConsoleNotifier, PickPurpose, Prompter, TerminalPrompter};
