//! Command-line client for the Craton inventory and configuration service.
//!
//! - [`shell`] - Command registry, argument parsing and dispatch
//! - [`commands`] - The user-invocable commands, grouped by resource
//! - [`craton`] - Session and client for the remote service
//! - [`resource`] - Generic CRUD manager and resource types

pub mod commands;
pub mod config;
pub mod craton;
pub mod error;
pub mod logging;
pub mod resource;
pub mod shell;

/// Version injected at compile time via CRATON_VERSION env var (set by CI/CD),
/// or the package version for local builds.
pub const VERSION: &str = match option_env!("CRATON_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

pub use config::Config;
pub use craton::client::Client;
pub use craton::session::Session;
pub use error::{CratonError, CratonResult};
pub use shell::{Outcome, Shell};
