//! # waymark-core
//!
//! Core types shared by the waymark crates. This crate knows nothing about
//! route templates; it provides the foundation the routing engine and the
//! CLI build on.
//!
//! ## Modules
//!
//! - [`error`] - Error type and result alias
//! - [`settings`] - Routing settings and the global settings cell
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{WaymarkError, WaymarkResult};
pub use settings::{RouteSettings, Settings, SETTINGS};
