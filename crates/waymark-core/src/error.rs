//! Core error type for waymark.
//!
//! Route matching and URL generation never fail with an error: a path that
//! does not match or a set of values that cannot produce a link are ordinary
//! `None` results. [`WaymarkError`] covers what can go wrong while routes are
//! being *registered*: malformed templates, bad constraint definitions, unreadable
//! configuration, and lookups of routes that do not exist.

use thiserror::Error;

/// The primary error type for waymark.
#[derive(Error, Debug)]
pub enum WaymarkError {
    // ── Registration ─────────────────────────────────────────────────

    /// A route template contains invalid syntax.
    #[error("Template syntax error: {0}")]
    TemplateSyntax(String),

    /// A route or constraint was set up incorrectly.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Lookup ───────────────────────────────────────────────────────

    /// A named route was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WaymarkError {
    /// Returns `true` for errors that stem from how routes were declared,
    /// as opposed to environmental failures.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::TemplateSyntax(_) | Self::ImproperlyConfigured(_) | Self::ConfigurationError(_)
        )
    }
}

/// A convenience type alias for `Result<T, WaymarkError>`.
pub type WaymarkResult<T> = Result<T, WaymarkError>;
