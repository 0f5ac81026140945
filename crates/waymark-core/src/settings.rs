//! Settings for waymark.
//!
//! This module provides the [`Settings`] struct, which holds the routing
//! configuration (route declarations and URL generation options), and
//! [`LazySettings`], a globally-accessible, lazily-initialized settings instance.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A single route declaration.
///
/// Defaults are kept as JSON values so this crate stays independent of the
/// routing engine's value type; the routing crate converts them when the
/// route table is built.
///
/// # Examples
///
/// ```
/// use waymark_core::settings::RouteSettings;
///
/// let route = RouteSettings::new("{controller}/{action}/{id?}").with_name("default");
/// assert_eq!(route.name.as_deref(), Some("default"));
/// assert!(route.defaults.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Optional route name, used for named URL generation.
    pub name: Option<String>,
    /// The route template (e.g. `"{controller}/{action}/{id?}"`).
    pub template: String,
    /// Default values, keyed by parameter or filter name.
    pub defaults: BTreeMap<String, serde_json::Value>,
    /// Constraint definitions keyed by parameter name (e.g. `id = "int"`).
    pub constraints: BTreeMap<String, String>,
}

impl RouteSettings {
    /// Creates a route declaration for the given template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    /// Sets the route name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a default value.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Adds a constraint definition for a parameter.
    #[must_use]
    pub fn with_constraint(mut self, key: impl Into<String>, definition: impl Into<String>) -> Self {
        self.constraints.insert(key.into(), definition.into());
        self
    }
}

/// The complete set of waymark settings.
///
/// # Examples
///
/// ```
/// use waymark_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(!settings.lowercase_urls);
/// assert!(settings.routes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level or `EnvFilter` directive (e.g. "info", "waymark_routing=debug").
    pub log_level: String,

    // ── URL generation ───────────────────────────────────────────────

    /// Whether generated paths are lowercased. The query string is left untouched.
    pub lowercase_urls: bool,
    /// Whether a trailing slash is appended to generated paths.
    pub append_trailing_slash: bool,

    // ── Routes ───────────────────────────────────────────────────────

    /// Route declarations, in matching order.
    pub routes: Vec<RouteSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,

            // Logging
            log_level: "info".to_string(),

            // URL generation
            lowercase_urls: false,
            append_trailing_slash: false,

            // Routes
            routes: Vec::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` if not configured yet.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert!(!s.lowercase_urls);
        assert!(!s.append_trailing_slash);
        assert!(s.routes.is_empty());
    }

    #[test]
    fn test_route_settings_builder() {
        let route = RouteSettings::new("products/{id}")
            .with_name("product")
            .with_default("action", "Details")
            .with_constraint("id", "int");

        assert_eq!(route.template, "products/{id}");
        assert_eq!(route.name.as_deref(), Some("product"));
        assert_eq!(route.defaults.get("action"), Some(&serde_json::json!("Details")));
        assert_eq!(route.constraints.get("id").map(String::as_str), Some("int"));
    }

    #[test]
    fn test_settings_serde_roundtrip() {
        let mut s = Settings::default();
        s.routes.push(RouteSettings::new("{*path}").with_name("fallback"));
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.routes, s.routes);
        assert_eq!(back.log_level, s.log_level);
    }

    #[test]
    fn test_lazy_settings_not_configured() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());
        assert!(lazy.try_get().is_none());
    }

    #[test]
    fn test_lazy_settings_configure() {
        let lazy = LazySettings::new();
        lazy.configure(Settings {
            lowercase_urls: true,
            ..Settings::default()
        });
        assert!(lazy.is_configured());
        assert!(lazy.get().lowercase_urls);
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_configure_twice_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }

    #[test]
    #[should_panic(expected = "not been configured")]
    fn test_lazy_settings_get_unconfigured_panics() {
        let lazy = LazySettings::new();
        let _ = lazy.get();
    }
}
