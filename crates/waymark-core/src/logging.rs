//! Logging integration for waymark.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-route spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info", "warn",
/// "error", or any `EnvFilter` directive such as `waymark_routing=trace`). In
/// debug mode a pretty, human-readable format is used; otherwise a structured
/// JSON format is used.
///
/// Logs go to stderr so they never mix with command output on stdout.
/// Installing a subscriber twice is not an error; the second call is ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for work done on behalf of one route.
///
/// Unnamed routes are recorded with the template text instead.
///
/// # Examples
///
/// ```
/// use waymark_core::logging::route_span;
///
/// let span = route_span("product-detail");
/// let _guard = span.enter();
/// tracing::debug!("matching");
/// ```
pub fn route_span(route: &str) -> tracing::Span {
    tracing::debug_span!("route", route = route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "not a valid filter [".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&settings);
    }

    #[test]
    fn test_route_span_can_be_entered() {
        let span = route_span("home");
        let _guard = span.enter();
        tracing::debug!("inside route span");
    }
}
