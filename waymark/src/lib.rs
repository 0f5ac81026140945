//! # waymark
//!
//! Route templates for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `waymark` to get everything, or depend on
//! individual crates for finer-grained control.
//!
//! ```
//! use waymark::prelude::*;
//!
//! let mut table = RouteTable::new();
//! table.route("default", "{controller}/{action}/{id?}").unwrap();
//!
//! let matched = table.resolve("/Products/Details/5").unwrap();
//! assert_eq!(matched.values.get("id"), Some(&RouteValue::from("5")));
//!
//! let link = table.url_for(Some("default"), Some(&matched.values), &RouteValueMap::new());
//! assert_eq!(link.as_deref(), Some("/Products/Details/5"));
//! ```

/// Core types, settings, logging, and error types.
pub use waymark_core as core;

/// Template parsing, path matching, and URL generation.
pub use waymark_routing as routing;

/// The `waymark` command-line tool.
#[cfg(feature = "cli")]
pub use waymark_cli as cli;

/// Third-party crates the public API exposes.
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;

/// The most commonly used types from every sub-crate.
pub mod prelude {
    pub use waymark_core::{Settings, WaymarkError, WaymarkResult};
    pub use waymark_routing::prelude::*;
}
