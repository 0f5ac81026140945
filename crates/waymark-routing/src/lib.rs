//! # waymark-routing
//!
//! A route template engine. Templates such as `"{controller}/{action}/{id?}"`
//! are compiled once and then used in both directions: matching request paths
//! into route values, and generating URLs from route values.
//!
//! ## Modules
//!
//! - [`value`] - Route values and the case-insensitive value map
//! - [`template`] - The compiled template model and its parser
//! - [`matcher`] - Matching request paths against a template
//! - [`binder`] - Generating URLs from a template and route values
//! - [`constraint`] - Route constraints and the built-in constraint set
//! - [`route`] - A template with defaults and constraints
//! - [`table`] - An ordered, first-match-wins collection of routes
//!
//! ## Example
//!
//! ```
//! use waymark_routing::prelude::*;
//!
//! let defaults: RouteValueMap = [("action", "Index")].into_iter().collect();
//! let route = TemplateRoute::new(None, "{controller}/{action}/{id?}", defaults, Vec::new()).unwrap();
//!
//! let matched = route.match_request("/Products").unwrap();
//! assert_eq!(matched.values.get("action"), Some(&RouteValue::from("Index")));
//!
//! let values: RouteValueMap = [("action", "Details"), ("id", "42")].into_iter().collect();
//! let link = route.virtual_path(Some(&matched.values), &values).unwrap();
//! assert_eq!(link.path, "/Products/Details/42");
//! ```

pub mod binder;
pub mod constraint;
pub mod matcher;
pub mod route;
pub mod table;
pub mod template;
pub mod value;

pub use binder::{TemplateBinder, TemplateValuesResult};
pub use constraint::{resolve_constraint, RouteConstraint, RouteDirection};
pub use matcher::{match_path, TemplateMatcher};
pub use route::{RouteMatch, TemplateRoute, VirtualPathData};
pub use table::{RouteOptions, RouteTable};
pub use template::{ParseError, ParseErrorKind, ParsedTemplate};
pub use value::{RouteValue, RouteValueMap};

/// The types most programs need.
pub mod prelude {
    pub use crate::route::{RouteMatch, TemplateRoute, VirtualPathData};
    pub use crate::table::{RouteOptions, RouteTable};
    pub use crate::template::ParsedTemplate;
    pub use crate::value::{RouteValue, RouteValueMap};
}
