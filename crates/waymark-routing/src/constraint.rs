//! Route constraints.
//!
//! A constraint is consulted after a template has matched a path, and before
//! a URL is rendered. It sees the whole value map, so it can reject a route
//! based on any value, not just the one it is attached to.
//!
//! # Built-in constraints
//!
//! | Definition           | Accepts                                    |
//! |----------------------|--------------------------------------------|
//! | `int`                | a 64-bit signed integer                    |
//! | `bool`               | `true` or `false`, any case                |
//! | `alpha`              | one or more ASCII letters                  |
//! | `slug`               | `[-a-zA-Z0-9_]+`                           |
//! | `uuid`               | a UUID in any format the `uuid` crate reads|
//! | `length(n)`          | exactly `n` characters                     |
//! | `length(min,max)`    | between `min` and `max` characters         |
//! | `min(n)`             | an integer no smaller than `n`             |
//! | `max(n)`             | an integer no larger than `n`              |
//! | `range(min,max)`     | an integer in `min..=max`                  |
//! | `regex(pattern)`     | the whole value matches, ignoring case     |
//!
//! Every built-in rejects a missing or null value.

use std::fmt;
use std::sync::Arc;

use waymark_core::{WaymarkError, WaymarkResult};

use crate::value::RouteValueMap;

/// Why a constraint is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDirection {
    /// A request path has matched the template.
    IncomingRequest,
    /// A URL is about to be generated.
    UrlGeneration,
}

/// A check applied to route values.
///
/// Implementations must be thread-safe since routes are shared between
/// threads.
pub trait RouteConstraint: Send + Sync + fmt::Debug {
    /// Returns `true` if `values` satisfy this constraint for `parameter`.
    fn matches(&self, parameter: &str, values: &RouteValueMap, direction: RouteDirection) -> bool;
}

fn value_text(parameter: &str, values: &RouteValueMap) -> Option<String> {
    values
        .get(parameter)
        .filter(|value| !value.is_null())
        .map(ToString::to_string)
}

fn value_integer(parameter: &str, values: &RouteValueMap) -> Option<i64> {
    value_text(parameter, values)?.parse().ok()
}

/// Accepts values that parse as `i64`.
#[derive(Debug, Clone, Copy)]
pub struct IntConstraint;

impl RouteConstraint for IntConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_integer(parameter, values).is_some()
    }
}

/// Accepts `true` and `false`, ignoring case.
#[derive(Debug, Clone, Copy)]
pub struct BoolConstraint;

impl RouteConstraint for BoolConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"))
    }
}

/// Accepts one or more ASCII letters.
#[derive(Debug, Clone, Copy)]
pub struct AlphaConstraint;

impl RouteConstraint for AlphaConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values)
            .is_some_and(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_alphabetic()))
    }
}

/// Accepts ASCII letters, digits, hyphens and underscores.
#[derive(Debug, Clone, Copy)]
pub struct SlugConstraint;

impl RouteConstraint for SlugConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values).is_some_and(|v| {
            !v.is_empty()
                && v
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
    }
}

/// Accepts anything [`uuid::Uuid`] can parse.
#[derive(Debug, Clone, Copy)]
pub struct UuidConstraint;

impl RouteConstraint for UuidConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values).is_some_and(|v| v.parse::<uuid::Uuid>().is_ok())
    }
}

/// Accepts values whose length in characters is within `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct LengthConstraint {
    pub min: usize,
    pub max: usize,
}

impl RouteConstraint for LengthConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values)
            .is_some_and(|v| (self.min..=self.max).contains(&v.chars().count()))
    }
}

/// Accepts integers no smaller than the bound.
#[derive(Debug, Clone, Copy)]
pub struct MinConstraint(pub i64);

impl RouteConstraint for MinConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_integer(parameter, values).is_some_and(|v| v >= self.0)
    }
}

/// Accepts integers no larger than the bound.
#[derive(Debug, Clone, Copy)]
pub struct MaxConstraint(pub i64);

impl RouteConstraint for MaxConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_integer(parameter, values).is_some_and(|v| v <= self.0)
    }
}

/// Accepts integers in `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct RangeConstraint {
    pub min: i64,
    pub max: i64,
}

impl RouteConstraint for RangeConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_integer(parameter, values).is_some_and(|v| (self.min..=self.max).contains(&v))
    }
}

/// Accepts values matched in full by a case-insensitive pattern.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    pattern: String,
    regex: regex::Regex,
}

impl RegexConstraint {
    /// Compiles `pattern`, anchoring it at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::ImproperlyConfigured`] if the pattern is invalid.
    pub fn new(pattern: &str) -> WaymarkResult<Self> {
        let regex = regex::Regex::new(&format!("(?i)^(?:{pattern})$")).map_err(|e| {
            WaymarkError::ImproperlyConfigured(format!("Invalid constraint regex '{pattern}': {e}"))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl RouteConstraint for RegexConstraint {
    fn matches(&self, parameter: &str, values: &RouteValueMap, _: RouteDirection) -> bool {
        value_text(parameter, values).is_some_and(|v| self.regex.is_match(&v))
    }
}

/// Builds a constraint from its textual form, e.g. `"int"` or `"range(1,12)"`.
///
/// Names are matched ignoring ASCII case. The argument of `regex(...)` is
/// everything between the first `(` and the last `)`.
///
/// # Errors
///
/// Returns [`WaymarkError::ImproperlyConfigured`] if the name is unknown or
/// the arguments are missing or malformed.
///
/// # Examples
///
/// ```
/// use waymark_routing::constraint::{resolve_constraint, RouteDirection};
/// use waymark_routing::value::RouteValueMap;
///
/// let constraint = resolve_constraint("range(1,12)").unwrap();
/// let values: RouteValueMap = [("month", "4")].into_iter().collect();
/// assert!(constraint.matches("month", &values, RouteDirection::IncomingRequest));
///
/// assert!(resolve_constraint("prime").is_err());
/// ```
pub fn resolve_constraint(definition: &str) -> WaymarkResult<Arc<dyn RouteConstraint>> {
    let definition = definition.trim();
    let (name, args) = split_definition(definition)?;

    let constraint: Arc<dyn RouteConstraint> = match (name.to_ascii_lowercase().as_str(), args) {
        ("int", None) => Arc::new(IntConstraint),
        ("bool", None) => Arc::new(BoolConstraint),
        ("alpha", None) => Arc::new(AlphaConstraint),
        ("slug", None) => Arc::new(SlugConstraint),
        ("uuid", None) => Arc::new(UuidConstraint),
        ("length", Some(args)) => match parse_numbers::<usize>(definition, args)?.as_slice() {
            [n] => Arc::new(LengthConstraint { min: *n, max: *n }),
            [min, max] if min <= max => Arc::new(LengthConstraint {
                min: *min,
                max: *max,
            }),
            _ => return Err(malformed(definition)),
        },
        ("min", Some(args)) => match parse_numbers::<i64>(definition, args)?.as_slice() {
            [n] => Arc::new(MinConstraint(*n)),
            _ => return Err(malformed(definition)),
        },
        ("max", Some(args)) => match parse_numbers::<i64>(definition, args)?.as_slice() {
            [n] => Arc::new(MaxConstraint(*n)),
            _ => return Err(malformed(definition)),
        },
        ("range", Some(args)) => match parse_numbers::<i64>(definition, args)?.as_slice() {
            [min, max] if min <= max => Arc::new(RangeConstraint {
                min: *min,
                max: *max,
            }),
            _ => return Err(malformed(definition)),
        },
        ("regex", Some(pattern)) if !pattern.is_empty() => {
            Arc::new(RegexConstraint::new(pattern)?)
        }
        (
            "int" | "bool" | "alpha" | "slug" | "uuid" | "length" | "min" | "max" | "range"
            | "regex",
            _,
        ) => return Err(malformed(definition)),
        _ => {
            return Err(WaymarkError::ImproperlyConfigured(format!(
                "Unknown route constraint: {definition}"
            )))
        }
    };
    Ok(constraint)
}

/// Splits `name(args)` into its name and the raw argument text.
fn split_definition(definition: &str) -> WaymarkResult<(&str, Option<&str>)> {
    let Some(open) = definition.find('(') else {
        return Ok((definition, None));
    };
    if !definition.ends_with(')') {
        return Err(malformed(definition));
    }
    Ok((definition[..open].trim(), Some(&definition[open + 1..definition.len() - 1])))
}

fn parse_numbers<T: std::str::FromStr>(definition: &str, args: &str) -> WaymarkResult<Vec<T>> {
    args.split(',')
        .map(|arg| arg.trim().parse::<T>().map_err(|_| malformed(definition)))
        .collect()
}

fn malformed(definition: &str) -> WaymarkError {
    WaymarkError::ImproperlyConfigured(format!("Malformed route constraint: {definition}"))
}
