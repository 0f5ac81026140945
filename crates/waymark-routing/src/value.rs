//! Route values and the case-insensitive map that carries them.
//!
//! Every input and output of the engine is a [`RouteValueMap`]: defaults,
//! the values captured by a match, the ambient values of the current request,
//! and the new values supplied for link generation.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use waymark_core::{WaymarkError, WaymarkResult};

/// A single route value.
///
/// Values captured from a path are always strings. Defaults and values
/// supplied for URL generation may also be integers or booleans, or `Null`
/// to mean "explicitly no value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteValue {
    /// No value.
    #[default]
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A string value.
    String(String),
}

impl RouteValue {
    /// Returns `true` if this is [`RouteValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for a non-empty string or any non-null, non-string value.
    pub fn is_non_empty(&self) -> bool {
        match self {
            Self::Null => false,
            Self::String(s) => !s.is_empty(),
            Self::Boolean(_) | Self::Integer(_) => true,
        }
    }

    /// Converts a configuration value into a route value.
    ///
    /// Floats are kept in their textual form. Arrays and objects have no
    /// route value counterpart.
    pub fn from_json(value: &serde_json::Value) -> WaymarkResult<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Boolean(*b)),
            serde_json::Value::Number(n) => Ok(n
                .as_i64()
                .map_or_else(|| Self::String(n.to_string()), Self::Integer)),
            serde_json::Value::String(s) => Ok(Self::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(WaymarkError::ImproperlyConfigured(format!(
                    "Route values must be strings, integers, booleans or null, got: {value}"
                )))
            }
        }
    }
}

/// The canonical string form. `Null` renders as the empty string.
impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RouteValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for RouteValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<i64> for RouteValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for RouteValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for RouteValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for RouteValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Compares two route values the way the matcher and binder do.
///
/// Two strings compare case-insensitively. Other non-null values
/// compare by value, so `Integer(5)` and `String("5")` differ. An absent
/// value is treated as `Null`, and `Null` only equals `Null`.
///
/// # Examples
///
/// ```
/// use waymark_routing::value::{route_parts_equal, RouteValue};
///
/// let cool = RouteValue::from("Cool");
/// let lower = RouteValue::from("cool");
/// assert!(route_parts_equal(Some(&cool), Some(&lower)));
/// assert!(route_parts_equal(None, Some(&RouteValue::Null)));
/// assert!(!route_parts_equal(Some(&cool), None));
/// ```
pub fn route_parts_equal(left: Option<&RouteValue>, right: Option<&RouteValue>) -> bool {
    match (left, right) {
        (None | Some(RouteValue::Null), None | Some(RouteValue::Null)) => true,
        (Some(RouteValue::String(a)), Some(RouteValue::String(b))) => eq_ignore_case(a, b),
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Compares two strings ignoring case, using Unicode lowercase mappings.
///
/// Every name and string value comparison in the engine goes through this
/// function, so `"Ärger"` and `"ärger"` are the same parameter.
///
/// ```
/// use waymark_routing::value::eq_ignore_case;
///
/// assert!(eq_ignore_case("ÉCOLE", "école"));
/// assert!(eq_ignore_case("Id", "ID"));
/// assert!(!eq_ignore_case("id", "ids"));
/// ```
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Returns `true` if the value is present and non-empty.
pub fn is_non_empty(value: Option<&RouteValue>) -> bool {
    value.is_some_and(RouteValue::is_non_empty)
}

/// An insertion-ordered map from parameter name to [`RouteValue`] whose keys
/// compare case-insensitively (see [`eq_ignore_case`]).
///
/// Route value maps are small (a handful of entries) so lookups scan a
/// vector; iteration order is insertion order, which determines the order of
/// generated query string parameters.
///
/// # Examples
///
/// ```
/// use waymark_routing::value::{RouteValue, RouteValueMap};
///
/// let mut values = RouteValueMap::new();
/// values.insert("Controller", "Home");
/// assert_eq!(values.get("controller"), Some(&RouteValue::from("Home")));
///
/// values.insert("CONTROLLER", "Products");
/// assert_eq!(values.len(), 1);
/// assert_eq!(values.keys().next(), Some("Controller"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteValueMap {
    entries: Vec<(String, RouteValue)>,
}

impl RouteValueMap {
    /// Creates an empty map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| eq_ignore_case(k, key))
    }

    /// Returns the value for `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&RouteValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Returns `true` if the map has an entry for `key`, ignoring case.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Inserts a value, returning the previous one.
    ///
    /// Replacing an existing entry keeps its position and original key spelling.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Option<RouteValue> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Inserts a value only if the key is absent. Returns `true` if inserted.
    pub fn try_insert(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Removes the entry for `key`, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<RouteValue> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for RouteValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for RouteValueMap {}

impl<K: Into<String>, V: Into<RouteValue>> FromIterator<(K, V)> for RouteValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<RouteValue>> Extend<(K, V)> for RouteValueMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for RouteValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_canonical_strings() {
        assert_eq!(RouteValue::Null.to_string(), "");
        assert_eq!(RouteValue::from("abc").to_string(), "abc");
        assert_eq!(RouteValue::from(123).to_string(), "123");
        assert_eq!(RouteValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_is_non_empty() {
        assert!(!RouteValue::Null.is_non_empty());
        assert!(!RouteValue::from("").is_non_empty());
        assert!(RouteValue::from("x").is_non_empty());
        assert!(RouteValue::from(0).is_non_empty());
        assert!(RouteValue::from(false).is_non_empty());
        assert!(!is_non_empty(None));
    }

    #[test]
    fn test_route_parts_equal() {
        let blog = RouteValue::from("blog");
        let null = RouteValue::Null;
        assert!(route_parts_equal(None, None));
        assert!(route_parts_equal(Some(&null), None));
        assert!(!route_parts_equal(Some(&blog), None));
        assert!(!route_parts_equal(None, Some(&RouteValue::from("store"))));
        assert!(route_parts_equal(
            Some(&RouteValue::from("Cool")),
            Some(&RouteValue::from("cool"))
        ));
        assert!(!route_parts_equal(
            Some(&RouteValue::from("Co0l")),
            Some(&RouteValue::from("cool"))
        ));
        assert!(!route_parts_equal(
            Some(&RouteValue::from(5)),
            Some(&RouteValue::from("5"))
        ));
        assert!(!route_parts_equal(Some(&RouteValue::from("")), Some(&null)));
    }

    #[test]
    fn test_route_parts_equal_non_ascii() {
        assert!(route_parts_equal(
            Some(&RouteValue::from("ÉCOLE")),
            Some(&RouteValue::from("école"))
        ));
        assert!(!route_parts_equal(
            Some(&RouteValue::from("école")),
            Some(&RouteValue::from("ecole"))
        ));
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Ärger", "äRGER"));
        assert!(eq_ignore_case("ΣΟΦΊΑ", "σοφία"));
        assert!(!eq_ignore_case("Ärger", "Arger"));
        assert!(!eq_ignore_case("a", ""));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(RouteValue::from(None::<&str>), RouteValue::Null);
        assert_eq!(RouteValue::from(Some("a")), RouteValue::from("a"));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(RouteValue::from_json(&serde_json::json!(null)).unwrap(), RouteValue::Null);
        assert_eq!(RouteValue::from_json(&serde_json::json!(7)).unwrap(), RouteValue::Integer(7));
        assert_eq!(
            RouteValue::from_json(&serde_json::json!(1.5)).unwrap(),
            RouteValue::from("1.5")
        );
        assert!(RouteValue::from_json(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn test_deserialize_untagged() {
        let v: RouteValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, RouteValue::from("x"));
        let v: RouteValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, RouteValue::Integer(42));
        let v: RouteValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, RouteValue::Null);
    }

    #[test]
    fn test_map_case_insensitive() {
        let mut map = RouteValueMap::new();
        map.insert("Action", "Index");
        assert!(map.contains_key("ACTION"));
        assert_eq!(map.get("action"), Some(&RouteValue::from("Index")));
        assert_eq!(map.remove("aCtIoN"), Some(RouteValue::from("Index")));
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_non_ascii_keys() {
        let mut map = RouteValueMap::new();
        map.insert("Ärger", "x");
        assert_eq!(map.get("ärger"), Some(&RouteValue::from("x")));
        map.insert("ÄRGER", "y");
        assert_eq!(map.len(), 1);
        assert_eq!(map.keys().next(), Some("Ärger"));
        assert!(!map.try_insert("ärger", "z"));
    }

    #[test]
    fn test_map_try_insert_keeps_first() {
        let mut map = RouteValueMap::new();
        assert!(map.try_insert("id", "1"));
        assert!(!map.try_insert("ID", "2"));
        assert_eq!(map.get("id"), Some(&RouteValue::from("1")));
    }

    #[test]
    fn test_map_preserves_order() {
        let mut map: RouteValueMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        map.remove("a");
        map.insert("B", "22");
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(map.get("b"), Some(&RouteValue::from("22")));
    }

    #[test]
    fn test_map_equality_ignores_order_and_case() {
        let a: RouteValueMap = [("x", "1"), ("Y", "2")].into_iter().collect();
        let b: RouteValueMap = [("y", "2"), ("X", "1")].into_iter().collect();
        assert_eq!(a, b);

        let c: RouteValueMap = [("x", "1")].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_map_serializes_as_object() {
        let map: RouteValueMap = [("id", RouteValue::from(5)), ("slug", RouteValue::from("a"))]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "slug": "a"}));
    }
}
