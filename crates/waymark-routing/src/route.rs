//! A single route: a template with its defaults and constraints.
//!
//! [`TemplateRoute`] ties the matcher and the binder to one compiled template
//! and applies the route's constraints in both directions.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use waymark_core::logging::route_span;
use waymark_core::settings::RouteSettings;
use waymark_core::WaymarkResult;

use crate::binder::TemplateBinder;
use crate::constraint::{resolve_constraint, RouteConstraint, RouteDirection};
use crate::matcher::TemplateMatcher;
use crate::template::ParsedTemplate;
use crate::value::{RouteValue, RouteValueMap};

/// The result of matching a request path against a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// The name of the matched route, if it has one.
    pub route_name: Option<String>,
    /// Captured values merged with the route's defaults.
    pub values: RouteValueMap,
}

/// A URL generated by a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualPathData {
    /// The URL, starting with `/`.
    pub path: String,
    /// The values the URL was rendered from.
    pub values: RouteValueMap,
}

/// A named route template with defaults and constraints.
///
/// # Examples
///
/// ```
/// use waymark_routing::constraint::resolve_constraint;
/// use waymark_routing::route::TemplateRoute;
/// use waymark_routing::value::RouteValueMap;
///
/// let defaults: RouteValueMap = [("action", "Index")].into_iter().collect();
/// let route = TemplateRoute::new(
///     Some("default"),
///     "{controller}/{action}/{id?}",
///     defaults,
///     vec![("id".to_string(), resolve_constraint("int").unwrap())],
/// )
/// .unwrap();
///
/// let matched = route.match_request("/Products/Details/5").unwrap();
/// assert_eq!(matched.route_name.as_deref(), Some("default"));
/// assert!(route.match_request("/Products/Details/five").is_none());
///
/// let values: RouteValueMap = [("controller", "Products")].into_iter().collect();
/// let link = route.virtual_path(None, &values).unwrap();
/// assert_eq!(link.path, "/Products");
/// ```
#[derive(Clone)]
pub struct TemplateRoute {
    name: Option<String>,
    matcher: TemplateMatcher,
    binder: TemplateBinder,
    constraints: Vec<(String, Arc<dyn RouteConstraint>)>,
}

impl fmt::Debug for TemplateRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRoute")
            .field("name", &self.name)
            .field("template", &self.template().text())
            .field("defaults", self.defaults())
            .field("constraints", &self.constraints)
            .finish()
    }
}

impl TemplateRoute {
    /// Compiles `template` into a route.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::TemplateSyntax`](waymark_core::WaymarkError::TemplateSyntax)
    /// if the template does not parse.
    pub fn new(
        name: Option<&str>,
        template: &str,
        defaults: RouteValueMap,
        constraints: Vec<(String, Arc<dyn RouteConstraint>)>,
    ) -> WaymarkResult<Self> {
        let parsed = Arc::new(ParsedTemplate::parse(template)?);
        tracing::debug!(
            route = name.unwrap_or(template),
            template,
            parameters = parsed.parameters().len(),
            "Compiled route template"
        );
        Ok(Self {
            name: name.map(String::from),
            matcher: TemplateMatcher::new(Arc::clone(&parsed), defaults.clone()),
            binder: TemplateBinder::new(parsed, defaults),
            constraints,
        })
    }

    /// Compiles a route declared in settings.
    ///
    /// # Errors
    ///
    /// Fails if the template does not parse, a default is not a scalar, or a
    /// constraint definition is not recognized.
    pub fn from_settings(settings: &RouteSettings) -> WaymarkResult<Self> {
        let defaults = settings
            .defaults
            .iter()
            .map(|(key, value)| RouteValue::from_json(value).map(|v| (key.as_str(), v)))
            .collect::<WaymarkResult<RouteValueMap>>()?;
        let constraints = settings
            .constraints
            .iter()
            .map(|(key, definition)| resolve_constraint(definition).map(|c| (key.clone(), c)))
            .collect::<WaymarkResult<Vec<_>>>()?;
        Self::new(
            settings.name.as_deref(),
            &settings.template,
            defaults,
            constraints,
        )
    }

    /// Adds a constraint on `parameter`.
    #[must_use]
    pub fn with_constraint(
        mut self,
        parameter: impl Into<String>,
        constraint: Arc<dyn RouteConstraint>,
    ) -> Self {
        self.constraints.push((parameter.into(), constraint));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn template(&self) -> &ParsedTemplate {
        self.matcher.template()
    }

    pub const fn defaults(&self) -> &RouteValueMap {
        self.matcher.defaults()
    }

    pub fn constraints(&self) -> &[(String, Arc<dyn RouteConstraint>)] {
        &self.constraints
    }

    /// Matches a request path. One leading `/` is ignored.
    pub fn match_request(&self, path: &str) -> Option<RouteMatch> {
        let span = route_span(self.label());
        let _guard = span.enter();

        let path = path.strip_prefix('/').unwrap_or(path);
        let values = self.matcher.matches(path)?;
        if !self.check_constraints(&values, RouteDirection::IncomingRequest) {
            return None;
        }

        tracing::debug!(path, "Route matched");
        Some(RouteMatch {
            route_name: self.name.clone(),
            values,
        })
    }

    /// Generates a URL from `values`, reusing `ambient_values` where the
    /// template allows it.
    pub fn virtual_path(
        &self,
        ambient_values: Option<&RouteValueMap>,
        values: &RouteValueMap,
    ) -> Option<VirtualPathData> {
        let span = route_span(self.label());
        let _guard = span.enter();

        let Some(result) = self.binder.get_values(ambient_values, values) else {
            tracing::trace!("No usable values for link generation");
            return None;
        };
        if !self.check_constraints(&result.combined_values, RouteDirection::UrlGeneration) {
            return None;
        }
        let Some(path) = self.binder.bind_values(&result.accepted_values) else {
            tracing::trace!("Values do not fit the template");
            return None;
        };

        tracing::debug!(path = path.as_str(), "Generated link");
        Some(VirtualPathData {
            path: format!("/{path}"),
            values: result.accepted_values,
        })
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.template().text())
    }

    /// Constraints on optional parameters with no value are skipped.
    fn check_constraints(&self, values: &RouteValueMap, direction: RouteDirection) -> bool {
        for (parameter, constraint) in &self.constraints {
            let is_optional = self
                .template()
                .parameter(parameter)
                .is_some_and(|p| p.is_optional);
            let has_value = values.get(parameter).is_some_and(|v| !v.is_null());
            if is_optional && !has_value {
                continue;
            }
            if !constraint.matches(parameter, values, direction) {
                tracing::debug!(
                    parameter = parameter.as_str(),
                    ?direction,
                    "Route rejected by constraint"
                );
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(
        template: &str,
        defaults: &[(&str, &str)],
        constraints: &[(&str, &str)],
    ) -> TemplateRoute {
        TemplateRoute::new(
            None,
            template,
            defaults.iter().copied().collect(),
            constraints
                .iter()
                .map(|(p, c)| ((*p).to_string(), resolve_constraint(c).unwrap()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_template_is_error() {
        let err =
            TemplateRoute::new(None, "{a}{b}", RouteValueMap::new(), Vec::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_match_strips_one_leading_slash() {
        let r = route("{controller}", &[], &[]);
        assert!(r.match_request("/Home").is_some());
        assert!(r.match_request("Home").is_some());
        assert!(r.match_request("//Home").is_none());
    }

    #[test]
    fn test_incoming_constraint() {
        let r = route("products/{id}", &[], &[("id", "int")]);
        assert_eq!(
            r.match_request("/products/12").unwrap().values.get("id"),
            Some(&RouteValue::from("12"))
        );
        assert!(r.match_request("/products/abc").is_none());
    }

    #[test]
    fn test_optional_parameter_constraint_skipped_when_absent() {
        let r = route("products/{id?}", &[], &[("id", "int")]);
        assert!(r.match_request("/products").is_some());
        assert!(r.match_request("/products/x").is_none());
        assert_eq!(r.virtual_path(None, &RouteValueMap::new()).unwrap().path, "/products");
    }

    #[test]
    fn test_outgoing_constraint() {
        let r = route("products/{id}", &[], &[("id", "int")]);
        let good: RouteValueMap = [("id", 7_i64)].into_iter().collect();
        let bad: RouteValueMap = [("id", "seven")].into_iter().collect();
        assert_eq!(r.virtual_path(None, &good).unwrap().path, "/products/7");
        assert!(r.virtual_path(None, &bad).is_none());
    }

    #[test]
    fn test_constraint_sees_ambient_values() {
        let r = route("{controller}", &[], &[("culture", "length(2)")]);
        let ambient: RouteValueMap = [("culture", "fr")].into_iter().collect();
        let values: RouteValueMap = [("controller", "Home")].into_iter().collect();
        assert!(r.virtual_path(Some(&ambient), &values).is_some());
        assert!(r.virtual_path(None, &values).is_none());
    }

    #[test]
    fn test_with_constraint() {
        let r = route("{year}", &[], &[])
            .with_constraint("year", resolve_constraint("range(2000,2099)").unwrap());
        assert_eq!(r.constraints().len(), 1);
        assert!(r.match_request("/2024").is_some());
        assert!(r.match_request("/1999").is_none());
    }

    #[test]
    fn test_virtual_path_values() {
        let r = route("{controller}/{action}", &[("action", "Index")], &[]);
        let values: RouteValueMap = [("controller", "Home"), ("page", "2")].into_iter().collect();
        let data = r.virtual_path(None, &values).unwrap();
        assert_eq!(data.path, "/Home?page=2");
        let expected: RouteValueMap = [("controller", "Home"), ("page", "2"), ("action", "Index")]
            .into_iter()
            .collect();
        assert_eq!(data.values, expected);
    }

    #[test]
    fn test_from_settings() {
        let settings = RouteSettings::new("posts/{id}/{format?}")
            .with_name("post")
            .with_default("format", "html")
            .with_constraint("id", "int");
        let r = TemplateRoute::from_settings(&settings).unwrap();
        assert_eq!(r.name(), Some("post"));
        assert_eq!(r.defaults().get("format"), Some(&RouteValue::from("html")));
        assert!(r.match_request("/posts/3").is_some());
        assert!(r.match_request("/posts/x").is_none());
    }

    #[test]
    fn test_from_settings_rejects_bad_declarations() {
        let bad_default = RouteSettings::new("{a}").with_default("a", serde_json::json!([1, 2]));
        assert!(TemplateRoute::from_settings(&bad_default).is_err());

        let bad_constraint = RouteSettings::new("{a}").with_constraint("a", "even");
        assert!(TemplateRoute::from_settings(&bad_constraint).is_err());
    }
}
