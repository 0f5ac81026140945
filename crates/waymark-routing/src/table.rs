//! An ordered collection of routes.
//!
//! Incoming paths are resolved first-match-wins, in registration order. URL
//! generation either targets a route by name or, without a name, uses the
//! first route that can produce a URL from the given values.

use waymark_core::{Settings, WaymarkError, WaymarkResult};

use crate::route::{RouteMatch, TemplateRoute};
use crate::value::{eq_ignore_case, RouteValueMap};

/// Post-processing applied to generated URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Lowercase the path part of generated URLs. The query string is kept as is.
    pub lowercase_urls: bool,
    /// Make sure the path part of generated URLs ends with `/`.
    pub append_trailing_slash: bool,
}

impl RouteOptions {
    fn apply(self, url: String) -> String {
        if !self.lowercase_urls && !self.append_trailing_slash {
            return url;
        }
        let (path, query) = url
            .split_once('?')
            .map_or((url.as_str(), None), |(path, query)| (path, Some(query)));

        let mut result = if self.lowercase_urls {
            path.to_lowercase()
        } else {
            path.to_string()
        };
        if self.append_trailing_slash && !result.ends_with('/') {
            result.push('/');
        }
        if let Some(query) = query {
            result.push('?');
            result.push_str(query);
        }
        result
    }
}

/// Routes consulted in order.
///
/// # Examples
///
/// ```
/// use waymark_routing::table::RouteTable;
/// use waymark_routing::value::RouteValueMap;
///
/// let mut table = RouteTable::new();
/// table.route("blog", "blog/{year}/{slug}").unwrap();
/// table.route("page", "{slug}").unwrap();
///
/// let matched = table.resolve("/blog/2024/hello").unwrap();
/// assert_eq!(matched.route_name.as_deref(), Some("blog"));
///
/// let values: RouteValueMap = [("slug", "about")].into_iter().collect();
/// assert_eq!(table.url_for(Some("page"), None, &values).as_deref(), Some("/about"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<TemplateRoute>,
    options: RouteOptions,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RouteOptions) -> Self {
        Self {
            routes: Vec::new(),
            options,
        }
    }

    /// Builds a table from the routes and URL options in `settings`.
    ///
    /// # Errors
    ///
    /// Fails if a template does not parse, a default is not a scalar, a
    /// constraint definition is not recognized, or two routes share a name.
    pub fn from_settings(settings: &Settings) -> WaymarkResult<Self> {
        let mut table = Self::with_options(RouteOptions {
            lowercase_urls: settings.lowercase_urls,
            append_trailing_slash: settings.append_trailing_slash,
        });

        for route in &settings.routes {
            table.add(TemplateRoute::from_settings(route)?)?;
        }

        tracing::debug!(routes = table.len(), "Route table loaded from settings");
        Ok(table)
    }

    /// Appends a route.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::ImproperlyConfigured`] if a route with the same
    /// name (ignoring case) is already registered.
    pub fn add(&mut self, route: TemplateRoute) -> WaymarkResult<()> {
        if let Some(name) = route.name() {
            if self.get(name).is_some() {
                return Err(WaymarkError::ImproperlyConfigured(format!(
                    "Duplicate route name: {name}"
                )));
            }
        }
        self.routes.push(route);
        Ok(())
    }

    /// Adds a named route with no defaults or constraints.
    ///
    /// # Errors
    ///
    /// Fails if the template does not parse or the name is taken.
    pub fn route(&mut self, name: &str, template: &str) -> WaymarkResult<()> {
        self.add(TemplateRoute::new(
            Some(name),
            template,
            RouteValueMap::new(),
            Vec::new(),
        )?)
    }

    /// Looks up a route by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&TemplateRoute> {
        self.routes
            .iter()
            .find(|route| route.name().is_some_and(|n| eq_ignore_case(n, name)))
    }

    pub fn routes(&self) -> &[TemplateRoute] {
        &self.routes
    }

    pub const fn options(&self) -> RouteOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the first route that matches `path` and whose constraints
    /// accept the captured values.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let matched = self.routes.iter().find_map(|route| route.match_request(path));
        if matched.is_none() {
            tracing::debug!(path, "No route matches path");
        }
        matched
    }

    /// Like [`resolve`](Self::resolve), but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns [`WaymarkError::NotFound`] if no route matches.
    pub fn try_resolve(&self, path: &str) -> WaymarkResult<RouteMatch> {
        self.resolve(path)
            .ok_or_else(|| WaymarkError::NotFound(format!("No route matches '{path}'")))
    }

    /// Generates a URL starting with `/`.
    ///
    /// With a name, only that route is tried; an unknown name yields `None`.
    /// Without one, routes are tried in order.
    pub fn url_for(
        &self,
        name: Option<&str>,
        ambient_values: Option<&RouteValueMap>,
        values: &RouteValueMap,
    ) -> Option<String> {
        let data = match name {
            Some(name) => {
                let Some(route) = self.get(name) else {
                    tracing::debug!(name, "No route with this name");
                    return None;
                };
                route.virtual_path(ambient_values, values)?
            }
            None => self
                .routes
                .iter()
                .find_map(|route| route.virtual_path(ambient_values, values))?,
        };
        Some(self.options.apply(data.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RouteValue;
    use waymark_core::RouteSettings;

    fn values(pairs: &[(&str, &str)]) -> RouteValueMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_options_apply() {
        let options = RouteOptions {
            lowercase_urls: true,
            append_trailing_slash: true,
        };
        assert_eq!(options.apply("/Home/Index?Sort=Desc".into()), "/home/index/?Sort=Desc");
        assert_eq!(options.apply("/".into()), "/");
        assert_eq!(RouteOptions::default().apply("/A?b".into()), "/A?b");
    }

    #[test]
    fn test_first_match_wins() {
        let mut table = RouteTable::new();
        table.route("one", "{a}").unwrap();
        table.route("two", "{b}").unwrap();
        assert_eq!(table.resolve("/x").unwrap().route_name.as_deref(), Some("one"));
        assert!(table.resolve("/x/y").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table = RouteTable::new();
        table.route("home", "").unwrap();
        let err = table.route("HOME", "index").unwrap_err();
        assert!(matches!(err, WaymarkError::ImproperlyConfigured(_)));
        assert_eq!(table.len(), 1);

        table.route("Accueil-Été", "ete").unwrap();
        assert!(table.route("accueil-été", "summer").is_err());
        assert_eq!(table.get("ACCUEIL-ÉTÉ").map(|r| r.template().text()), Some("ete"));
    }

    #[test]
    fn test_unnamed_routes_do_not_clash() {
        let mut table = RouteTable::new();
        for template in ["a", "b"] {
            table
                .add(TemplateRoute::new(None, template, RouteValueMap::new(), Vec::new()).unwrap())
                .unwrap();
        }
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_url_for_unknown_name() {
        let table = RouteTable::new();
        assert!(table.url_for(Some("missing"), None, &RouteValueMap::new()).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_url_for_falls_through_routes() {
        let mut table = RouteTable::new();
        table.route("post", "posts/{id}").unwrap();
        table.route("tag", "tags/{tag}").unwrap();
        assert_eq!(
            table.url_for(None, None, &values(&[("tag", "rust")])).as_deref(),
            Some("/tags/rust")
        );
    }

    #[test]
    fn test_try_resolve() {
        let mut table = RouteTable::new();
        table.route("home", "").unwrap();
        assert!(table.try_resolve("/").is_ok());
        assert!(matches!(
            table.try_resolve("/nope"),
            Err(WaymarkError::NotFound(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            lowercase_urls: true,
            routes: vec![RouteSettings::new("{controller}/{action}/{id?}")
                .with_name("default")
                .with_default("action", "Index")
                .with_default("page", 1)
                .with_constraint("id", "int")],
            ..Settings::default()
        };
        let table = RouteTable::from_settings(&settings).unwrap();
        assert!(table.options().lowercase_urls);

        let route = table.get("default").unwrap();
        assert_eq!(route.defaults().get("page"), Some(&RouteValue::Integer(1)));
        assert!(table.resolve("/Home/Index/x").is_none());
        assert_eq!(
            table
                .url_for(Some("default"), None, &values(&[("controller", "Home"), ("id", "3")]))
                .as_deref(),
            Some("/home/index/3")
        );
    }

    #[test]
    fn test_from_settings_errors() {
        let bad_constraint = Settings {
            routes: vec![RouteSettings::new("{id}").with_constraint("id", "prime")],
            ..Settings::default()
        };
        assert!(RouteTable::from_settings(&bad_constraint).is_err());

        let bad_default = Settings {
            routes: vec![RouteSettings::new("{id}").with_default("id", serde_json::json!([1]))],
            ..Settings::default()
        };
        assert!(RouteTable::from_settings(&bad_default).is_err());

        let bad_template = Settings {
            routes: vec![RouteSettings::new("{id")],
            ..Settings::default()
        };
        assert!(RouteTable::from_settings(&bad_template)
            .unwrap_err()
            .is_configuration());
    }
}
