//! URL generation: binding route values back into a template.
//!
//! Generation runs in two phases.
//!
//! 1. [`TemplateBinder::get_values`] decides which values to use. New values
//!    win over ambient ones, and a new value that differs from the ambient
//!    value for a parameter stops ambient values from being reused for that
//!    parameter and every parameter after it. Required parameters fall back
//!    to their defaults. Defaults for keys that are not parameters act as
//!    filters: a new value that contradicts one rejects the template.
//! 2. [`TemplateBinder::bind_values`] renders the accepted values. Values
//!    equal to their default are buffered so trailing defaults can be left
//!    out, and accepted values the template does not use become the query
//!    string.
//!
//! Failing to generate a URL is `None`, not an error.

pub mod uri;

use std::sync::Arc;

use crate::template::ParsedTemplate;
use crate::value::{is_non_empty, route_parts_equal, RouteValueMap};

use self::uri::{encode_path, encode_query_data, UriBuildingContext};

/// The outcome of value reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValuesResult {
    /// The values used to render the URL.
    pub accepted_values: RouteValueMap,
    /// The accepted values plus ambient values for keys that are not template
    /// parameters. Visible to constraints, not rendered.
    pub combined_values: RouteValueMap,
}

/// Generates URLs for one template.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use waymark_routing::binder::TemplateBinder;
/// use waymark_routing::template::ParsedTemplate;
/// use waymark_routing::value::RouteValueMap;
///
/// let template = Arc::new(ParsedTemplate::parse("{controller}/{action}/{id?}").unwrap());
/// let binder = TemplateBinder::new(template, RouteValueMap::new());
///
/// let values: RouteValueMap = [("controller", "Products"), ("action", "Index")]
///     .into_iter()
///     .collect();
/// assert_eq!(binder.bind(None, &values).as_deref(), Some("Products/Index"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    template: Arc<ParsedTemplate>,
    defaults: RouteValueMap,
    filters: RouteValueMap,
}

impl TemplateBinder {
    pub fn new(template: Arc<ParsedTemplate>, defaults: RouteValueMap) -> Self {
        let filters = defaults
            .iter()
            .filter(|(key, _)| template.parameter(key).is_none())
            .map(|(key, value)| (key, value.clone()))
            .collect();
        Self {
            template,
            defaults,
            filters,
        }
    }

    pub fn template(&self) -> &ParsedTemplate {
        &self.template
    }

    pub const fn defaults(&self) -> &RouteValueMap {
        &self.defaults
    }

    /// Defaults whose keys are not template parameters.
    pub const fn filters(&self) -> &RouteValueMap {
        &self.filters
    }

    /// Chooses the values to generate a URL from, or `None` if a required
    /// parameter has no value or a filter is contradicted.
    pub fn get_values(
        &self,
        ambient_values: Option<&RouteValueMap>,
        values: &RouteValueMap,
    ) -> Option<TemplateValuesResult> {
        let mut accepted = RouteValueMap::new();

        for parameter in self.template.parameters() {
            let name = parameter.name.as_str();
            let new_value = values.get(name);
            let ambient_value = ambient_values.and_then(|ambient| ambient.get(name));

            if let (Some(new), Some(ambient)) = (new_value, ambient_value) {
                if !route_parts_equal(Some(new), Some(ambient)) {
                    // Later parameters depend on this one; stop reusing ambient values.
                    break;
                }
            }

            match (new_value, ambient_value) {
                (Some(new), _) => {
                    if new.is_non_empty() {
                        accepted.try_insert(name, new.clone());
                    }
                }
                (None, Some(ambient)) => {
                    accepted.try_insert(name, ambient.clone());
                }
                (None, None) => {}
            }
        }

        for (key, value) in values.iter() {
            if value.is_non_empty() {
                accepted.try_insert(key, value.clone());
            }
        }

        for parameter in self.template.parameters() {
            if parameter.is_optional || parameter.is_catch_all {
                continue;
            }
            if !accepted.contains_key(&parameter.name) {
                if let Some(default) = self.defaults.get(&parameter.name) {
                    accepted.insert(parameter.name.clone(), default.clone());
                }
            }
        }

        let missing = self
            .template
            .parameters()
            .iter()
            .filter(|p| !p.is_optional && !p.is_catch_all)
            .find(|p| !accepted.contains_key(&p.name));
        if let Some(parameter) = missing {
            tracing::trace!(
                template = self.template.text(),
                parameter = parameter.name.as_str(),
                "No value for required parameter"
            );
            return None;
        }

        for (key, filter) in self.filters.iter() {
            if let Some(value) = values.get(key) {
                if !route_parts_equal(Some(value), Some(filter)) {
                    tracing::trace!(
                        template = self.template.text(),
                        key,
                        "Value contradicts route default"
                    );
                    return None;
                }
            }
        }

        let mut combined = accepted.clone();
        if let Some(ambient) = ambient_values {
            for (key, value) in ambient.iter() {
                if is_non_empty(Some(value))
                    && self.template.parameter(key).is_none()
                    && !accepted.contains_key(key)
                {
                    combined.insert(key, value.clone());
                }
            }
        }

        Some(TemplateValuesResult {
            accepted_values: accepted,
            combined_values: combined,
        })
    }

    /// Renders accepted values into a path and query string, without a
    /// leading `/`. Returns `None` if the values do not fit the template.
    pub fn bind_values(&self, accepted_values: &RouteValueMap) -> Option<String> {
        let mut remaining = accepted_values.clone();
        let mut context = UriBuildingContext::new();

        for segment in self.template.segments() {
            let parts = segment.parts();
            for (j, part) in parts.iter().enumerate() {
                if let Some(text) = part.literal_text() {
                    if !context.accept(text) {
                        return None;
                    }
                    continue;
                }
                let Some(parameter) = part.as_parameter() else {
                    continue;
                };

                let value = remaining.remove(&parameter.name);
                let is_same_as_default = self
                    .defaults
                    .get(&parameter.name)
                    .is_some_and(|default| route_parts_equal(value.as_ref(), Some(default)));
                let converted = value.map(|v| v.to_string()).unwrap_or_default();

                if is_same_as_default {
                    if !context.buffer(&converted) {
                        return None;
                    }
                } else if !context.accept(&converted) {
                    // "{id}.{format?}" with no format: drop the dangling '.'.
                    if j > 0 && parameter.is_optional && parts[j - 1].is_optional_separator() {
                        context.remove();
                    } else {
                        return None;
                    }
                }
            }
            context.end_segment();
        }

        let mut url = encode_path(&context.into_uri());

        let mut first = true;
        for (key, value) in remaining.iter() {
            if self.defaults.contains_key(key) {
                continue;
            }
            let converted = value.to_string();
            if converted.is_empty() {
                continue;
            }
            url.push(if first { '?' } else { '&' });
            first = false;
            url.push_str(&encode_query_data(key));
            url.push('=');
            url.push_str(&encode_query_data(&converted));
        }

        Some(url)
    }

    /// Runs both phases.
    pub fn bind(
        &self,
        ambient_values: Option<&RouteValueMap>,
        values: &RouteValueMap,
    ) -> Option<String> {
        let result = self.get_values(ambient_values, values)?;
        self.bind_values(&result.accepted_values)
    }
}

/// Phase one without a long-lived binder. See [`TemplateBinder::get_values`].
pub fn resolve(
    template: Arc<ParsedTemplate>,
    defaults: &RouteValueMap,
    ambient_values: Option<&RouteValueMap>,
    values: &RouteValueMap,
) -> Option<TemplateValuesResult> {
    TemplateBinder::new(template, defaults.clone()).get_values(ambient_values, values)
}

/// Phase two without a long-lived binder. See [`TemplateBinder::bind_values`].
pub fn render(
    template: Arc<ParsedTemplate>,
    defaults: &RouteValueMap,
    accepted_values: &RouteValueMap,
) -> Option<String> {
    TemplateBinder::new(template, defaults.clone()).bind_values(accepted_values)
}
