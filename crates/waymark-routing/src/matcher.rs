//! Matching request paths against a parsed template.
//!
//! Simple segments (a single literal or parameter) are matched directly.
//! Segments made of several parts, such as `{year}-{month}` or
//! `{name}.{ext?}`, are scanned right to left: each literal is located at
//! its last occurrence that still leaves room for the parameter to its right,
//! and the text between two literals becomes that parameter's value.
//!
//! A failed match is `None`, never an error.

use std::ops::Range;
use std::sync::Arc;

use crate::template::{ParsedTemplate, TemplatePart, TemplateSegment};
use crate::value::{eq_ignore_case, RouteValue, RouteValueMap};

/// A template paired with its defaults, ready to match paths.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use waymark_routing::matcher::TemplateMatcher;
/// use waymark_routing::template::ParsedTemplate;
/// use waymark_routing::value::{RouteValue, RouteValueMap};
///
/// let template = Arc::new(ParsedTemplate::parse("Sales/{year}-{month}").unwrap());
/// let matcher = TemplateMatcher::new(template, RouteValueMap::new());
///
/// let values = matcher.matches("Sales/2023-04").unwrap();
/// assert_eq!(values.get("year"), Some(&RouteValue::from("2023")));
/// assert_eq!(values.get("month"), Some(&RouteValue::from("04")));
/// assert!(matcher.matches("Sales/2023").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: Arc<ParsedTemplate>,
    defaults: RouteValueMap,
}

impl TemplateMatcher {
    pub const fn new(template: Arc<ParsedTemplate>, defaults: RouteValueMap) -> Self {
        Self { template, defaults }
    }

    pub fn template(&self) -> &ParsedTemplate {
        &self.template
    }

    pub const fn defaults(&self) -> &RouteValueMap {
        &self.defaults
    }

    /// Matches a request path (without a leading `/`) against the template.
    pub fn matches(&self, request_path: &str) -> Option<RouteValueMap> {
        match_path(&self.template, request_path, &self.defaults)
    }
}

/// Matches `request_path` against `template`, returning the captured values
/// merged with `defaults`, or `None` if the path does not fit.
///
/// The path is split on `/` without collapsing empty segments, and is not
/// percent-decoded.
pub fn match_path(
    template: &ParsedTemplate,
    request_path: &str,
    defaults: &RouteValueMap,
) -> Option<RouteValueMap> {
    let request_segments: Vec<&str> = request_path.split('/').collect();
    let segments = template.segments();
    let mut values = RouteValueMap::new();

    for (i, request_segment) in request_segments.iter().copied().enumerate() {
        let Some(segment) = segments.get(i) else {
            // Out of template; only empty segments (a trailing '/') are allowed.
            if request_segment.is_empty() {
                continue;
            }
            return None;
        };

        if !segment.is_simple() {
            if !match_complex_segment(segment, request_segment, &mut values) {
                return None;
            }
            continue;
        }

        match &segment.parts()[0] {
            TemplatePart::Literal { text, .. } => {
                if !eq_ignore_case(text, request_segment) {
                    return None;
                }
            }
            TemplatePart::Parameter(parameter) if parameter.is_catch_all => {
                let captured = request_segments[i..].join("/");
                let value = if captured.is_empty() {
                    defaults.get(&parameter.name).cloned().unwrap_or_default()
                } else {
                    RouteValue::String(captured)
                };
                values.insert(parameter.name.clone(), value);
                // The catch-all is always the last segment.
                break;
            }
            TemplatePart::Parameter(parameter) => {
                if !request_segment.is_empty() {
                    values.insert(parameter.name.clone(), request_segment);
                } else if let Some(default) = defaults.get(&parameter.name) {
                    values.insert(parameter.name.clone(), default.clone());
                } else if !parameter.is_optional {
                    return None;
                }
            }
        }
    }

    // Template segments past the end of the path must be single parameters
    // that can do without a value.
    for segment in segments.iter().skip(request_segments.len()) {
        if !segment.is_simple() {
            return None;
        }
        let parameter = segment.parts()[0].as_parameter()?;
        let default = defaults.get(&parameter.name);
        if default.is_some() || parameter.is_catch_all {
            values.insert(parameter.name.clone(), default.cloned().unwrap_or_default());
        } else if !parameter.is_optional {
            return None;
        }
    }

    for (key, value) in defaults.iter() {
        values.try_insert(key, value.clone());
    }

    Some(values)
}

/// Matches a segment with more than one part.
///
/// When the segment ends in `.{opt?}` the scan first tries to fill every
/// part; if that fails and the request segment does not itself end with the
/// separator, it is retried as if the segment stopped before the separator.
fn match_complex_segment(
    segment: &TemplateSegment,
    request_segment: &str,
    values: &mut RouteValueMap,
) -> bool {
    let parts = segment.parts();
    let last = parts.len() - 1;

    if parts[last].is_optional() && parts[last - 1].is_optional_separator() {
        if match_complex_segment_core(parts, request_segment, values) {
            return true;
        }
        let separator = parts[last - 1].literal_text().unwrap_or_default();
        if ends_with_ignore_case(request_segment, separator) {
            return false;
        }
        return match_complex_segment_core(&parts[..last - 1], request_segment, values);
    }

    match_complex_segment_core(parts, request_segment, values)
}

/// The right-to-left scan over `parts`, which may stop short of the
/// segment's last part.
///
/// Values are collected in a scratch map and only copied into `values` when
/// the whole segment matches.
fn match_complex_segment_core(
    parts: &[TemplatePart],
    request_segment: &str,
    values: &mut RouteValueMap,
) -> bool {
    let mut last_index = request_segment.len();
    let mut pending_parameter = None;
    let mut last_literal_end: Option<usize> = None;
    let mut captured = RouteValueMap::new();

    for (index, part) in parts.iter().enumerate().rev() {
        let mut new_last_index = last_index;

        match part {
            TemplatePart::Parameter(parameter) => {
                // Filled in once the literal to its left is found.
                pending_parameter = Some(parameter);
            }
            TemplatePart::Literal { text, .. } => {
                // A pending parameter needs at least one character.
                let reserved = if pending_parameter.is_some() { 2 } else { 1 };
                let Some(search_end) = last_index.checked_sub(reserved) else {
                    return false;
                };
                let Some(found) = rfind_ignore_case(request_segment, text, search_end) else {
                    return false;
                };

                // The rightmost literal must sit flush with the end of the
                // request segment, or "Foo" would match "somethingFoo".
                if index + 1 == parts.len() && found.end != request_segment.len() {
                    return false;
                }
                last_literal_end = Some(found.end);
                new_last_index = found.start;
            }
        }

        if let Some(parameter) = pending_parameter {
            if (last_literal_end.is_some() && part.is_literal()) || index == 0 {
                let (value_start, value_end) = match last_literal_end {
                    Some(literal_end) if !(index == 0 && part.is_parameter()) => {
                        (literal_end, last_index)
                    }
                    _ => (0, last_index),
                };

                // Every parameter in a multi-part segment needs a value.
                match request_segment.get(value_start..value_end) {
                    Some(value) if !value.is_empty() => {
                        captured.insert(parameter.name.clone(), value);
                    }
                    _ => return false,
                }

                pending_parameter = None;
                last_literal_end = None;
            }
        }

        last_index = new_last_index;
    }

    // Either the scan consumed the whole request segment, or the leftmost
    // part is a parameter that absorbed what was left.
    if last_index == 0 || parts.first().is_some_and(TemplatePart::is_parameter) {
        for (key, value) in captured.iter() {
            values.insert(key, value.clone());
        }
        return true;
    }
    false
}

/// Finds the last case-insensitive occurrence of `needle` that lies entirely
/// within `haystack[..=end]`, returning its byte range in `haystack`.
///
/// The occurrence may differ in byte length from `needle` when the two are
/// spelled in different cases.
fn rfind_ignore_case(haystack: &str, needle: &str, end: usize) -> Option<Range<usize>> {
    if needle.is_empty() || end >= haystack.len() {
        return None;
    }
    let folded: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    haystack
        .char_indices()
        .rev()
        .filter(|&(start, _)| start <= end)
        .find_map(|(start, _)| {
            let len = folded_prefix_len(&haystack[start..], &folded)?;
            (start + len <= end + 1).then_some(start..start + len)
        })
}

/// Returns the byte length of the prefix of `text` whose lowercase form is
/// exactly `folded`.
fn folded_prefix_len(text: &str, folded: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (i, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if folded.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == folded.len() {
            return Some(i + c.len_utf8());
        }
    }
    None
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    suffix.is_empty()
        || text
            .char_indices()
            .rev()
            .any(|(i, _)| eq_ignore_case(&text[i..], suffix))
}
