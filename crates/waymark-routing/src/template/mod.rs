//! The compiled form of a route template.
//!
//! A template such as `"{controller}/{action}/{id?}"` is parsed once into a
//! [`ParsedTemplate`] and then shared read-only by the matcher and the binder.
//!
//! ```text
//! "Sales/{year}-{month}"
//!   segment 0: [Literal("Sales")]
//!   segment 1: [Parameter(year), Literal("-"), Parameter(month)]
//! ```

pub mod parser;

use std::fmt;
use std::str::FromStr;

use crate::value::eq_ignore_case;

pub use parser::{parse, ParseError, ParseErrorKind};

/// A named parameter in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateParameter {
    /// The parameter name, as written in the template.
    pub name: String,
    /// `{*name}`: captures the rest of the path, separators included.
    pub is_catch_all: bool,
    /// `{name?}`: may be omitted.
    pub is_optional: bool,
}

/// One atomic piece of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplatePart {
    /// Literal text, with brace escapes already decoded.
    Literal {
        /// The literal text.
        text: String,
        /// Set on the `.` that directly precedes a trailing optional parameter.
        is_optional_separator: bool,
    },
    /// A parameter.
    Parameter(TemplateParameter),
}

impl TemplatePart {
    /// Creates a literal part.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal {
            text: text.into(),
            is_optional_separator: false,
        }
    }

    /// Creates a parameter part.
    pub fn parameter(name: impl Into<String>, is_catch_all: bool, is_optional: bool) -> Self {
        Self::Parameter(TemplateParameter {
            name: name.into(),
            is_catch_all,
            is_optional,
        })
    }

    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub const fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }

    /// Returns the parameter if this part is one.
    pub const fn as_parameter(&self) -> Option<&TemplateParameter> {
        match self {
            Self::Parameter(p) => Some(p),
            Self::Literal { .. } => None,
        }
    }

    /// Returns the literal text if this part is a literal.
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            Self::Literal { text, .. } => Some(text),
            Self::Parameter(_) => None,
        }
    }

    pub const fn is_optional_separator(&self) -> bool {
        matches!(
            self,
            Self::Literal {
                is_optional_separator: true,
                ..
            }
        )
    }

    pub const fn is_catch_all(&self) -> bool {
        matches!(self, Self::Parameter(p) if p.is_catch_all)
    }

    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Parameter(p) if p.is_optional)
    }
}

impl fmt::Display for TemplatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { text, .. } => {
                for c in text.chars() {
                    match c {
                        '{' => f.write_str("{{")?,
                        '}' => f.write_str("}}")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                Ok(())
            }
            Self::Parameter(p) => {
                f.write_str("{")?;
                if p.is_catch_all {
                    f.write_str("*")?;
                }
                f.write_str(&p.name)?;
                if p.is_optional {
                    f.write_str("?")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// The parts between two `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TemplateSegment {
    parts: Vec<TemplatePart>,
}

impl TemplateSegment {
    pub(crate) const fn new(parts: Vec<TemplatePart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Returns `true` if the segment holds exactly one part.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

impl fmt::Display for TemplateSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// A compiled route template.
///
/// Immutable once built; wrap it in an `Arc` to share it between a matcher,
/// a binder, and any number of threads.
///
/// # Examples
///
/// ```
/// use waymark_routing::template::ParsedTemplate;
///
/// let template = ParsedTemplate::parse("{controller}/{action}/{id?}").unwrap();
/// assert_eq!(template.segments().len(), 3);
/// assert_eq!(template.parameters().len(), 3);
/// assert!(template.parameter("ID").unwrap().is_optional);
/// assert_eq!(template.to_string(), "{controller}/{action}/{id?}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedTemplate {
    text: String,
    segments: Vec<TemplateSegment>,
    parameters: Vec<TemplateParameter>,
}

impl ParsedTemplate {
    pub(crate) fn new(text: impl Into<String>, segments: Vec<TemplateSegment>) -> Self {
        let parameters = segments
            .iter()
            .flat_map(TemplateSegment::parts)
            .filter_map(TemplatePart::as_parameter)
            .cloned()
            .collect();
        Self {
            text: text.into(),
            segments,
            parameters,
        }
    }

    /// Parses a template string. Same as [`parse`].
    pub fn parse(template: &str) -> Result<Self, ParseError> {
        parser::parse(template)
    }

    /// The template text this was parsed from.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Every parameter, in the order it appears in the template.
    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }

    /// Looks up a parameter by name, ignoring case.
    pub fn parameter(&self, name: &str) -> Option<&TemplateParameter> {
        self.parameters
            .iter()
            .find(|p| eq_ignore_case(&p.name, name))
    }

    pub fn has_catch_all(&self) -> bool {
        self.parameters.iter().any(|p| p.is_catch_all)
    }
}

/// Renders the template back from its parts, re-escaping literal braces.
impl fmt::Display for ParsedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ParsedTemplate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_are_collected_in_order() {
        let template = ParsedTemplate::new(
            "a{x}b/{y}",
            vec![
                TemplateSegment::new(vec![
                    TemplatePart::literal("a"),
                    TemplatePart::parameter("x", false, false),
                    TemplatePart::literal("b"),
                ]),
                TemplateSegment::new(vec![TemplatePart::parameter("y", false, true)]),
            ],
        );
        let names: Vec<_> = template.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(!template.has_catch_all());
    }

    #[test]
    fn test_parameter_lookup_ignores_case() {
        let template: ParsedTemplate = "{Ärger}/{id}".parse().unwrap();
        assert_eq!(template.parameter("ÄRGER").map(|p| p.name.as_str()), Some("Ärger"));
        assert!(template.parameter("ID").is_some());
        assert!(template.parameter("arger").is_none());
    }

    #[test]
    fn test_display_escapes_braces() {
        let template = ParsedTemplate::new(
            "{{x}}/{*rest}",
            vec![
                TemplateSegment::new(vec![TemplatePart::literal("{x}")]),
                TemplateSegment::new(vec![TemplatePart::parameter("rest", true, false)]),
            ],
        );
        assert_eq!(template.to_string(), "{{x}}/{*rest}");
        assert!(template.has_catch_all());
    }

    #[test]
    fn test_part_accessors() {
        let lit = TemplatePart::literal(".");
        assert!(lit.is_literal());
        assert_eq!(lit.literal_text(), Some("."));
        assert!(!lit.is_optional_separator());
        assert!(lit.as_parameter().is_none());

        let param = TemplatePart::parameter("id", false, true);
        assert!(param.is_parameter());
        assert!(param.is_optional());
        assert!(!param.is_catch_all());
        assert_eq!(param.as_parameter().map(|p| p.name.as_str()), Some("id"));
    }

    #[test]
    fn test_segment_is_simple() {
        assert!(TemplateSegment::new(vec![TemplatePart::literal("a")]).is_simple());
        assert!(!TemplateSegment::new(vec![
            TemplatePart::literal("a"),
            TemplatePart::parameter("b", false, false)
        ])
        .is_simple());
    }

    #[test]
    fn test_parsed_template_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParsedTemplate>();
    }
}
