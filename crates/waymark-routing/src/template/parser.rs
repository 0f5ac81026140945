//! Route template parser.
//!
//! Templates are scanned byte by byte with a small cursor. Every structural
//! character (`/`, `{`, `}`, `?`, `*`) is ASCII, so the cursor only ever
//! stops on a char boundary and captured slices are always valid `&str`s.
//!
//! # Syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `text` | Literal, matched case-insensitively |
//! | `{name}` | Parameter |
//! | `{name?}` | Optional parameter |
//! | `{*name}` | Catch-all parameter, last segment only |
//! | `{{` / `}}` | Literal `{` / `}` |

use thiserror::Error;

use waymark_core::WaymarkError;

use super::{ParsedTemplate, TemplatePart, TemplateSegment};
use crate::value::eq_ignore_case;

/// What went wrong while parsing a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The template starts with `/` or `~`.
    InvalidTemplate,
    /// A `{` without a matching `}`, or a stray `}`.
    MismatchedParameter,
    /// Two `/` in a row.
    ConsecutiveSeparators,
    /// A catch-all parameter that is not the last part of the last segment.
    CatchAllMustBeLast,
    /// A parameter marked both `*` and `?`.
    CatchAllCannotBeOptional,
    /// A catch-all parameter sharing its segment with other parts.
    CannotHaveCatchAllInMultiSegment,
    /// An optional parameter in a multi-part segment that is not the last
    /// part, or is not preceded by a single `.`.
    CannotHaveOptionalParameterInMultiSegment,
    /// Two parameters with no literal between them.
    CannotHaveConsecutiveParameters,
    /// An empty parameter name, or one containing `/`, `{`, `}`, `?` or `*`.
    InvalidParameterName,
    /// The same parameter name used twice, ignoring case.
    RepeatedParameter,
    /// A literal containing `?`.
    InvalidLiteral,
}

/// A template parse failure: the kind plus the offending fragment of the
/// template (a parameter name, a literal, a segment, or the whole template).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.kind, .fragment))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub fragment: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, fragment: impl Into<String>) -> Self {
        Self {
            kind,
            fragment: fragment.into(),
        }
    }
}

impl From<ParseError> for WaymarkError {
    fn from(err: ParseError) -> Self {
        Self::TemplateSyntax(err.to_string())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn describe(kind: &ParseErrorKind, fragment: &str) -> String {
    match kind {
        ParseErrorKind::InvalidTemplate => format!(
            "The route template '{fragment}' cannot start with a '/' or '~' character."
        ),
        ParseErrorKind::MismatchedParameter => format!(
            "There is an incomplete parameter in the route template '{fragment}'. \
             Check that each '{{' character has a matching '}}' character."
        ),
        ParseErrorKind::ConsecutiveSeparators => format!(
            "The route template separator character '/' cannot appear consecutively in '{fragment}'. \
             It must be separated by either a parameter or a literal value."
        ),
        ParseErrorKind::CatchAllMustBeLast => format!(
            "A catch-all parameter can only appear as the last segment of the route template '{fragment}'."
        ),
        ParseErrorKind::CatchAllCannotBeOptional => {
            format!("A catch-all parameter cannot be marked optional: '{{{fragment}}}'.")
        }
        ParseErrorKind::CannotHaveCatchAllInMultiSegment => format!(
            "The path segment '{fragment}' contains more than one section, such as a literal \
             section or a parameter, and cannot contain a catch-all parameter."
        ),
        ParseErrorKind::CannotHaveOptionalParameterInMultiSegment => format!(
            "In the path segment '{fragment}' there can only be one optional parameter. The optional \
             parameter must be the last parameter in the segment and must be preceded by one single period (.)."
        ),
        ParseErrorKind::CannotHaveConsecutiveParameters => format!(
            "The path segment '{fragment}' contains two consecutive parameters. \
             They must be separated by a '/' or by a literal string."
        ),
        ParseErrorKind::InvalidParameterName => format!(
            "The route parameter name '{fragment}' is invalid. Route parameter names must be non-empty \
             and cannot contain these characters: '{{', '}}', '/'. The '?' character marks a parameter \
             as optional, and can occur only at the end of the parameter. The '*' character marks a \
             parameter as catch-all, and can occur only at the start of the parameter."
        ),
        ParseErrorKind::RepeatedParameter => format!(
            "The route parameter name '{fragment}' appears more than one time in the route template."
        ),
        ParseErrorKind::InvalidLiteral => format!(
            "The literal section '{fragment}' is invalid. Literal sections cannot contain the '?' character."
        ),
    }
}

/// Parses a route template.
///
/// # Examples
///
/// ```
/// use waymark_routing::template::{parse, ParseErrorKind};
///
/// let template = parse("Sales/{year}-{month}").unwrap();
/// assert_eq!(template.segments()[1].parts().len(), 3);
///
/// let err = parse("{a}//{b}").unwrap_err();
/// assert_eq!(err.kind, ParseErrorKind::ConsecutiveSeparators);
/// ```
pub fn parse(template: &str) -> Result<ParsedTemplate, ParseError> {
    if template.starts_with('/') || template.starts_with('~') {
        return Err(ParseError::new(ParseErrorKind::InvalidTemplate, template));
    }

    let mut parser = TemplateParser::new(template);
    let segments = parser.parse_segments()?;
    validate_catch_all_position(template, &segments)?;

    let parsed = ParsedTemplate::new(template, segments);
    tracing::trace!(
        template,
        segments = parsed.segments().len(),
        parameters = parsed.parameters().len(),
        "Parsed route template"
    );
    Ok(parsed)
}

/// A byte cursor over the template with mark, capture and back-up.
struct Cursor<'a> {
    template: &'a str,
    index: usize,
    mark: usize,
}

impl<'a> Cursor<'a> {
    const fn new(template: &'a str) -> Self {
        Self {
            template,
            index: 0,
            mark: 0,
        }
    }

    fn current(&self) -> Option<u8> {
        self.template.as_bytes().get(self.index).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.template.as_bytes().get(self.index + 1).copied()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn back(&mut self) {
        self.index -= 1;
    }

    fn mark(&mut self) {
        self.mark = self.index;
    }

    fn capture(&self) -> &'a str {
        &self.template[self.mark..self.index]
    }
}

struct TemplateParser<'a> {
    cursor: Cursor<'a>,
    parameter_names: Vec<String>,
}

impl<'a> TemplateParser<'a> {
    const fn new(template: &'a str) -> Self {
        Self {
            cursor: Cursor::new(template),
            parameter_names: Vec::new(),
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.cursor.template)
    }

    fn parse_segments(&mut self) -> Result<Vec<TemplateSegment>, ParseError> {
        let mut segments = Vec::new();
        while let Some(c) = self.cursor.current() {
            // Each segment consumes its own separator, so a '/' here is the
            // second of a pair.
            if c == b'/' {
                return Err(self.error(ParseErrorKind::ConsecutiveSeparators));
            }
            segments.push(self.parse_segment()?);
            if self.cursor.current() == Some(b'/') {
                self.cursor.advance();
            }
        }
        Ok(segments)
    }

    fn parse_segment(&mut self) -> Result<TemplateSegment, ParseError> {
        let start = self.cursor.index;
        let mut parts = Vec::new();
        loop {
            match self.cursor.current() {
                None | Some(b'/') => break,
                Some(b'{') if self.cursor.peek() != Some(b'{') => {
                    parts.push(self.parse_parameter()?);
                }
                Some(_) => parts.push(self.parse_literal()?),
            }
        }

        let text = &self.cursor.template[start..self.cursor.index];
        validate_segment(text, &mut parts)?;
        Ok(TemplateSegment::new(parts))
    }

    fn parse_literal(&mut self) -> Result<TemplatePart, ParseError> {
        self.cursor.mark();
        loop {
            match self.cursor.current() {
                None | Some(b'/') => break,
                Some(b'{') => {
                    if self.cursor.peek() != Some(b'{') {
                        break;
                    }
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(b'}') => {
                    if self.cursor.peek() != Some(b'}') {
                        return Err(self.error(ParseErrorKind::MismatchedParameter));
                    }
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => self.cursor.advance(),
            }
        }

        let text = self.cursor.capture().replace("{{", "{").replace("}}", "}");
        if text.contains('?') {
            return Err(ParseError::new(ParseErrorKind::InvalidLiteral, text));
        }
        Ok(TemplatePart::literal(text))
    }

    fn parse_parameter(&mut self) -> Result<TemplatePart, ParseError> {
        // Step over the opening brace.
        self.cursor.advance();
        self.cursor.mark();
        loop {
            match self.cursor.current() {
                None | Some(b'/') => return Err(self.error(ParseErrorKind::MismatchedParameter)),
                Some(b'}') => {
                    self.cursor.advance();
                    if self.cursor.current() == Some(b'}') {
                        // "}}" stays in the name, which the name check rejects.
                        self.cursor.advance();
                    } else {
                        self.cursor.back();
                        break;
                    }
                }
                Some(_) => self.cursor.advance(),
            }
        }
        let raw = self.cursor.capture();
        self.cursor.advance();

        let mut name = raw;
        let is_catch_all = name.starts_with('*');
        if is_catch_all {
            name = &name[1..];
        }
        let is_optional = name.ends_with('?');
        if is_optional {
            name = &name[..name.len() - 1];
        }

        if is_catch_all && is_optional {
            return Err(ParseError::new(ParseErrorKind::CatchAllCannotBeOptional, raw));
        }
        if !is_valid_parameter_name(name) {
            return Err(ParseError::new(ParseErrorKind::InvalidParameterName, name));
        }
        if self
            .parameter_names
            .iter()
            .any(|seen| eq_ignore_case(seen, name))
        {
            return Err(ParseError::new(ParseErrorKind::RepeatedParameter, name));
        }
        self.parameter_names.push(name.to_string());

        Ok(TemplatePart::parameter(name, is_catch_all, is_optional))
    }
}

fn is_valid_parameter_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '{', '}', '?', '*'])
}

/// Checks the rules for segments with more than one part and flags the
/// optional separator.
fn validate_segment(text: &str, parts: &mut [TemplatePart]) -> Result<(), ParseError> {
    if parts.len() < 2 {
        return Ok(());
    }

    if parts.iter().any(TemplatePart::is_catch_all) {
        return Err(ParseError::new(
            ParseErrorKind::CannotHaveCatchAllInMultiSegment,
            text,
        ));
    }

    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_optional() && (i != last || parts[i - 1].literal_text() != Some(".")) {
            return Err(ParseError::new(
                ParseErrorKind::CannotHaveOptionalParameterInMultiSegment,
                text,
            ));
        }
    }
    if parts[last].is_optional() {
        if let TemplatePart::Literal {
            is_optional_separator,
            ..
        } = &mut parts[last - 1]
        {
            *is_optional_separator = true;
        }
    }

    if parts
        .windows(2)
        .any(|pair| pair[0].is_parameter() && pair[1].is_parameter())
    {
        return Err(ParseError::new(
            ParseErrorKind::CannotHaveConsecutiveParameters,
            text,
        ));
    }

    Ok(())
}

fn validate_catch_all_position(
    template: &str,
    segments: &[TemplateSegment],
) -> Result<(), ParseError> {
    let last_segment = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        let last_part = segment.parts().len().saturating_sub(1);
        for (j, part) in segment.parts().iter().enumerate() {
            if part.is_catch_all() && (i != last_segment || j != last_part) {
                return Err(ParseError::new(ParseErrorKind::CatchAllMustBeLast, template));
            }
        }
    }
    Ok(())
}
