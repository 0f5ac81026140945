//! The URI building state machine and URL escaping.
//!
//! [`UriBuildingContext`] holds two pieces of output: text that is committed
//! to the URI, and text that is buffered because it only repeats default
//! values and may turn out to be unnecessary. Each has its own
//! [`SegmentState`]. Buffered text is flushed into the URI as soon as
//! something that must appear is accepted after it, and is dropped if the
//! template ends first.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

/// Where the writer is relative to the current segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentState {
    /// Nothing has been written for the current segment yet.
    #[default]
    Beginning,
    /// Part of the current segment has been written.
    Inside,
}

/// Output state for rendering one URI.
///
/// ```
/// use waymark_routing::binder::uri::UriBuildingContext;
///
/// let mut context = UriBuildingContext::new();
/// assert!(context.accept("Products"));
/// context.end_segment();
/// assert!(context.buffer("Index"));
/// context.end_segment();
/// assert_eq!(context.uri(), "Products");
///
/// assert!(context.accept("5"));
/// assert_eq!(context.uri(), "Products/Index/5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UriBuildingContext {
    uri: String,
    buffer: String,
    uri_state: SegmentState,
    buffer_state: SegmentState,
    has_empty_segment: bool,
    last_value_offset: Option<usize>,
}

impl UriBuildingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn uri_state(&self) -> SegmentState {
        self.uri_state
    }

    pub const fn buffer_state(&self) -> SegmentState {
        self.buffer_state
    }

    pub const fn has_empty_segment(&self) -> bool {
        self.has_empty_segment
    }

    /// The committed text, unescaped.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Commits `value` to the URI, flushing any buffered text first.
    ///
    /// An empty value is only allowed at the start of a segment, where it
    /// marks the segment as empty; nothing may be written after that.
    pub fn accept(&mut self, value: &str) -> bool {
        if value.is_empty() {
            if self.uri_state == SegmentState::Inside || self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }

        self.uri.push_str(&self.buffer);
        self.buffer.clear();

        if self.uri_state == SegmentState::Beginning
            && self.buffer_state == SegmentState::Beginning
            && !self.uri.is_empty()
        {
            self.uri.push('/');
        }

        self.uri_state = SegmentState::Inside;
        self.buffer_state = SegmentState::Inside;
        self.last_value_offset = Some(self.uri.len());
        self.uri.push_str(value);
        true
    }

    /// Holds `value` back until something after it is accepted.
    pub fn buffer(&mut self, value: &str) -> bool {
        if value.is_empty() {
            if self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }

        // Part of this segment is already committed, so the rest must be too.
        if self.uri_state == SegmentState::Inside {
            return self.accept(value);
        }

        if self.uri_state == SegmentState::Beginning && self.buffer_state == SegmentState::Beginning {
            if !self.uri.is_empty() || !self.buffer.is_empty() {
                self.buffer.push('/');
            }
            self.buffer_state = SegmentState::Inside;
        }

        self.buffer.push_str(value);
        true
    }

    /// Retracts the most recently accepted value.
    pub fn remove(&mut self) {
        if let Some(offset) = self.last_value_offset.take() {
            self.uri.truncate(offset);
        }
    }

    pub fn end_segment(&mut self) {
        self.uri_state = SegmentState::Beginning;
        self.buffer_state = SegmentState::Beginning;
    }

    /// Consumes the context, returning the committed text. Anything still
    /// buffered is dropped.
    pub fn into_uri(self) -> String {
        self.uri
    }
}

/// Characters escaped in a path on the general pass: everything outside the
/// unreserved and reserved URI characters.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Reserved characters escaped on the second pass so path text cannot be
/// mistaken for a query string, fragment or parameter.
const PATH_RESERVED: &AsciiSet = &CONTROLS
    .add(b'#')
    .add(b';')
    .add(b'?')
    .add(b':')
    .add(b'@')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'$')
    .add(b',');

/// Characters escaped in query keys and values: everything but `A-Z a-z 0-9 - _ . ~`.
const QUERY_DATA: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escapes a generated path. `/` is left alone.
///
/// ```
/// use waymark_routing::binder::uri::encode_path;
///
/// assert_eq!(encode_path("bl%og/he llo"), "bl%25og/he%20llo");
/// assert_eq!(encode_path("a?b#c"), "a%3Fb%23c");
/// ```
pub fn encode_path(path: &str) -> String {
    let escaped = utf8_percent_encode(path, PATH).to_string();
    utf8_percent_encode(&escaped, PATH_RESERVED).to_string()
}

/// Escapes a query string key or value.
pub fn encode_query_data(data: &str) -> String {
    utf8_percent_encode(data, QUERY_DATA).to_string()
}
