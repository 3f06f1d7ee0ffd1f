//! Error-location paths.
//!
//! A [`Path`] is the ordered sequence of field names, array indices and map
//! keys locating where in a nested structure a validation failure occurred.
//! An empty path means the error is global (schema-level).

use smallvec::SmallVec;
use std::fmt;

/// One step into a nested structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Map/field access by name.
    Field(String),
    /// Array or tuple element access by position.
    Index(usize),
    /// A typed-map *key* (as opposed to the value stored under it).
    ///
    /// Rendered as `key(<name>)` so key failures are distinguishable from
    /// failures in the value stored under the same name.
    MapKey(String),
}

impl Segment {
    /// Creates a field segment.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Creates an index segment.
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    /// Creates a map-key segment.
    pub fn map_key(name: impl Into<String>) -> Self {
        Self::MapKey(name.into())
    }

    /// Renders the segment the way it appears in formatted paths.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Field(name) => name.clone(),
            Self::Index(index) => index.to_string(),
            Self::MapKey(name) => format!("key({name})"),
        }
    }

    /// Parses a rendered segment back into its structured form.
    ///
    /// Inverse of [`Segment::render`]: all-digit text becomes an index,
    /// `key(<name>)` becomes a map key, anything else a field name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return Self::Index(index);
            }
        }
        if let Some(inner) = text.strip_prefix("key(").and_then(|t| t.strip_suffix(')')) {
            return Self::MapKey(inner.to_owned());
        }
        Self::Field(text.to_owned())
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_owned())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// An ordered sequence of [`Segment`]s.
///
/// Paths are small (a handful of segments for realistic nesting), so the
/// segment storage is inline up to four entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: SmallVec<[Segment; 4]>,
}

impl Path {
    /// The empty (root/global) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A path holding a single segment.
    ///
    /// Bare scalar paths normalize into a one-segment sequence through this.
    pub fn single(segment: impl Into<Segment>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns true if this path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    #[must_use = "child() returns a new path, it does not mutate self"]
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Returns a new path with `prefix`'s segments prepended.
    #[must_use]
    pub fn prefixed(&self, prefix: &Path) -> Self {
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Drops the first segment, if any. Used by the one-off facade to strip
    /// its synthetic field name back out of error paths.
    #[must_use]
    pub fn without_first(&self) -> Self {
        Self {
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }

    /// First segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Iterates the segments in order.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Renders the path with the given separator, e.g. `user.addresses.0`.
    #[must_use]
    pub fn render(&self, separator: &str) -> String {
        self.segments
            .iter()
            .map(Segment::render)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render("."))
    }
}

impl<S: Into<Segment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Segment> for Path {
    fn from(segment: Segment) -> Self {
        Self::single(segment)
    }
}

impl From<&str> for Path {
    fn from(name: &str) -> Self {
        Self::single(name)
    }
}

impl From<String> for Path {
    fn from(name: String) -> Self {
        Self::single(name)
    }
}

impl From<usize> for Path {
    fn from(index: usize) -> Self {
        Self::single(index)
    }
}
