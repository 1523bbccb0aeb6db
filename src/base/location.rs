//! Source locations for definitions, references and findings.

use std::fmt;

use super::DocId;

/// A line within a document.
///
/// Lines are 1-indexed, as reported by the document parser. Ordering is by
/// document first and line second, which is the order findings are reported in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// The document containing this location
    pub doc: DocId,
    /// 1-indexed line number
    pub line: u32,
}

impl Location {
    /// Create a new location.
    #[inline]
    pub const fn new(doc: DocId, line: u32) -> Self {
        Self { doc, line }
    }

    /// Check whether this location lies within `start..=end` of the same document.
    #[inline]
    pub fn within(self, doc: DocId, start: u32, end: u32) -> bool {
        self.doc == doc && start <= self.line && self.line <= end
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc, self.line)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc, self.line)
    }
}
