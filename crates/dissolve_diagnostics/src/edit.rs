use ruff_text_size::{Ranged, TextRange, TextSize};

/// A single textual splice: replace (or delete, or insert at) a byte range
/// of the original source with new content.
///
/// `Edit` is the unit the Source Model (`spec.md` §4.1) uses to realize
/// "replacement of a subexpression by another subexpression of the same
/// syntactic category": the Rewriter never reprints a whole node, it only
/// describes the bytes that changed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edit {
    /// The new content to insert, or `None` for a pure deletion.
    content: Option<Box<str>>,
    range: TextRange,
}

impl Edit {
    /// Replace the text in `range` with `content`.
    pub fn range_replacement(content: String, range: TextRange) -> Self {
        Self {
            content: Some(content.into_boxed_str()),
            range,
        }
    }

    /// Delete the text in `range`.
    pub fn range_deletion(range: TextRange) -> Self {
        Self {
            content: None,
            range,
        }
    }

    /// Delete the text between `start` and `end`.
    pub fn deletion(start: TextSize, end: TextSize) -> Self {
        Self::range_deletion(TextRange::new(start, end))
    }

    /// Insert `content` at `at`, without touching any existing bytes.
    pub fn insertion(content: String, at: TextSize) -> Self {
        Self::range_replacement(content, TextRange::empty(at))
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_deletion(&self) -> bool {
        self.content.is_none()
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty() && self.content.is_some()
    }
}

impl Ranged for Edit {
    fn range(&self) -> TextRange {
        self.range
    }
}
