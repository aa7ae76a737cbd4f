use ruff_text_size::{Ranged, TextSize};

use crate::edit::Edit;

/// Whether a group of related fixes must be applied atomically with respect
/// to other fixes in the same file.
///
/// The Rewriter never needs cross-fix isolation groups the way a linter's
/// overlapping auto-fixes do (`spec.md` §4.4 only ever produces one `Fix`
/// per call site, and call sites don't overlap), but the type is kept so
/// `apply_fixes` has the same overlap-skipping discipline the teacher's
/// `autofix::mod::apply_fixes` has, and so a future mode (e.g. a combined
/// migrate+cleanup pass) can reuse it without changing the application
/// engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IsolationLevel {
    /// This fix may be applied alongside any other fix.
    None,
    /// This fix may not be applied alongside any other fix in the same group.
    Group(u32),
}

/// One or more [`Edit`]s that together realize a single applied replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    edits: Vec<Edit>,
    isolation: IsolationLevel,
}

impl Fix {
    pub fn single_edit(edit: Edit) -> Self {
        Self {
            edits: vec![edit],
            isolation: IsolationLevel::None,
        }
    }

    pub fn edits(edits: Vec<Edit>) -> Self {
        debug_assert!(!edits.is_empty(), "a Fix must contain at least one Edit");
        Self {
            edits,
            isolation: IsolationLevel::None,
        }
    }

    #[must_use]
    pub fn isolated(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn as_edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub fn min_start(&self) -> Option<TextSize> {
        self.edits.iter().map(Ranged::start).min()
    }
}
