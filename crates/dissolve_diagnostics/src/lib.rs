//! The Source Model's textual-edit machinery (`spec.md` §4.1).
//!
//! Parsing and the concrete node tree itself are not reimplemented here —
//! they're `ruff_python_ast`/`ruff_python_parser`, which already carry a
//! [`ruff_text_size::TextRange`] on every node and so already give us
//! stable positions and parent/sibling navigation. What this crate adds is
//! the half of the Source Model spec.md doesn't get for free from an AST:
//! a way to describe "replace this subexpression" as a pure text splice and
//! reprint a file with those splices applied, exactly preserving every byte
//! outside the touched ranges.

mod apply;
mod edit;
mod fix;
mod location;

pub use apply::{apply_fixes, reprint_unchanged, ApplyResult};
pub use edit::Edit;
pub use fix::{Fix, IsolationLevel};
pub use location::{format_location, LineColumn, ParseError};
