use ruff_source_file::Locator;
use ruff_text_size::{Ranged, TextLen, TextRange, TextSize};

use crate::edit::Edit;
use crate::fix::{Fix, IsolationLevel};

/// The result of splicing a set of [`Fix`]es into a source file.
#[derive(Debug)]
pub struct ApplyResult {
    /// The rewritten source text.
    pub code: String,
    /// How many of the given fixes were actually applied (some may be
    /// skipped due to overlap with an earlier one).
    pub applied: usize,
    /// Fixes that were skipped because their range overlapped an
    /// already-applied edit, in the order they were skipped.
    pub skipped: usize,
}

/// Splice `fixes` into `locator`'s text, in ascending start-offset order.
///
/// This is the Source Model's `reprint` operation for a file with one or
/// more applied replacements (`spec.md` §4.1): unmodified regions are
/// copied byte-for-byte from the locator, and each [`Edit`] replaces
/// exactly its own range. Fixes are expected to already be in left-to-right
/// source order (`spec.md` §5, "within a file, replacements are applied in
/// source order"); this function additionally defends against overlaps by
/// skipping any fix whose start precedes the end of the last applied edit,
/// the same best-effort policy the teacher's `autofix::mod::apply_fixes`
/// uses.
pub fn apply_fixes<'a>(fixes: impl Iterator<Item = &'a Fix>, locator: &Locator<'_>) -> ApplyResult {
    let mut output = String::with_capacity(locator.len());
    let mut last_pos: Option<TextSize> = None;
    let mut isolated = std::collections::HashSet::new();
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for fix in fixes {
        if last_pos.is_some_and(|last_pos| {
            fix.min_start()
                .is_some_and(|fix_start| last_pos > fix_start)
        }) {
            skipped += 1;
            continue;
        }

        if let IsolationLevel::Group(id) = fix.isolation() {
            if !isolated.insert(id) {
                skipped += 1;
                continue;
            }
        }

        for edit in sorted_by_start(fix.as_edits()) {
            let slice = locator.slice(TextRange::new(last_pos.unwrap_or_default(), edit.start()));
            output.push_str(slice);
            output.push_str(edit.content().unwrap_or_default());
            last_pos = Some(edit.end());
        }
        applied += 1;
    }

    output.push_str(locator.after(last_pos.unwrap_or_default()));

    ApplyResult {
        code: output,
        applied,
        skipped,
    }
}

fn sorted_by_start(edits: &[Edit]) -> Vec<&Edit> {
    let mut edits: Vec<&Edit> = edits.iter().collect();
    edits.sort_by_key(Ranged::start);
    edits
}

/// Byte-for-byte reprint, guaranteed whenever `fixes` is empty
/// (`spec.md` §4.1's `reprint(CST) -> text` contract).
pub fn reprint_unchanged(locator: &Locator<'_>) -> String {
    locator.slice(TextRange::up_to(locator.contents().text_len()))
        .to_string()
}
