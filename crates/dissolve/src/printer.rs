use std::path::Path;

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use dissolve_collector::{ConstructKind, UnreplaceableConstruct};
use dissolve_rewriter::{AppliedReplacement, SkippedSite};

/// Render a unified diff between `original` and `modified`, colored the way
/// a diff-capable CLI renders one (`spec.md` §6: "print the diff ... to
/// stdout"), following the `---`/`+++`/context-line convention used for
/// textual diffs elsewhere in this ecosystem.
pub fn render_diff(path: &Path, original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut out = String::new();
    out.push_str(&format!("{}\n", format!("--- a/{}", path.display()).red()));
    out.push_str(&format!("{}\n", format!("+++ b/{}", path.display()).green()));

    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_changes(&op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                let line = format!("{sign}{change}", change = change.value());
                out.push_str(&match change.tag() {
                    ChangeTag::Delete => line.red().to_string(),
                    ChangeTag::Insert => line.green().to_string(),
                    ChangeTag::Equal => line,
                });
            }
        }
    }
    out
}

/// `spec.md` §7: "Summary lines are `Modified: PATH`, `Unchanged: PATH`".
pub fn summary_line(path: &Path, changed: bool) -> String {
    if changed {
        format!("{} {}", "Modified:".yellow().bold(), path.display())
    } else {
        format!("{} {}", "Unchanged:".dimmed(), path.display())
    }
}

/// `spec.md` §7: "`PATH: N @replace_me function(s) can be replaced`",
/// used by `check` and `info`.
pub fn count_line(path: &Path, count: usize) -> String {
    format!("{}: {count} @replace_me function(s) can be replaced", path.display())
}

pub fn print_applied(path: &Path, applied: &[AppliedReplacement]) {
    for replacement in applied {
        println!(
            "{}:{}:{}: {} -> {}",
            path.display(),
            replacement.line,
            replacement.column,
            replacement.old_text.dimmed(),
            replacement.new_text.green(),
        );
    }
}

pub fn print_skipped(path: &Path, skipped: &[SkippedSite]) {
    for site in skipped {
        let name = site.qualified_name.as_deref().unwrap_or("<unknown>");
        eprintln!(
            "{} {}:{}:{}: {name}: {}",
            "warning:".yellow().bold(),
            path.display(),
            site.line,
            site.column,
            site.reason,
        );
    }
}

pub fn print_unreplaceable(path: &Path, construct: &UnreplaceableConstruct) {
    let kind = match construct.construct_kind {
        ConstructKind::Function | ConstructKind::AsyncFunction => "function",
        ConstructKind::InstanceMethod
        | ConstructKind::AsyncMethod
        | ConstructKind::ClassMethod
        | ConstructKind::StaticMethod => "method",
        ConstructKind::Property => "property",
        ConstructKind::Class => "class",
        ConstructKind::ClassAttribute | ConstructKind::ModuleAttribute => "attribute",
    };
    eprintln!(
        "{} {}: {kind} `{}` cannot be replaced ({}): {}",
        "warning:".yellow().bold(),
        path.display(),
        construct.qualified_name,
        construct.failure_reason,
        construct.message,
    );
}
