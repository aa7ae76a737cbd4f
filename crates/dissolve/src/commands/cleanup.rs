use anyhow::{Context, Result};
use dissolve_collector::{collect_source, ReplaceInfo};
use dissolve_diagnostics::{apply_fixes, Edit, Fix};
use ruff_source_file::Locator;

use crate::args::{CleanupArgs, GlobalArgs};
use crate::discover::discover_files;
use crate::module_name::module_name_for;
use crate::pipeline::write_atomically;
use crate::printer::summary_line;
use crate::version::Version;
use crate::ExitStatus;

/// *cleanup*: `spec.md` §4.5. Deletes the whole definition of every
/// deprecated construct whose deprecation window has elapsed, reusing the
/// Marker Collector's output rather than re-walking the tree.
pub fn run(cmd: &CleanupArgs, _globals: &GlobalArgs) -> Result<ExitStatus> {
    let files = discover_files(&cmd.paths);
    let before = cmd.before.as_deref().map(Version::parse);
    let current_version = cmd.current_version.as_deref().map(Version::parse);

    let mut any_changed = false;
    let mut any_failed = false;

    for path in &files {
        let source_text = match std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("error: {err}");
                any_failed = true;
                continue;
            }
        };

        let module_name = module_name_for(path);
        let collection = match collect_source(&source_text, &module_name, path) {
            Ok(collection) => collection,
            Err(err) => {
                eprintln!("error: {err}");
                any_failed = true;
                continue;
            }
        };

        let fixes: Vec<Fix> = collection
            .replacements
            .values()
            .filter(|info| info.defined_in == *path)
            .filter(|info| is_eligible(info, cmd.all, before.as_ref(), current_version.as_ref()))
            .map(|info| Fix::single_edit(Edit::range_deletion(info.definition_range)))
            .collect();

        if fixes.is_empty() {
            continue;
        }

        let locator = Locator::new(&source_text);
        let rewritten = apply_fixes(fixes.iter(), &locator).code;
        if rewritten == source_text {
            continue;
        }

        any_changed = true;
        if cmd.check {
            println!("{}", summary_line(path, true));
        } else if cmd.write {
            if let Err(err) = write_atomically(path, &rewritten).with_context(|| format!("writing {}", path.display())) {
                eprintln!("error: {err}");
                any_failed = true;
                continue;
            }
            println!("{}", summary_line(path, true));
        } else {
            print!("{}", crate::printer::render_diff(path, &source_text, &rewritten));
        }
    }

    if any_failed || (cmd.check && any_changed) {
        Ok(ExitStatus::ChangesFoundOrFailed)
    } else {
        Ok(ExitStatus::Success)
    }
}

/// `spec.md` §4.5: "removes entire definitions whose `remove_in <=
/// current_version` ... or whose `since < boundary` ... or
/// unconditionally (`--all`)." `SPEC_FULL.md` §4.2: a `temporary`
/// construct is only removed by `--all`.
fn is_eligible(info: &ReplaceInfo, all: bool, before: Option<&Version>, current_version: Option<&Version>) -> bool {
    if all {
        return true;
    }
    if info.temporary {
        return false;
    }
    if let Some(boundary) = before {
        if info.since.as_deref().is_some_and(|since| Version::parse(since) < *boundary) {
            return true;
        }
    }
    if let Some(current) = current_version {
        if info.remove_in.as_deref().is_some_and(|remove_in| Version::parse(remove_in) <= *current) {
            return true;
        }
    }
    false
}
