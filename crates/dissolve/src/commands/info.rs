use anyhow::Result;

use crate::args::{GlobalArgs, InfoArgs};
use crate::discover::discover_files;
use crate::pipeline::collect;
use crate::printer::{count_line, print_unreplaceable};
use crate::ExitStatus;

/// *info*: `spec.md` §1 "enumerate markers". Lists every deprecated
/// construct the Collector finds in each file, independent of whether any
/// call site actually uses it.
pub fn run(cmd: &InfoArgs, globals: &GlobalArgs) -> Result<ExitStatus> {
    let files = discover_files(&cmd.paths);
    let mut any_failed = false;

    for path in &files {
        let collection = match collect(path, globals.import_depth) {
            Ok(collection) => collection,
            Err(err) => {
                eprintln!("error: {err}");
                any_failed = true;
                continue;
            }
        };

        let mut replacements: Vec<_> = collection
            .replacements
            .values()
            .filter(|info| info.defined_in == *path)
            .collect();
        replacements.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        let mut unreplaceable: Vec<_> = collection
            .unreplaceable
            .values()
            .filter(|construct| construct.defined_in == *path)
            .collect();
        unreplaceable.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        if replacements.is_empty() && unreplaceable.is_empty() {
            continue;
        }

        println!("{}", count_line(path, replacements.len()));
        for info in &replacements {
            let since = info.since.as_deref().unwrap_or("-");
            let remove_in = info.remove_in.as_deref().unwrap_or("-");
            println!(
                "  {} ({}) since={since} remove_in={remove_in}",
                info.qualified_name, info.construct_kind,
            );
            if let Some(message) = &info.message {
                println!("    {message}");
            }
        }
        for construct in &unreplaceable {
            print_unreplaceable(path, construct);
        }
    }

    if any_failed {
        Ok(ExitStatus::ChangesFoundOrFailed)
    } else {
        Ok(ExitStatus::Success)
    }
}
