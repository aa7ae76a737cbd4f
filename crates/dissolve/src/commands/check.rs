use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::args::{CheckArgs, GlobalArgs};
use crate::discover::discover_files;
use crate::pipeline::{build_type_resolver, collect, rewrite_file};
use crate::printer::{print_skipped, print_unreplaceable};
use crate::ExitStatus;

/// *check*: `spec.md` §1 "validate that every marker can be processed".
/// Unlike `migrate --check` (which asks "would this file's call sites
/// change"), this mode asks "can every marker in this file actually be
/// turned into a replacement" — it runs the Collector and the Rewriter
/// over every file without ever writing, and reports every
/// `UnreplaceableConstruct` and skipped call site as a failure.
pub fn run(cmd: &CheckArgs, globals: &GlobalArgs) -> Result<ExitStatus> {
    let files = discover_files(&cmd.paths);
    if let Some(jobs) = globals.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let resolver = build_type_resolver(cmd.type_method, cmd.timeout);
    let any_unprocessable = AtomicBool::new(false);
    let any_failed = AtomicBool::new(false);

    files.par_iter().for_each(|path| {
        let outcome = (|| -> Result<()> {
            let source_text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let collection =
                collect(path, globals.import_depth).map_err(|err| anyhow::anyhow!("{err}"))?;

            for construct in collection.unreplaceable.values() {
                if construct.defined_in == *path {
                    print_unreplaceable(path, construct);
                    any_unprocessable.store(true, Ordering::Relaxed);
                }
            }

            let mut session = resolver.open_session(path, &source_text);
            let outcome = rewrite_file(path, &source_text, &collection, Some(&mut session))
                .map_err(|err| anyhow::anyhow!("{err}"))?;

            if !outcome.skipped.is_empty() {
                print_skipped(path, &outcome.skipped);
                any_unprocessable.store(true, Ordering::Relaxed);
            }

            Ok(())
        })();

        if let Err(err) = outcome {
            eprintln!("error: {err}");
            any_failed.store(true, Ordering::Relaxed);
        }
    });

    if any_failed.load(Ordering::Relaxed) || any_unprocessable.load(Ordering::Relaxed) {
        Ok(ExitStatus::ChangesFoundOrFailed)
    } else {
        Ok(ExitStatus::Success)
    }
}
