use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use dissolve_diagnostics::Fix;
use rayon::prelude::*;

use crate::args::{GlobalArgs, MigrateArgs};
use crate::discover::discover_files;
use crate::pipeline::{apply_outcome, build_type_resolver, collect, rewrite_file, write_atomically};
use crate::printer::{print_skipped, render_diff, summary_line};
use crate::ExitStatus;

/// *migrate*: `spec.md` §4.5/§6. Rewrites call sites of deprecated
/// constructs to use their replacement, one file at a time, across a
/// `rayon` worker pool sized per `--jobs` (`spec.md` §5).
pub fn run(cmd: &MigrateArgs, globals: &GlobalArgs) -> Result<ExitStatus> {
    let files = discover_files(&cmd.paths);
    if let Some(jobs) = globals.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let resolver = build_type_resolver(cmd.type_method, cmd.timeout);
    let any_changed = AtomicBool::new(false);
    let any_failed = AtomicBool::new(false);

    files
        .par_iter()
        .for_each(|path| {
            let outcome = (|| -> Result<()> {
                let source_text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let collection = collect(path, globals.import_depth)
                    .map_err(|err| anyhow::anyhow!("{err}"))?;
                let mut session = resolver.open_session(path, &source_text);
                let mut outcome = rewrite_file(path, &source_text, &collection, Some(&mut session))
                    .map_err(|err| anyhow::anyhow!("{err}"))?;

                if cmd.interactive && !cmd.check {
                    outcome = prompt_interactively(path, outcome);
                }

                print_skipped(path, &outcome.skipped);
                let rewritten = apply_outcome(&source_text, &outcome);

                if rewritten != source_text {
                    any_changed.store(true, Ordering::Relaxed);
                    if cmd.check {
                        println!("{}", summary_line(path, true));
                    } else if cmd.write {
                        write_atomically(path, &rewritten)
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!("{}", summary_line(path, true));
                    } else {
                        print!("{}", render_diff(path, &source_text, &rewritten));
                    }
                } else if cmd.check {
                    println!("{}", summary_line(path, false));
                }
                Ok(())
            })();

            if let Err(err) = outcome {
                eprintln!("error: {err}");
                any_failed.store(true, Ordering::Relaxed);
            }
        });

    if any_failed.load(Ordering::Relaxed) || (cmd.check && any_changed.load(Ordering::Relaxed)) {
        Ok(ExitStatus::ChangesFoundOrFailed)
    } else {
        Ok(ExitStatus::Success)
    }
}

/// Prompt once per candidate replacement (`spec.md` §6: "--interactive:
/// Prompt per replacement"), dropping declined fixes before reprinting.
fn prompt_interactively(path: &std::path::Path, outcome: dissolve_rewriter::RewriteOutcome) -> dissolve_rewriter::RewriteOutcome {
    let dissolve_rewriter::RewriteOutcome { fixes, applied, skipped } = outcome;
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let mut kept_fixes: Vec<Fix> = Vec::new();
    let mut kept_applied = Vec::new();
    for (fix, replacement) in fixes.into_iter().zip(applied.into_iter()) {
        println!(
            "{}:{}:{}: replace `{}` with `{}`? [Y/n] ",
            path.display(),
            replacement.line,
            replacement.column,
            replacement.old_text,
            replacement.new_text,
        );
        let accept = match lines.next() {
            Some(Ok(line)) => !line.trim().eq_ignore_ascii_case("n"),
            _ => true,
        };
        if accept {
            kept_fixes.push(fix);
            kept_applied.push(replacement);
        }
    }

    dissolve_rewriter::RewriteOutcome {
        fixes: kept_fixes,
        applied: kept_applied,
        skipped,
    }
}
