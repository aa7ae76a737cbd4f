use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Expand `paths` (files or directories) into the set of Python source
/// files to process (`spec.md` §6: "directories are searched for files
/// with the target language's canonical extension"). Respects
/// `.gitignore`/`.ignore` the way a source-rewriting tool should avoid
/// touching vendored or generated trees, following the same
/// `ignore::WalkBuilder` discipline used elsewhere in this ecosystem for
/// bulk source rewrites.
pub fn discover_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        let walker = WalkBuilder::new(path)
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();
        for entry in walker.filter_map(Result::ok) {
            if entry.file_type().is_some_and(|ft| ft.is_file()) && is_python_source(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_python_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("py")
}
