use dissolve_diagnostics::ParseError;

/// Errors the Collector can report (`spec.md` §7). `ParseError` aborts the
/// file it occurred in; every other variant is recorded against the
/// offending construct in `CollectionResult::unreplaceable` and does not
/// stop collection of the rest of the file.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
