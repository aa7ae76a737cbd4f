use std::path::Path;
use std::sync::Arc;

use dissolve_collector::{collect_file_with_imports, CollectionResult, ModuleResolver};
use dissolve_diagnostics::{apply_fixes, ParseError};
use dissolve_resolver::{DaemonBackend, LspBackend, NullBackend, TypeResolver, TypeResolverBackend};
use dissolve_rewriter::{rewrite_module, AppliedReplacement, RewriteOutcome, SkippedSite};
use ruff_source_file::Locator;

use crate::args::TypeMethod;
use crate::module_name::module_name_for;

/// Search roots for the import resolver, taken from `DISSOLVE_PYTHONPATH`
/// (`spec.md` §6: "a standard means to point the target-language runtime
/// at a module search root, honored by the import resolver"), colon- (or
/// semicolon-, on Windows) separated like `PYTHONPATH`.
pub fn module_resolver() -> ModuleResolver {
    let roots = std::env::var_os("DISSOLVE_PYTHONPATH")
        .map(|value| std::env::split_paths(&value).collect())
        .unwrap_or_default();
    ModuleResolver::new(roots)
}

pub fn build_type_resolver(method: TypeMethod, timeout_secs: u64) -> TypeResolver {
    let backend: Arc<dyn TypeResolverBackend> = match method {
        TypeMethod::Pyright => Arc::new(LspBackend::pyright()),
        TypeMethod::Mypy => Arc::new(DaemonBackend::mypy()),
        TypeMethod::None => Arc::new(NullBackend),
    };
    TypeResolver::new(backend).with_timeout(std::time::Duration::from_secs(timeout_secs))
}

/// Collect one file plus its transitive imports (`spec.md` §4.2 step 6,
/// configurable `import_depth`, default 2 per `SPEC_FULL.md` §6).
pub fn collect(path: &Path, import_depth: Option<usize>) -> Result<CollectionResult, ParseError> {
    let module_name = module_name_for(path);
    let resolver = module_resolver();
    collect_file_with_imports(path, &module_name, &resolver, import_depth.unwrap_or(2))
}

/// The outcome of rewriting one file: the original text, the rewritten
/// text, and the bookkeeping the Driver reports (`spec.md` §4.4
/// "Output"/§4.5).
pub struct FileRewrite {
    pub original: String,
    pub rewritten: String,
    pub applied: Vec<AppliedReplacement>,
    pub skipped: Vec<SkippedSite>,
}

impl FileRewrite {
    pub fn changed(&self) -> bool {
        self.original != self.rewritten
    }
}

/// Run the Call-site Rewriter over `path`'s text against `collection`,
/// producing the would-be rewritten text without touching disk.
pub fn rewrite_file(
    path: &Path,
    source_text: &str,
    collection: &CollectionResult,
    resolver_session: Option<&mut dissolve_resolver::TypeResolverSession>,
) -> Result<RewriteOutcome, ParseError> {
    let module_name = module_name_for(path);
    let parsed = ruff_python_parser::parse_module(source_text).map_err(|err| {
        let offset: usize = err.location().start().into();
        ParseError {
            path: path.to_path_buf(),
            at: dissolve_diagnostics::LineColumn { line: 1, column: 1 },
            message: format!("{err} at byte {offset}"),
        }
    })?;
    Ok(rewrite_module(
        parsed.syntax(),
        source_text,
        path,
        &module_name,
        collection,
        resolver_session,
    ))
}

pub fn apply_outcome(source_text: &str, outcome: &RewriteOutcome) -> String {
    let locator = Locator::new(source_text);
    apply_fixes(outcome.fixes.iter(), &locator).code
}

/// Write-to-temp-then-rename so an interrupted write never corrupts the
/// original (`spec.md` §6: "write-to-temp-then-rename discipline").
pub fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, contents.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
