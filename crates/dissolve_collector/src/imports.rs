use std::path::{Path, PathBuf};

/// Resolves a dotted module name to a file path the way the target
/// language's import machinery does (`spec.md` §4.2 step 6): the package's
/// `__init__` file first, then a sibling `<mod>.py` file, then each of the
/// caller-supplied search roots in order.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    search_roots: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self { search_roots }
    }

    /// Resolve `module` (e.g. `"pkg.mod"`) to a source file, searching
    /// relative to `relative_to` (the importing file's directory) before
    /// falling back to the configured search roots.
    pub fn resolve(&self, module: &str, relative_to: &Path) -> Option<PathBuf> {
        let segments: Vec<&str> = module.split('.').collect();

        let relative_to = relative_to.parent().unwrap_or(relative_to);
        self.resolve_under(relative_to, &segments)
            .or_else(|| self.search_roots.iter().find_map(|root| self.resolve_under(root, &segments)))
    }

    fn resolve_under(&self, base: &Path, segments: &[&str]) -> Option<PathBuf> {
        let mut dir = base.to_path_buf();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            dir.push(segment);
        }
        let last = segments.last()?;

        let package_init = dir.join(last).join("__init__.py");
        if package_init.is_file() {
            return Some(package_init);
        }

        let sibling = dir.join(format!("{last}.py"));
        if sibling.is_file() {
            return Some(sibling);
        }

        None
    }
}
