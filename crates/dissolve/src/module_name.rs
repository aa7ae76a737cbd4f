use std::path::Path;

/// Derive the dotted module name `dissolve_collector::collect_source` wants
/// (`spec.md` §3: qualified names are `module.name`) from a file's path, the
/// way the target language's import machinery names a module: walk up
/// through ancestor directories as long as they carry an `__init__.py`,
/// then join the package names and the file stem with dots.
pub fn module_name_for(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("module");
    let mut segments = vec![stem.to_string()];

    if stem == "__init__" {
        segments.clear();
    }

    let mut dir = path.parent();
    while let Some(current) = dir {
        if !current.join("__init__.py").is_file() {
            break;
        }
        let Some(name) = current.file_name().and_then(|s| s.to_str()) else {
            break;
        };
        segments.insert(0, name.to_string());
        dir = current.parent();
    }

    if segments.is_empty() {
        "module".to_string()
    } else {
        segments.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_file_uses_its_stem() {
        assert_eq!(module_name_for(Path::new("pkg.py")), "pkg");
    }

    #[test]
    fn package_init_uses_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("__init__.py"), "").unwrap();
        let pkg_dir = dir.path().join("mypkg");
        std::fs::create_dir(&pkg_dir).unwrap();
        std::fs::write(pkg_dir.join("__init__.py"), "").unwrap();
        assert_eq!(module_name_for(&pkg_dir.join("__init__.py")), "mypkg");
    }

    #[test]
    fn submodule_under_package_is_dotted() {
        let dir = tempfile::tempdir().unwrap();
        let pkg_dir = dir.path().join("mypkg");
        std::fs::create_dir(&pkg_dir).unwrap();
        std::fs::write(pkg_dir.join("__init__.py"), "").unwrap();
        std::fs::write(pkg_dir.join("mod.py"), "").unwrap();
        assert_eq!(module_name_for(&pkg_dir.join("mod.py")), "mypkg.mod");
    }
}
