//! The Marker Collector (`spec.md` §4.2): walks a parsed module, finds
//! every construct carrying a `replace_me(...)` marker, and extracts a
//! [`ReplaceInfo`] — or, when that isn't possible, an
//! [`UnreplaceableConstruct`] recording why.

mod collect;
mod errors;
mod imports;
mod marker;
mod params;
mod template;
mod types;

pub use collect::{collect_file_with_imports, collect_source};
pub use errors::CollectorError;
pub use imports::ModuleResolver;
pub use marker::{MarkerArgs, MARKER_NAME};
pub use types::{
    CollectionResult, ConstructKind, FailureReason, ParameterInfo, ReplaceInfo, Template,
    UnreplaceableConstruct,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_free_function_rename() {
        let source = "@replace_me(since=\"0.1.0\")\ndef inc(x):\n    return x + 1\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let info = result.replacements.get("pkg.inc").expect("inc collected");
        assert_eq!(info.construct_kind, ConstructKind::Function);
        assert_eq!(info.since.as_deref(), Some("0.1.0"));
        assert_eq!(info.parameters.len(), 1);
        assert_eq!(info.parameters[0].name, "x");
        assert_eq!(info.replacement_template.source_text, "x + 1");
    }

    #[test]
    fn rejects_recursive_template() {
        let source = "@replace_me\ndef old(n):\n    return old(n - 1)\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        assert!(result.replacements.get("pkg.old").is_none());
        let failure = result.unreplaceable.get("pkg.old").unwrap();
        assert_eq!(failure.failure_reason, FailureReason::RecursiveCall);
    }

    #[test]
    fn rejects_complex_body() {
        let source = "@replace_me\ndef old(n):\n    x = n + 1\n    return x\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let failure = result.unreplaceable.get("pkg.old").unwrap();
        assert_eq!(failure.failure_reason, FailureReason::ComplexBody);
    }

    #[test]
    fn collects_async_method_with_receiver() {
        let source = "class C:\n    @replace_me\n    async def old(self, url):\n        return await new(url, timeout=30)\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let info = result.replacements.get("pkg.C.old").unwrap();
        assert_eq!(info.construct_kind, ConstructKind::AsyncMethod);
        assert_eq!(info.parameters[0].name, "self");
        assert_eq!(info.declaring_class.as_deref(), Some("pkg.C"));
    }

    #[test]
    fn collects_classmethod_receiver_as_cls() {
        let source = "class C:\n    @classmethod\n    @replace_me\n    def old_cm(cls, d):\n        return cls.new_cm(d.strip())\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let info = result.replacements.get("pkg.C.old_cm").unwrap();
        assert_eq!(info.construct_kind, ConstructKind::ClassMethod);
        assert_eq!(info.parameters[0].name, "cls");
    }

    #[test]
    fn collects_module_attribute() {
        let source = "OLD_URL = replace_me(\"https://x/v2\")\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let info = result.replacements.get("pkg.OLD_URL").unwrap();
        assert_eq!(info.construct_kind, ConstructKind::ModuleAttribute);
        assert_eq!(info.replacement_template.source_text, "\"https://x/v2\"");
    }

    #[test]
    fn dynamic_marker_args_are_rejected() {
        let source = "def reason(): return \"x\"\n@replace_me(since=reason())\ndef old(): return 1\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        let failure = result.unreplaceable.get("pkg.old").unwrap();
        assert_eq!(failure.failure_reason, FailureReason::DynamicMarkerArgs);
    }

    #[test]
    fn records_inheritance_even_without_marker() {
        let source = "class Base:\n    pass\nclass Child(Base):\n    pass\n";
        let result = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap();
        assert_eq!(
            result.inheritance.get("pkg.Child").unwrap(),
            &vec!["pkg.Base".to_string()]
        );
    }

    #[test]
    fn parse_error_is_reported_with_location() {
        let source = "def broken(:\n    pass\n";
        let err = collect_source(source, "pkg", std::path::Path::new("pkg.py")).unwrap_err();
        assert_eq!(err.path, std::path::Path::new("pkg.py"));
        assert!(err.at.line >= 1);
    }
}
