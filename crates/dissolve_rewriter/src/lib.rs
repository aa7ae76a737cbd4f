//! The Call-site Rewriter (`spec.md` §4.4): walks a parsed module, finds
//! every call, attribute access, or instantiation whose target resolves to
//! a known `ReplaceInfo`, and produces the `Fix`es that splice the
//! substituted template back into the source.

mod args;
mod binding;
mod magic;
mod rewriter;
mod substitute;
mod types;

pub use args::{bind_call_arguments, BoundArg, BoundArguments};
pub use binding::{import_bindings, ShadowTimeline};
pub use magic::dunder_for_builtin;
pub use rewriter::{rewrite_module, RewriteOutcome};
pub use substitute::{counts_free_references, substitute};
pub use types::{AppliedReplacement, BindingError, FileState, RewriteError, SkippedSite};

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dissolve_collector::collect_source;
    use dissolve_diagnostics::apply_fixes;
    use ruff_source_file::Locator;

    use super::*;

    fn rewrite(source: &str) -> (String, Vec<AppliedReplacement>, Vec<SkippedSite>) {
        let path = Path::new("pkg.py");
        let collection = collect_source(source, "pkg", path).unwrap();
        let parsed = ruff_python_parser::parse_module(source).unwrap();
        let outcome = rewrite_module(parsed.syntax(), source, path, "pkg", &collection, None);
        let locator = Locator::new(source);
        let applied = apply_fixes(outcome.fixes.iter(), &locator);
        (applied.code, outcome.applied, outcome.skipped)
    }

    #[test]
    fn rewrites_free_function_rename() {
        let source = "@replace_me(since=\"0.1.0\")\ndef inc(x):\n    return x + 1\n\nresult = inc(x=3)\n";
        let (code, applied, skipped) = rewrite(source);
        assert!(code.contains("result = 3 + 1\n"));
        assert_eq!(applied.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn rewrites_free_function_call_with_positional_argument() {
        let source = "@replace_me(since=\"0.1.0\")\ndef inc(x):\n    return x + 1\n\nresult = inc(3)\n";
        let (code, _, _) = rewrite(source);
        assert!(code.contains("result = 3 + 1\n"));
    }

    #[test]
    fn leaves_unrelated_source_byte_identical_when_nothing_applies() {
        let source = "def plain(x):\n    return x\n\nresult = plain(3)\n";
        let (code, applied, _) = rewrite(source);
        assert_eq!(code, source);
        assert!(applied.is_empty());
    }

    #[test]
    fn shadowed_import_is_left_unchanged() {
        let source = "from m import inc\ndef inc(x):\n    return x\nresult = inc(3)\n";
        let (code, applied, _) = rewrite(source);
        assert_eq!(code, source);
        assert!(applied.is_empty());
    }

    #[test]
    fn recursive_template_is_never_applied() {
        let source = "@replace_me\ndef old(n):\n    return old(n - 1)\n\nresult = old(3)\n";
        let (code, applied, _) = rewrite(source);
        assert_eq!(code, source);
        assert!(applied.is_empty());
    }

    #[test]
    fn module_attribute_use_site_is_substituted() {
        let source = "OLD_URL = replace_me(\"https://x/v2\")\nu = OLD_URL\n";
        let (code, applied, _) = rewrite(source);
        assert!(code.contains("u = \"https://x/v2\"\n"));
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn unknown_keyword_argument_is_skipped_not_applied() {
        let source = "@replace_me\ndef old(x):\n    return x\n\nresult = old(z=3)\n";
        let (code, applied, skipped) = rewrite(source);
        assert_eq!(code, source);
        assert!(applied.is_empty());
        assert_eq!(skipped.len(), 1);
    }
}
