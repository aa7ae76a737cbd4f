use ruff_python_ast::{self as ast, Expr};
use ruff_text_size::{Ranged, TextRange, TextSize};

use dissolve_collector::Template;

use crate::args::BoundArguments;

/// Walk `template.expr`, replacing every free `Name` reference that matches
/// a bound parameter, and return the resulting source text (`spec.md`
/// §4.4: "Template substitution"). Identifiers that are not free — rebound
/// by a `lambda` or comprehension inside the template — are left alone, so
/// `lambda x: f(x)` stays `lambda x: f(x)` rather than capturing an outer
/// substitution for `x` (`spec.md` §4.4 "hygienic", and the Hygiene
/// invariant in `spec.md` §8).
pub fn substitute(template: &Template, bound: &BoundArguments) -> String {
    let mut replacements: Vec<(TextRange, &str)> = Vec::new();
    collect_substitutions(&template.expr, bound, &mut Vec::new(), &mut replacements);
    replacements.sort_by_key(|(range, _)| range.start());

    let base = template.range.start();
    let mut out = String::with_capacity(template.source_text.len());
    let mut cursor = TextSize::from(0);
    for (range, text) in replacements {
        let rel_start = range.start() - base;
        let rel_end = range.end() - base;
        if rel_start < cursor {
            // Overlapping replacement (shouldn't happen for distinct Name
            // nodes); keep the first and skip the rest defensively.
            continue;
        }
        out.push_str(&template.source_text[usize::from(cursor)..usize::from(rel_start)]);
        out.push_str(text);
        cursor = rel_end;
    }
    out.push_str(&template.source_text[usize::from(cursor)..]);
    out
}

/// Does `template`'s source text use its receiver parameter (when one
/// exists) more than once? Used to enforce `spec.md` §4.4's rule for
/// magic-method builtins: "If the template uses the receiver more than
/// once with side effects, the Rewriter refuses the rewrite."
pub fn counts_free_references(template: &Template, name: &str) -> usize {
    let mut count = 0usize;
    let mut bound_stack = Vec::new();
    count_references(&template.expr, name, &mut bound_stack, &mut count);
    count
}

fn count_references(expr: &Expr, name: &str, bound_stack: &mut Vec<Vec<String>>, count: &mut usize) {
    if let Expr::Name(n) = expr {
        if n.id.as_str() == name && !is_rebound(name, bound_stack) {
            *count += 1;
        }
        return;
    }
    walk_with_binders(expr, bound_stack, &mut |e, stack| {
        count_references(e, name, stack, count);
    });
}

fn is_rebound(name: &str, bound_stack: &[Vec<String>]) -> bool {
    bound_stack.iter().any(|scope| scope.iter().any(|n| n == name))
}

fn collect_substitutions<'a>(
    expr: &Expr,
    bound: &'a BoundArguments,
    bound_stack: &mut Vec<Vec<String>>,
    out: &mut Vec<(TextRange, &'a str)>,
) {
    if let Expr::Name(n) = expr {
        let name = n.id.as_str();
        if !is_rebound(name, bound_stack) {
            if let Some(value) = bound.get(name) {
                out.push((expr.range(), value.text.as_str()));
            }
        }
        return;
    }
    walk_with_binders(expr, bound_stack, &mut |e, stack| {
        collect_substitutions(e, bound, stack, out);
    });
}

/// Recurse into `expr`'s subexpressions, pushing/popping the names a
/// `lambda` parameter list or comprehension target introduces so inner
/// visitors can tell a rebound name from a genuinely free one.
fn walk_with_binders(expr: &Expr, bound_stack: &mut Vec<Vec<String>>, visit: &mut impl FnMut(&Expr, &mut Vec<Vec<String>>)) {
    match expr {
        Expr::Lambda(lambda) => {
            let names = lambda.parameters.as_deref().map(lambda_parameter_names).unwrap_or_default();
            bound_stack.push(names);
            visit(&lambda.body, bound_stack);
            bound_stack.pop();
        }
        Expr::ListComp(ast::ExprListComp { elt, generators, .. })
        | Expr::SetComp(ast::ExprSetComp { elt, generators, .. })
        | Expr::Generator(ast::ExprGenerator { elt, generators, .. }) => {
            let names = comprehension_target_names(generators);
            for generator in generators {
                visit(&generator.iter, bound_stack);
                for condition in &generator.ifs {
                    visit(condition, bound_stack);
                }
            }
            bound_stack.push(names);
            visit(elt, bound_stack);
            bound_stack.pop();
        }
        Expr::DictComp(ast::ExprDictComp { key, value, generators, .. }) => {
            let names = comprehension_target_names(generators);
            for generator in generators {
                visit(&generator.iter, bound_stack);
                for condition in &generator.ifs {
                    visit(condition, bound_stack);
                }
            }
            bound_stack.push(names);
            visit(key, bound_stack);
            visit(value, bound_stack);
            bound_stack.pop();
        }
        other => {
            walk_children(other, bound_stack, visit);
        }
    }
}

fn lambda_parameter_names(parameters: &ast::Parameters) -> Vec<String> {
    parameters
        .posonlyargs
        .iter()
        .chain(parameters.args.iter())
        .map(|p| p.parameter.name.as_str().to_string())
        .chain(parameters.vararg.as_ref().map(|v| v.name.as_str().to_string()))
        .chain(parameters.kwonlyargs.iter().map(|p| p.parameter.name.as_str().to_string()))
        .chain(parameters.kwarg.as_ref().map(|k| k.name.as_str().to_string()))
        .collect()
}

fn comprehension_target_names(generators: &[ast::Comprehension]) -> Vec<String> {
    let mut names = Vec::new();
    for generator in generators {
        collect_name_targets(&generator.target, &mut names);
    }
    names
}

fn collect_name_targets(expr: &Expr, names: &mut Vec<String>) {
    match expr {
        Expr::Name(n) => names.push(n.id.as_str().to_string()),
        Expr::Tuple(t) => t.elts.iter().for_each(|e| collect_name_targets(e, names)),
        Expr::List(l) => l.elts.iter().for_each(|e| collect_name_targets(e, names)),
        Expr::Starred(s) => collect_name_targets(&s.value, names),
        _ => {}
    }
}

/// Recurse into the immediate subexpressions of every `Expr` kind that
/// doesn't introduce a binder of its own (everything but
/// `lambda`/comprehensions, handled above). Written as an explicit match
/// rather than a generic tree walk so it's obvious which variants carry
/// which children.
fn walk_children(expr: &Expr, bound_stack: &mut Vec<Vec<String>>, visit: &mut impl FnMut(&Expr, &mut Vec<Vec<String>>)) {
    match expr {
        Expr::BoolOp(ast::ExprBoolOp { values, .. }) => {
            for v in values {
                visit(v, bound_stack);
            }
        }
        Expr::NamedExpr(ast::ExprNamedExpr { target, value, .. }) => {
            visit(target, bound_stack);
            visit(value, bound_stack);
        }
        Expr::BinOp(ast::ExprBinOp { left, right, .. }) => {
            visit(left, bound_stack);
            visit(right, bound_stack);
        }
        Expr::UnaryOp(ast::ExprUnaryOp { operand, .. }) => visit(operand, bound_stack),
        Expr::IfExp(ast::ExprIfExp { test, body, orelse, .. }) => {
            visit(test, bound_stack);
            visit(body, bound_stack);
            visit(orelse, bound_stack);
        }
        Expr::Dict(dict) => {
            for item in &dict.items {
                if let Some(key) = &item.key {
                    visit(key, bound_stack);
                }
                visit(&item.value, bound_stack);
            }
        }
        Expr::Set(ast::ExprSet { elts, .. }) => {
            for e in elts {
                visit(e, bound_stack);
            }
        }
        Expr::Await(ast::ExprAwait { value, .. }) => visit(value, bound_stack),
        Expr::Yield(ast::ExprYield { value, .. }) => {
            if let Some(value) = value {
                visit(value, bound_stack);
            }
        }
        Expr::YieldFrom(ast::ExprYieldFrom { value, .. }) => visit(value, bound_stack),
        Expr::Compare(ast::ExprCompare { left, comparators, .. }) => {
            visit(left, bound_stack);
            for c in comparators {
                visit(c, bound_stack);
            }
        }
        Expr::Call(call) => {
            visit(&call.func, bound_stack);
            for arg in &call.arguments.args {
                visit(arg, bound_stack);
            }
            for keyword in &call.arguments.keywords {
                visit(&keyword.value, bound_stack);
            }
        }
        Expr::FString(fstring) => {
            for part in fstring.value.elements() {
                if let ast::FStringElement::Expression(expr) = part {
                    visit(&expr.expression, bound_stack);
                }
            }
        }
        Expr::Attribute(ast::ExprAttribute { value, .. }) => visit(value, bound_stack),
        Expr::Subscript(ast::ExprSubscript { value, slice, .. }) => {
            visit(value, bound_stack);
            visit(slice, bound_stack);
        }
        Expr::Starred(ast::ExprStarred { value, .. }) => visit(value, bound_stack),
        Expr::List(ast::ExprList { elts, .. }) => {
            for e in elts {
                visit(e, bound_stack);
            }
        }
        Expr::Tuple(tuple) => {
            for e in &tuple.elts {
                visit(e, bound_stack);
            }
        }
        Expr::Slice(ast::ExprSlice { lower, upper, step, .. }) => {
            for part in [lower, upper, step] {
                if let Some(part) = part {
                    visit(part, bound_stack);
                }
            }
        }
        // Name, Lambda, comprehensions handled by their callers; all
        // literal/leaf kinds (numbers, strings, booleans, `None`, `...`)
        // have no children to descend into.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use ruff_python_ast::Stmt;
    use rustc_hash::FxHashMap;

    use crate::args::BoundArg;

    use super::*;

    fn template_from_expression(source: &str) -> Template {
        let parsed = ruff_python_parser::parse_module(&format!("{source}\n")).unwrap();
        let [Stmt::Expr(stmt)] = parsed.syntax().body.as_slice() else {
            panic!("expected a single expression statement");
        };
        let range = stmt.value.range();
        Template {
            expr: (*stmt.value).clone(),
            source_text: source.to_string(),
            range,
        }
    }

    fn bound(pairs: &[(&str, &str)]) -> BoundArguments {
        let mut map: BoundArguments = FxHashMap::default();
        for (name, text) in pairs {
            map.insert(
                name.to_string(),
                BoundArg {
                    text: text.to_string(),
                    is_simple_name: false,
                },
            );
        }
        map
    }

    #[test]
    fn substitutes_free_identifier() {
        let template = template_from_expression("x + 1");
        let result = substitute(&template, &bound(&[("x", "3")]));
        assert_eq!(result, "3 + 1");
    }

    #[test]
    fn lambda_binder_is_not_captured() {
        // `x` inside the lambda is rebound by the lambda's own parameter
        // list, so a substitution for an outer `x` must skip it.
        let template = template_from_expression("lambda x: x + y");
        let result = substitute(&template, &bound(&[("x", "99"), ("y", "z")]));
        assert_eq!(result, "lambda x: x + z");
    }

    #[test]
    fn comprehension_target_is_not_captured() {
        let template = template_from_expression("[x for x in items]");
        let result = substitute(&template, &bound(&[("x", "99"), ("items", "values")]));
        assert_eq!(result, "[x for x in values]");
    }

    #[test]
    fn counts_receiver_references_for_side_effect_guard() {
        let template = template_from_expression("e.a + e.b");
        assert_eq!(counts_free_references(&template, "e"), 2);
        let single = template_from_expression("e.a");
        assert_eq!(counts_free_references(&single, "e"), 1);
    }
}
