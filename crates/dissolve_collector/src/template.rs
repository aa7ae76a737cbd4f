use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_text_size::Ranged;

use crate::types::{FailureReason, ParameterInfo, Template};

/// Derive the replacement template from a function/method/property body,
/// per `spec.md` §4.2 step 3: "body must be exactly a single `return` (or
/// `return await`) statement; the template is that return expression."
///
/// `own_name` and `arity` identify the construct itself, so a
/// self-recursive call in the body can be detected and rejected
/// (`recursive_call`) rather than silently accepted as a template that can
/// never terminate when expanded.
pub fn function_template(
    body: &[Stmt],
    own_name: &str,
    arity: usize,
    source_text: &str,
) -> Result<Template, FailureReason> {
    let [stmt] = body else {
        return Err(FailureReason::ComplexBody);
    };

    let expr = match stmt {
        Stmt::Return(ast::StmtReturn { value: Some(v), .. }) => v.as_ref(),
        Stmt::Return(ast::StmtReturn { value: None, .. }) => {
            return Err(FailureReason::NoReturn)
        }
        Stmt::Pass(_) => return Err(FailureReason::NoReturn),
        _ => return Err(FailureReason::ComplexBody),
    };

    if is_lambda_expr(expr) {
        return Err(FailureReason::Lambda);
    }
    if contains_self_call(expr, own_name, arity) {
        return Err(FailureReason::RecursiveCall);
    }

    let range = expr.range();
    let snippet = source_text
        .get(usize::from(range.start())..usize::from(range.end()))
        .unwrap_or_default()
        .to_string();

    Ok(Template {
        expr: expr.clone(),
        source_text: snippet,
        range,
    })
}

/// Derive the replacement template for a class-level deprecation
/// (`spec.md` §4.2 step 3, class rule). We resolve the ambiguity the spec
/// flags (`spec.md` §9, design notes) conservatively: a class template is
/// only derivable when its sole `__init__` method has a single-statement
/// body that is either
///   - an expression statement calling another constructor (the "wraps a
///     single call to another class" simplified form), or
///   - a call to a `Replacement(...)` marker wrapping the intended
///     expression.
/// Anything else is `complex_body`; see `DESIGN.md` for the open-question
/// resolution.
pub fn class_template(
    body: &[Stmt],
    own_name: &str,
    source_text: &str,
) -> Result<(Template, Vec<ParameterInfo>), FailureReason> {
    let init = body.iter().find_map(|stmt| match stmt {
        Stmt::FunctionDef(f) if f.name.as_str() == "__init__" => Some(f),
        _ => None,
    });
    let Some(init) = init else {
        return Err(FailureReason::ComplexBody);
    };

    let [stmt] = init.body.as_slice() else {
        return Err(FailureReason::ComplexBody);
    };

    let expr = match stmt {
        Stmt::Expr(ast::StmtExpr { value, .. }) => {
            if let Some(call) = value.as_call_expr() {
                if matches!(call.func.as_ref(), Expr::Name(n) if n.id.as_str() == "Replacement") {
                    call.arguments
                        .args
                        .first()
                        .ok_or(FailureReason::ComplexBody)?
                } else {
                    value.as_ref()
                }
            } else {
                return Err(FailureReason::ComplexBody);
            }
        }
        _ => return Err(FailureReason::ComplexBody),
    };

    if is_lambda_expr(expr) {
        return Err(FailureReason::Lambda);
    }
    if contains_self_call(expr, own_name, 0) {
        return Err(FailureReason::RecursiveCall);
    }

    let range = expr.range();
    let snippet = source_text
        .get(usize::from(range.start())..usize::from(range.end()))
        .unwrap_or_default()
        .to_string();

    let params = crate::params::from_parameters(&init.parameters, true, source_text);

    Ok((
        Template {
            expr: expr.clone(),
            source_text: snippet,
            range,
        },
        params,
    ))
}

/// Derive the replacement template for an attribute deprecation
/// (`spec.md` §4.2 step 3): "template is the argument expression of the
/// marker call."
pub fn attribute_template(value: &Expr, source_text: &str) -> Template {
    let range = value.range();
    let snippet = source_text
        .get(usize::from(range.start())..usize::from(range.end()))
        .unwrap_or_default()
        .to_string();
    Template {
        expr: value.clone(),
        source_text: snippet,
        range,
    }
}

/// Is the *template itself* a bare lambda (`return lambda: ...`, or a
/// class's `__init__` wrapping one)? That shape has no expression to
/// substitute into at the call site — the template would just be the
/// lambda object itself, not a call. A lambda appearing *inside* an
/// otherwise-ordinary template (e.g. `return sorted(xs, key=lambda x:
/// x.n)`) is fine and substituted hygienically by `dissolve_rewriter`
/// (`spec.md` §8 "Hygiene").
fn is_lambda_expr(expr: &Expr) -> bool {
    matches!(expr, Expr::Lambda(_))
}

/// Does `expr` contain a call to `own_name` with `arity` arguments?
/// (`spec.md` §4.2 step 3: "If the body contains a call to the construct's
/// own name with the same arity -> recursive_call".)
fn contains_self_call(expr: &Expr, own_name: &str, arity: usize) -> bool {
    struct Finder<'a> {
        own_name: &'a str,
        arity: usize,
        found: bool,
    }
    impl<'a> ruff_python_ast::visitor::Visitor<'a> for Finder<'a> {
        fn visit_expr(&mut self, expr: &'a Expr) {
            if self.found {
                return;
            }
            if let Expr::Call(call) = expr {
                let callee_name = match call.func.as_ref() {
                    Expr::Name(n) => Some(n.id.as_str()),
                    Expr::Attribute(a) if a.attr.as_str() == "self" => None,
                    _ => None,
                };
                if callee_name == Some(self.own_name) {
                    let total_args = call.arguments.args.len() + call.arguments.keywords.len();
                    if total_args == self.arity || self.arity == 0 {
                        self.found = true;
                        return;
                    }
                }
            }
            ruff_python_ast::visitor::walk_expr(self, expr);
        }
    }
    let mut finder = Finder {
        own_name,
        arity,
        found: false,
    };
    finder.visit_expr(expr);
    finder.found
}
