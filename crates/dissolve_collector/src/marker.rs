use ruff_python_ast::{self as ast, Decorator, Expr};

use crate::types::FailureReason;

/// The marker function/decorator name honored by the Collector
/// (`spec.md` §6, "Deprecation marker format").
pub const MARKER_NAME: &str = "replace_me";

/// The literal-only metadata lifted from a `replace_me(...)` application
/// (`spec.md` §4.2 step 2).
#[derive(Debug, Clone, Default)]
pub struct MarkerArgs {
    pub since: Option<String>,
    pub remove_in: Option<String>,
    pub message: Option<String>,
    pub temporary: bool,
    /// Present only for the attribute-deprecation form,
    /// `NAME = replace_me(VALUE)`.
    pub value: Option<Expr>,
}

/// Returns `true` if `expr` is a call to the bare name `replace_me`
/// (we do not chase aliased imports here; name-binding analysis for the
/// marker itself, as opposed to the replaced symbols, is out of scope per
/// `spec.md` §1 — the marker is a fixed, well-known name the author
/// imports directly, exactly as `ruff`'s own rule bodies pattern-match
/// fixed builtin/decorator names rather than resolving them).
pub fn is_marker_call(expr: &Expr) -> Option<&ast::ExprCall> {
    let call = expr.as_call_expr()?;
    let name = match call.func.as_ref() {
        Expr::Name(name) => name.id.as_str(),
        Expr::Attribute(attr) => attr.attr.as_str(),
        _ => return None,
    };
    (name == MARKER_NAME).then_some(call)
}

/// Returns `true` if `expr` is a bare reference to `replace_me` — the
/// no-parentheses decorator form, `@replace_me` (`spec.md` §6: "A
/// decorator or function call named `replace_me`"). All marker arguments
/// are optional, so a bare decorator is a valid marker carrying no
/// metadata.
fn is_bare_marker_name(expr: &Expr) -> bool {
    match expr {
        Expr::Name(name) => name.id.as_str() == MARKER_NAME,
        Expr::Attribute(attr) => attr.attr.as_str() == MARKER_NAME,
        _ => false,
    }
}

/// Find the `replace_me` marker in `decorators`, in either its bare
/// (`@replace_me`) or called (`@replace_me(...)`) form, and extract its
/// `MarkerArgs`. A bare decorator yields the all-`None`/`false` default
/// (`spec.md` §6: every marker argument is optional).
pub fn marker_decorator_args(decorators: &[Decorator]) -> Option<Result<MarkerArgs, FailureReason>> {
    decorators.iter().find_map(|d| {
        if let Some(call) = is_marker_call(&d.expression) {
            Some(extract_marker_args(call))
        } else if is_bare_marker_name(&d.expression) {
            Some(Ok(MarkerArgs::default()))
        } else {
            None
        }
    })
}

/// Extract `since`/`remove_in`/`message`/`temporary` from a marker call's
/// keyword arguments, by literal-only evaluation. Any non-literal keyword
/// argument value is a `DynamicMarkerArgs` failure (`spec.md` §4.2 step 2).
pub fn extract_marker_args(call: &ast::ExprCall) -> Result<MarkerArgs, FailureReason> {
    let mut out = MarkerArgs::default();

    for (index, arg) in call.arguments.args.iter().enumerate() {
        // A single positional argument is the attribute-deprecation value;
        // the decorator form takes no positional arguments.
        if index == 0 {
            out.value = Some(arg.clone());
        } else {
            return Err(FailureReason::DynamicMarkerArgs);
        }
    }

    for keyword in &call.arguments.keywords {
        let Some(name) = keyword.arg.as_ref() else {
            return Err(FailureReason::DynamicMarkerArgs);
        };
        match name.as_str() {
            "since" => out.since = Some(literal_str(&keyword.value)?),
            "remove_in" => out.remove_in = Some(literal_str(&keyword.value)?),
            "message" => out.message = Some(literal_str(&keyword.value)?),
            "temporary" => out.temporary = literal_bool(&keyword.value)?,
            _ => return Err(FailureReason::DynamicMarkerArgs),
        }
    }

    Ok(out)
}

fn literal_str(expr: &Expr) -> Result<String, FailureReason> {
    match expr {
        Expr::StringLiteral(lit) => Ok(lit.value.to_str().to_string()),
        _ => Err(FailureReason::DynamicMarkerArgs),
    }
}

fn literal_bool(expr: &Expr) -> Result<bool, FailureReason> {
    match expr {
        Expr::BooleanLiteral(lit) => Ok(lit.value),
        _ => Err(FailureReason::DynamicMarkerArgs),
    }
}
