use ruff_python_ast::{self as ast, Expr};
use ruff_text_size::Ranged;
use rustc_hash::FxHashMap;

use dissolve_collector::{ParameterInfo, ReplaceInfo};

use crate::types::BindingError;

/// One bound parameter value, kept as source text so substitution can
/// splice it in without re-serializing an AST node (`spec.md` §4.4:
/// "expression_tree (or source text snippet)").
#[derive(Debug, Clone)]
pub struct BoundArg {
    pub text: String,
    pub is_simple_name: bool,
}

/// The result of binding a call site's actual arguments to a
/// `ReplaceInfo`'s declared parameters (`spec.md` §4.4 "Argument binding").
pub type BoundArguments = FxHashMap<String, BoundArg>;

/// Bind a call site's actual arguments against `info.parameters`, per
/// `spec.md` §4.4: "positional args fill non-variadic positional params in
/// order, named args fill the matching parameter, a starred arg maps to
/// the variadic positional parameter, and a double-starred arg to the
/// variadic keyword parameter. Unfilled parameters take their
/// `default_source_text`."
///
/// `positional_args`/`keywords` are the call's actual arguments *after*
/// any receiver has already been peeled off by the caller — for an
/// ordinary `e.m(a, b)` call that's `call.arguments.args`/`.keywords`
/// unchanged, but for a magic-builtin dispatch like `str(e)` the caller
/// passes `&call.arguments.args[1..]` since `e` itself is the receiver,
/// not a declared parameter's actual argument.
///
/// `receiver` is a pre-bound expression text for a method's implicit first
/// parameter (already resolved by the caller from the receiver expression,
/// the class literal, or omitted for free functions/staticmethods).
pub fn bind_call_arguments(
    positional_args: &[Expr],
    keywords: &[ast::Keyword],
    info: &ReplaceInfo,
    source_text: &str,
    receiver: Option<String>,
) -> Result<BoundArguments, BindingError> {
    let slice = |expr: &Expr| -> String {
        let range = expr.range();
        source_text
            .get(usize::from(range.start())..usize::from(range.end()))
            .unwrap_or_default()
            .to_string()
    };

    let mut bound: BoundArguments = FxHashMap::default();
    let mut params = info.parameters.iter();

    if info.construct_kind.has_receiver() {
        let receiver_param = params.next().ok_or(BindingError::ArityMismatch {
            expected: 0,
            got: 1,
        })?;
        if let Some(receiver_text) = receiver {
            bound.insert(
                receiver_param.name.clone(),
                BoundArg {
                    text: receiver_text,
                    is_simple_name: false,
                },
            );
        }
    }

    let remaining: Vec<&ParameterInfo> = params.collect();
    let positional: Vec<&ParameterInfo> = remaining
        .iter()
        .copied()
        .take_while(|p| !p.keyword_only && !p.variadic_positional && !p.variadic_keyword)
        .collect();
    let vararg = remaining.iter().find(|p| p.variadic_positional);
    let kwonly: Vec<&ParameterInfo> = remaining.iter().copied().filter(|p| p.keyword_only).collect();
    let kwarg = remaining.iter().find(|p| p.variadic_keyword);

    let has_starred_positional = positional_args.iter().any(|arg| matches!(arg, Expr::Starred(_)));
    let mut positional_index = 0usize;

    for arg in positional_args {
        if let Expr::Starred(starred) = arg {
            let Some(vararg) = vararg else {
                return Err(BindingError::VariadicTemplateMismatch);
            };
            bound.insert(
                vararg.name.clone(),
                BoundArg {
                    text: slice(&starred.value),
                    is_simple_name: false,
                },
            );
            continue;
        }

        let Some(param) = positional.get(positional_index) else {
            return Err(BindingError::ArityMismatch {
                expected: positional.len(),
                got: positional_args.len(),
            });
        };
        if param.keyword_only {
            return Err(BindingError::PositionalToKeywordOnly(param.name.clone()));
        }
        bound.insert(
            param.name.clone(),
            BoundArg {
                text: slice(arg),
                is_simple_name: matches!(arg, Expr::Name(_)),
            },
        );
        positional_index += 1;
    }

    for keyword in keywords {
        match &keyword.arg {
            Some(name) => {
                let target = positional
                    .iter()
                    .find(|p| p.name == name.as_str())
                    .or_else(|| kwonly.iter().find(|p| p.name == name.as_str()));
                let Some(param) = target else {
                    return Err(BindingError::UnknownKeyword(name.as_str().to_string()));
                };
                bound.insert(
                    param.name.clone(),
                    BoundArg {
                        text: slice(&keyword.value),
                        is_simple_name: matches!(keyword.value, Expr::Name(_)),
                    },
                );
            }
            None => {
                let Some(kwarg) = kwarg else {
                    return Err(BindingError::VariadicTemplateMismatch);
                };
                bound.insert(
                    kwarg.name.clone(),
                    BoundArg {
                        text: slice(&keyword.value),
                        is_simple_name: false,
                    },
                );
            }
        }
    }

    if has_starred_positional && positional.iter().any(|p| !bound.contains_key(&p.name) && !p.has_default) {
        return Err(BindingError::VariadicTemplateMismatch);
    }

    for param in positional.iter().chain(kwonly.iter()) {
        if bound.contains_key(&param.name) {
            continue;
        }
        if let Some(default) = &param.default_source_text {
            bound.insert(
                param.name.clone(),
                BoundArg {
                    text: default.clone(),
                    is_simple_name: false,
                },
            );
        } else if !param.has_default {
            return Err(BindingError::ArityMismatch {
                expected: positional.len() + kwonly.len(),
                got: bound.len(),
            });
        }
    }

    Ok(bound)
}
