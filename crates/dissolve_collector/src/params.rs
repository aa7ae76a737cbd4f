use ruff_python_ast::Parameters;
use ruff_text_size::Ranged;

use crate::types::ParameterInfo;

/// Flatten a function signature's `Parameters` into the ordered
/// `Vec<ParameterInfo>` of `spec.md` §3. `skip_first` drops the `self`/`cls`
/// receiver from this list because callers that need a receiver slot
/// (methods) insert a synthetic one explicitly instead, keeping this
/// function's meaning independent of how it's going to be used.
///
/// `source_text` is the full text of the file the parameters were parsed
/// from, used to recover each default value's exact original spelling for
/// `ParameterInfo::default_source_text`.
pub fn from_parameters(parameters: &Parameters, skip_first: bool, source_text: &str) -> Vec<ParameterInfo> {
    let slice = |expr: &ruff_python_ast::Expr| -> String {
        let range = expr.range();
        source_text
            .get(usize::from(range.start())..usize::from(range.end()))
            .unwrap_or_default()
            .to_string()
    };

    let mut out = Vec::new();

    let positional = parameters
        .posonlyargs
        .iter()
        .chain(parameters.args.iter())
        .enumerate();
    for (index, param) in positional {
        if skip_first && index == 0 {
            continue;
        }
        out.push(ParameterInfo {
            name: param.parameter.name.as_str().to_string(),
            has_default: param.default.is_some(),
            default_source_text: param.default.as_deref().map(&slice),
            variadic_positional: false,
            variadic_keyword: false,
            keyword_only: false,
        });
    }

    if let Some(vararg) = &parameters.vararg {
        out.push(ParameterInfo {
            name: vararg.name.as_str().to_string(),
            has_default: false,
            default_source_text: None,
            variadic_positional: true,
            variadic_keyword: false,
            keyword_only: false,
        });
    }

    for param in &parameters.kwonlyargs {
        out.push(ParameterInfo {
            name: param.parameter.name.as_str().to_string(),
            has_default: param.default.is_some(),
            default_source_text: param.default.as_deref().map(&slice),
            variadic_positional: false,
            variadic_keyword: false,
            keyword_only: true,
        });
    }

    if let Some(kwarg) = &parameters.kwarg {
        out.push(ParameterInfo {
            name: kwarg.name.as_str().to_string(),
            has_default: false,
            default_source_text: None,
            variadic_positional: false,
            variadic_keyword: true,
            keyword_only: false,
        });
    }

    out
}
