use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use ruff_python_ast::{self as ast, Decorator, Expr, ModModule, Stmt};
use ruff_text_size::Ranged;
use rustc_hash::FxHashSet;

use dissolve_diagnostics::{LineColumn, ParseError};

use crate::imports::ModuleResolver;
use crate::marker::{extract_marker_args, is_marker_call, marker_decorator_args, MarkerArgs};
use crate::params::from_parameters;
use crate::template::{attribute_template, class_template, function_template};
use crate::types::{
    CollectionResult, ConstructKind, ParameterInfo, ReplaceInfo, UnreplaceableConstruct,
};

/// One-based line/column for a byte offset, by scanning for preceding
/// newlines. Used only on the (rare) parse-failure path, so a linear scan
/// is an acceptable trade against pulling in a line-index dependency.
fn offset_to_line_column(source_text: &str, offset: usize) -> LineColumn {
    let offset = offset.min(source_text.len());
    let prefix = &source_text[..offset];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = prefix.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
    LineColumn { line, column }
}

/// Parse `source_text` and walk it for deprecated constructs, without
/// following imports (`spec.md` §4.2, single-module pass).
pub fn collect_source(
    source_text: &str,
    module_name: &str,
    path: &Path,
) -> Result<CollectionResult, ParseError> {
    let parsed = ruff_python_parser::parse_module(source_text).map_err(|err| {
        let offset: usize = err.location().start().into();
        ParseError {
            path: path.to_path_buf(),
            at: offset_to_line_column(source_text, offset),
            message: err.to_string(),
        }
    })?;

    let module: &ModModule = parsed.syntax();
    let mut result = CollectionResult::default();
    walk_body(&module.body, module_name, None, path, source_text, &mut result);
    Ok(result)
}

/// Collect a file and, up to `max_depth` hops, every module it transitively
/// imports (`spec.md` §4.2 step 6). Import cycles terminate via the
/// `visited` memo.
pub fn collect_file_with_imports(
    path: &Path,
    module_name: &str,
    resolver: &ModuleResolver,
    max_depth: usize,
) -> Result<CollectionResult, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|err| ParseError {
        path: path.to_path_buf(),
        at: LineColumn { line: 1, column: 1 },
        message: err.to_string(),
    })?;

    let mut result = collect_source(&text, module_name, path)?;

    let mut visited: FxHashSet<String> = FxHashSet::default();
    visited.insert(module_name.to_string());

    let mut frontier: VecDeque<(String, PathBuf, usize)> = VecDeque::new();
    for (imported_module, _) in imported_module_names(&text, path) {
        frontier.push_back((imported_module, path.to_path_buf(), 1));
    }

    while let Some((module, from_path, depth)) = frontier.pop_front() {
        if depth > max_depth || !visited.insert(module.clone()) {
            continue;
        }
        let Some(resolved) = resolver.resolve(&module, &from_path) else {
            tracing::debug!("could not resolve import `{module}`; skipping");
            continue;
        };
        let Ok(imported_text) = std::fs::read_to_string(&resolved) else {
            tracing::warn!("failed to read `{}` for import `{module}`", resolved.display());
            continue;
        };
        match collect_source(&imported_text, &module, &resolved) {
            Ok(imported) => {
                for (next_module, _) in imported_module_names(&imported_text, &resolved) {
                    frontier.push_back((next_module, resolved.clone(), depth + 1));
                }
                result.merge(imported);
            }
            Err(err) => {
                tracing::warn!("failed to parse import `{module}`: {err}");
            }
        }
    }

    Ok(result)
}

/// Names imported via top-level `import`/`from ... import ...` statements,
/// paired with the alias bound locally (unused by the Collector itself,
/// but needed by the Rewriter's name-binding analysis — see
/// `dissolve_rewriter`).
fn imported_module_names(source_text: &str, path: &Path) -> Vec<(String, String)> {
    let Ok(parsed) = ruff_python_parser::parse_module(source_text) else {
        return Vec::new();
    };
    let _ = path;
    let mut out = Vec::new();
    for stmt in &parsed.syntax().body {
        match stmt {
            Stmt::Import(import) => {
                for alias in &import.names {
                    let bound = alias
                        .asname
                        .as_ref()
                        .map_or_else(|| alias.name.as_str().to_string(), |a| a.as_str().to_string());
                    out.push((alias.name.as_str().to_string(), bound));
                }
            }
            Stmt::ImportFrom(import_from) => {
                if let Some(module) = &import_from.module {
                    out.push((module.as_str().to_string(), module.as_str().to_string()));
                }
            }
            _ => {}
        }
    }
    out
}

fn has_decorator_named(decorators: &[Decorator], name: &str) -> bool {
    decorators.iter().any(|d| match &d.expression {
        Expr::Name(n) => n.id.as_str() == name,
        Expr::Attribute(a) => a.attr.as_str() == name,
        _ => false,
    })
}

fn qualify(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

fn record_marker_failure(
    result: &mut CollectionResult,
    qualified_name: String,
    construct_kind: ConstructKind,
    reason: crate::types::FailureReason,
    path: &Path,
    range: ruff_text_size::TextRange,
) {
    result.unreplaceable.insert(
        qualified_name.clone(),
        UnreplaceableConstruct {
            qualified_name,
            construct_kind,
            failure_reason: reason,
            message: format!("{reason}"),
            defined_in: path.to_path_buf(),
            definition_range: range,
        },
    );
}

fn record_replacement(result: &mut CollectionResult, info: ReplaceInfo) {
    result.unreplaceable.remove(&info.qualified_name);
    result.replacements.insert(info.qualified_name.clone(), info);
}

/// Walk one level of statement bodies (`spec.md` §4.2: "any top-level or
/// class-nested definition" — we never recurse into function bodies
/// looking for further nested defs, matching the spec's stated scope).
fn walk_body(
    body: &[Stmt],
    module_name: &str,
    declaring_class: Option<&str>,
    path: &Path,
    source_text: &str,
    result: &mut CollectionResult,
) {
    let parent = declaring_class.unwrap_or(module_name);

    for stmt in body {
        match stmt {
            Stmt::FunctionDef(f) => {
                handle_function(f, module_name, declaring_class, path, source_text, result);
            }
            Stmt::ClassDef(c) => {
                handle_class(c, module_name, path, source_text, result);
            }
            Stmt::Assign(a) => {
                handle_assign(a, parent, declaring_class.is_some(), path, source_text, result);
            }
            _ => {}
        }
    }
}

fn handle_function(
    f: &ast::StmtFunctionDef,
    module_name: &str,
    declaring_class: Option<&str>,
    path: &Path,
    source_text: &str,
    result: &mut CollectionResult,
) {
    let Some(marker_result) = marker_decorator_args(&f.decorator_list) else {
        return;
    };

    let parent = declaring_class.unwrap_or(module_name);
    let qualified_name = qualify(parent, f.name.as_str());

    let marker_args = match marker_result {
        Ok(args) => args,
        Err(reason) => {
            record_marker_failure(
                result,
                qualified_name,
                construct_kind_for(f, declaring_class),
                reason,
                path,
                f.range(),
            );
            return;
        }
    };

    let construct_kind = construct_kind_for(f, declaring_class);
    let has_receiver = declaring_class.is_some()
        && !has_decorator_named(&f.decorator_list, "staticmethod");
    let receiver_name = if has_decorator_named(&f.decorator_list, "classmethod") {
        "cls"
    } else {
        "self"
    };

    let mut parameters = from_parameters(&f.parameters, has_receiver, source_text);
    if has_receiver {
        parameters.insert(0, ParameterInfo::receiver(receiver_name));
    }

    let arity = f.parameters.args.len() + f.parameters.posonlyargs.len() + f.parameters.kwonlyargs.len();
    let template = match function_template(&f.body, f.name.as_str(), arity, source_text) {
        Ok(t) => t,
        Err(reason) => {
            record_marker_failure(result, qualified_name, construct_kind, reason, path, f.range());
            return;
        }
    };

    record_replacement(
        result,
        build_replace_info(
            qualified_name,
            f.name.as_str().to_string(),
            construct_kind,
            parameters,
            template,
            marker_args,
            declaring_class,
            path,
            f.range(),
        ),
    );
}

fn construct_kind_for(f: &ast::StmtFunctionDef, declaring_class: Option<&str>) -> ConstructKind {
    if declaring_class.is_none() {
        return if f.is_async {
            ConstructKind::AsyncFunction
        } else {
            ConstructKind::Function
        };
    }
    if has_decorator_named(&f.decorator_list, "staticmethod") {
        ConstructKind::StaticMethod
    } else if has_decorator_named(&f.decorator_list, "classmethod") {
        ConstructKind::ClassMethod
    } else if has_decorator_named(&f.decorator_list, "property") {
        ConstructKind::Property
    } else if f.is_async {
        ConstructKind::AsyncMethod
    } else {
        ConstructKind::InstanceMethod
    }
}

fn handle_class(
    c: &ast::StmtClassDef,
    module_name: &str,
    path: &Path,
    source_text: &str,
    result: &mut CollectionResult,
) {
    let qualified_name = qualify(module_name, c.name.as_str());

    // Record the inheritance edge regardless of whether the class itself is
    // deprecated, so method lookups via subclasses work (`spec.md` §3).
    let bases: Vec<String> = c
        .arguments
        .as_deref()
        .map(|args| {
            args.args
                .iter()
                .filter_map(|base| match base {
                    // A bare name is a same-module base class; qualify it so
                    // `resolve_method_on_class`'s frontier walk stays in
                    // qualified-name space. A dotted base (`pkg.Base`) is
                    // left as its attribute name best-effort — the exact
                    // module it denotes depends on import aliasing that
                    // isn't resolved at this layer.
                    Expr::Name(n) => Some(qualify(module_name, n.id.as_str())),
                    Expr::Attribute(a) => Some(a.attr.as_str().to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    result.inheritance.insert(qualified_name.clone(), bases);

    if let Some(marker_result) = marker_decorator_args(&c.decorator_list) {
        let marker_args = match marker_result {
            Ok(args) => args,
            Err(reason) => {
                record_marker_failure(
                    result,
                    qualified_name.clone(),
                    ConstructKind::Class,
                    reason,
                    path,
                    c.range(),
                );
                return walk_body(&c.body, module_name, Some(&qualified_name), path, source_text, result);
            }
        };

        match class_template(&c.body, c.name.as_str(), source_text) {
            Ok((template, parameters)) => {
                record_replacement(
                    result,
                    build_replace_info(
                        qualified_name.clone(),
                        c.name.as_str().to_string(),
                        ConstructKind::Class,
                        parameters,
                        template,
                        marker_args,
                        None,
                        path,
                        c.range(),
                    ),
                );
            }
            Err(reason) => {
                record_marker_failure(
                    result,
                    qualified_name.clone(),
                    ConstructKind::Class,
                    reason,
                    path,
                    c.range(),
                );
            }
        }
    }

    walk_body(&c.body, module_name, Some(&qualified_name), path, source_text, result);
}

fn handle_assign(
    a: &ast::StmtAssign,
    parent: &str,
    is_class_member: bool,
    path: &Path,
    source_text: &str,
    result: &mut CollectionResult,
) {
    let [Expr::Name(target)] = a.targets.as_slice() else {
        return;
    };
    let Some(marker_call) = is_marker_call(&a.value) else {
        return;
    };

    let qualified_name = qualify(parent, target.id.as_str());
    let construct_kind = if is_class_member {
        ConstructKind::ClassAttribute
    } else {
        ConstructKind::ModuleAttribute
    };

    let marker_args = match extract_marker_args(marker_call) {
        Ok(args) => args,
        Err(reason) => {
            record_marker_failure(result, qualified_name, construct_kind, reason, path, a.range());
            return;
        }
    };

    let Some(value) = &marker_args.value else {
        record_marker_failure(
            result,
            qualified_name,
            construct_kind,
            crate::types::FailureReason::ComplexBody,
            path,
            a.range(),
        );
        return;
    };

    let template = attribute_template(value, source_text);
    record_replacement(
        result,
        build_replace_info(
            qualified_name,
            target.id.as_str().to_string(),
            construct_kind,
            Vec::new(),
            template,
            marker_args,
            is_class_member.then(|| parent.to_string()).as_deref(),
            path,
            a.range(),
        ),
    );
}

#[allow(clippy::too_many_arguments)]
fn build_replace_info(
    qualified_name: String,
    simple_name: String,
    construct_kind: ConstructKind,
    parameters: Vec<ParameterInfo>,
    template: crate::types::Template,
    marker_args: MarkerArgs,
    declaring_class: Option<&str>,
    path: &Path,
    range: ruff_text_size::TextRange,
) -> ReplaceInfo {
    ReplaceInfo {
        qualified_name,
        simple_name,
        construct_kind,
        parameters,
        replacement_template: template,
        since: marker_args.since,
        remove_in: marker_args.remove_in,
        message: marker_args.message,
        temporary: marker_args.temporary,
        declaring_class: declaring_class.map(str::to_string),
        defined_in: path.to_path_buf(),
        definition_range: range,
    }
}
