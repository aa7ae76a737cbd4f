use std::path::Path;

use ruff_python_ast::{self as ast, Expr, ModModule, Stmt};
use ruff_text_size::{Ranged, TextRange, TextSize};
use rustc_hash::FxHashMap;

use dissolve_collector::{CollectionResult, ConstructKind, ReplaceInfo};
use dissolve_diagnostics::{Edit, Fix};
use dissolve_resolver::TypeResolverSession;

use crate::args::{bind_call_arguments, BoundArguments};
use crate::binding::{import_bindings, ShadowTimeline};
use crate::magic::dunder_for_builtin;
use crate::substitute::{counts_free_references, substitute};
use crate::types::{AppliedReplacement, SkippedSite};

/// The result of walking one file's Call-site Rewriter pass (`spec.md`
/// §4.4 "Output"): a `Fix` per applied replacement, ready for
/// `dissolve_diagnostics::apply_fixes`, plus the bookkeeping the Driver
/// reports to the user.
pub struct RewriteOutcome {
    pub fixes: Vec<Fix>,
    pub applied: Vec<AppliedReplacement>,
    pub skipped: Vec<SkippedSite>,
}

fn qualify(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

/// Walk `module`'s call/attribute sites and produce the replacements that
/// can be applied (`spec.md` §4.4). `resolver` is the (already-opened)
/// Type Resolver session for this file, or `None` when `--type-method
/// none` disables type-dependent rewrites entirely.
pub fn rewrite_module(
    module: &ModModule,
    source_text: &str,
    path: &Path,
    module_name: &str,
    collection: &CollectionResult,
    resolver: Option<&mut TypeResolverSession>,
) -> RewriteOutcome {
    let mut ctx = Ctx {
        collection,
        module_name,
        source_text,
        path,
        import_bindings: import_bindings(module),
        shadow: ShadowTimeline::build(module),
        resolver,
        fixes: Vec::new(),
        applied: Vec::new(),
        skipped: Vec::new(),
    };

    for stmt in &module.body {
        ctx.visit_stmt(stmt);
    }

    RewriteOutcome {
        fixes: ctx.fixes,
        applied: ctx.applied,
        skipped: ctx.skipped,
    }
}

struct Ctx<'a> {
    collection: &'a CollectionResult,
    module_name: &'a str,
    source_text: &'a str,
    path: &'a Path,
    import_bindings: FxHashMap<String, String>,
    shadow: ShadowTimeline,
    resolver: Option<&'a mut TypeResolverSession>,
    fixes: Vec<Fix>,
    applied: Vec<AppliedReplacement>,
    skipped: Vec<SkippedSite>,
}

impl<'a> Ctx<'a> {
    fn slice(&self, range: TextRange) -> String {
        self.source_text
            .get(usize::from(range.start())..usize::from(range.end()))
            .unwrap_or_default()
            .to_string()
    }

    fn line_column(&self, offset: TextSize) -> (usize, usize) {
        let offset = usize::from(offset).min(self.source_text.len());
        let prefix = &self.source_text[..offset];
        let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
        let column = prefix.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
        (line, column)
    }

    fn record_rewrite(&mut self, info: ReplaceInfo, bound: BoundArguments, range: TextRange) {
        let new_text = substitute(&info.replacement_template, &bound);
        let old_text = self.slice(range);
        let (line, column) = self.line_column(range.start());
        self.fixes
            .push(Fix::single_edit(Edit::range_replacement(new_text.clone(), range)));
        self.applied.push(AppliedReplacement {
            line,
            column,
            old_text,
            new_text,
            qualified_name: info.qualified_name,
            range,
        });
    }

    fn record_skip(&mut self, range: TextRange, qualified_name: Option<String>, reason: String) {
        let (line, column) = self.line_column(range.start());
        self.skipped.push(SkippedSite {
            line,
            column,
            qualified_name,
            reason,
        });
    }

    /// Rule 1-3 of `spec.md` §4.4 "Name-binding analysis": is `name` at
    /// byte offset `at` a live reference to an imported `ReplaceInfo`, or
    /// (when there's no import at all) to a construct defined directly in
    /// this module?
    fn resolve_direct_name(&self, name: &str, at: TextSize) -> Option<&'a ReplaceInfo> {
        let collection = self.collection;
        if !self.shadow.is_shadowed(name, at) {
            if let Some(qualified) = self.import_bindings.get(name) {
                if let Some(info) = collection.replacements.get(qualified) {
                    return Some(info);
                }
            }
        }
        let local = qualify(self.module_name, name);
        collection.replacements.get(&local)
    }

    /// `M.A`/`C.method(...)` where `M`/`C` is a name statically known to
    /// denote a class (`spec.md` §4.4: classmethod case, and the `M.A`
    /// attribute-access case). Walks the inheritance map via
    /// `resolve_method_on_class` so a subclass that doesn't itself carry
    /// the marker still resolves through its deprecated base.
    fn resolve_class_literal_member(&self, value: &Expr, member_name: &str) -> Option<&'a ReplaceInfo> {
        let Expr::Name(n) = value else {
            return None;
        };
        let collection = self.collection;
        let mut candidates = Vec::new();
        if let Some(qualified) = self.import_bindings.get(n.id.as_str()) {
            candidates.push(qualified.clone());
        }
        candidates.push(qualify(self.module_name, n.id.as_str()));

        candidates
            .into_iter()
            .filter(|candidate| collection.inheritance.contains_key(candidate))
            .find_map(|candidate| collection.resolve_method_on_class(&candidate, qualify, member_name))
    }

    /// `e.m(...)` where `e`'s declaring class is not statically known from
    /// the name alone — ask the Type Resolver (`spec.md` §4.4: "only
    /// rewritten when the declaring class of `e` is known *and* matches
    /// `info.declaring_class` (or a subclass ... by MRO walk)").
    fn resolve_via_type_resolver(&mut self, value: &Expr, member_name: &str) -> Option<(&'a ReplaceInfo, String)> {
        let collection = self.collection;
        let receiver_text = self.slice(value.range());
        let query = dissolve_resolver::TypeQuery {
            file: self.path.to_path_buf(),
            offset: value.range().start(),
            receiver_expression_text: receiver_text.clone(),
        };
        let resolved = self.resolver.as_mut()?.query(&query).ok()?;
        let class_name = resolved.as_known()?;
        let info = collection.resolve_method_on_class(class_name, qualify, member_name)?;
        Some((info, receiver_text))
    }

    fn resolve_magic_builtin(&mut self, call: &ast::ExprCall) -> Option<(&'a ReplaceInfo, String)> {
        let Expr::Name(n) = call.func.as_ref() else {
            return None;
        };
        let dunder = dunder_for_builtin(n.id.as_str())?;
        let receiver = call.arguments.args.first()?;
        self.resolve_via_type_resolver(receiver, dunder)
    }

    /// Attempt to treat `call` as a rewritable site. Returns `true` when a
    /// `Fix` was recorded (the caller must not recurse into `call`'s own
    /// subexpressions — they've just been spliced verbatim into the
    /// template); `false` means the caller should keep walking normally,
    /// whether because nothing matched or because binding failed and the
    /// site was recorded as skipped.
    fn try_rewrite_call(&mut self, call: &ast::ExprCall, enclosing_await: Option<TextRange>) -> bool {
        if let Expr::Name(n) = call.func.as_ref() {
            if let Some(info) = self.resolve_direct_name(n.id.as_str(), n.range().start()) {
                if matches!(
                    info.construct_kind,
                    ConstructKind::Function | ConstructKind::AsyncFunction | ConstructKind::Class
                ) {
                    return self.finish_call(
                        call,
                        &call.arguments.args,
                        &call.arguments.keywords,
                        info.clone(),
                        None,
                        enclosing_await,
                    );
                }
            }
        }

        if let Expr::Attribute(attr) = call.func.as_ref() {
            if let Some(info) = self.resolve_class_literal_member(&attr.value, attr.attr.as_str()) {
                if info.construct_kind.is_callable() {
                    let receiver_text = matches!(info.construct_kind, ConstructKind::ClassMethod)
                        .then(|| self.slice(attr.value.range()));
                    return self.finish_call(
                        call,
                        &call.arguments.args,
                        &call.arguments.keywords,
                        info.clone(),
                        receiver_text,
                        enclosing_await,
                    );
                }
            } else if let Some((info, receiver_text)) = self.resolve_via_type_resolver(&attr.value, attr.attr.as_str()) {
                if info.construct_kind.is_callable() {
                    return self.finish_call(
                        call,
                        &call.arguments.args,
                        &call.arguments.keywords,
                        info.clone(),
                        Some(receiver_text),
                        enclosing_await,
                    );
                }
            }
        }

        if let Some((info, receiver_text)) = self.resolve_magic_builtin(call) {
            let receiver_param_name = info
                .receiver_parameter()
                .map(|p| p.name.clone())
                .unwrap_or_default();
            if counts_free_references(&info.replacement_template, &receiver_param_name) > 1 {
                self.record_skip(
                    call.range(),
                    Some(info.qualified_name.clone()),
                    crate::types::BindingError::ReceiverReusedWithSideEffects.to_string(),
                );
                return false;
            }
            return self.finish_call(
                call,
                &call.arguments.args[1..],
                &call.arguments.keywords,
                info.clone(),
                Some(receiver_text),
                enclosing_await,
            );
        }

        false
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_call(
        &mut self,
        call: &ast::ExprCall,
        positional_args: &[Expr],
        keywords: &[ast::Keyword],
        info: ReplaceInfo,
        receiver_text: Option<String>,
        enclosing_await: Option<TextRange>,
    ) -> bool {
        match bind_call_arguments(positional_args, keywords, &info, self.source_text, receiver_text) {
            Ok(bound) => {
                let site_range = enclosing_await.unwrap_or_else(|| call.range());
                self.record_rewrite(info, bound, site_range);
                true
            }
            Err(err) => {
                self.record_skip(call.range(), Some(info.qualified_name), err.to_string());
                false
            }
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(f) => f.body.iter().for_each(|s| self.visit_stmt(s)),
            Stmt::ClassDef(c) => c.body.iter().for_each(|s| self.visit_stmt(s)),
            Stmt::Expr(e) => self.visit_expr(&e.value),
            Stmt::Assign(a) => self.visit_expr(&a.value),
            Stmt::AugAssign(a) => {
                self.visit_expr(&a.target);
                self.visit_expr(&a.value);
            }
            Stmt::AnnAssign(a) => {
                if let Some(value) = &a.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Return(r) => {
                if let Some(value) = &r.value {
                    self.visit_expr(value);
                }
            }
            Stmt::If(stmt_if) => {
                self.visit_expr(&stmt_if.test);
                stmt_if.body.iter().for_each(|s| self.visit_stmt(s));
                for clause in &stmt_if.elif_else_clauses {
                    if let Some(test) = &clause.test {
                        self.visit_expr(test);
                    }
                    clause.body.iter().for_each(|s| self.visit_stmt(s));
                }
            }
            Stmt::While(stmt_while) => {
                self.visit_expr(&stmt_while.test);
                stmt_while.body.iter().for_each(|s| self.visit_stmt(s));
                stmt_while.orelse.iter().for_each(|s| self.visit_stmt(s));
            }
            Stmt::For(stmt_for) => {
                self.visit_expr(&stmt_for.iter);
                stmt_for.body.iter().for_each(|s| self.visit_stmt(s));
                stmt_for.orelse.iter().for_each(|s| self.visit_stmt(s));
            }
            Stmt::With(stmt_with) => {
                for item in &stmt_with.items {
                    self.visit_expr(&item.context_expr);
                }
                stmt_with.body.iter().for_each(|s| self.visit_stmt(s));
            }
            Stmt::Try(stmt_try) => {
                stmt_try.body.iter().for_each(|s| self.visit_stmt(s));
                for handler in &stmt_try.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    handler.body.iter().for_each(|s| self.visit_stmt(s));
                }
                stmt_try.orelse.iter().for_each(|s| self.visit_stmt(s));
                stmt_try.finalbody.iter().for_each(|s| self.visit_stmt(s));
            }
            Stmt::Assert(a) => {
                self.visit_expr(&a.test);
                if let Some(msg) = &a.msg {
                    self.visit_expr(msg);
                }
            }
            Stmt::Delete(d) => d.targets.iter().for_each(|t| self.visit_expr(t)),
            Stmt::Raise(r) => {
                if let Some(exc) = &r.exc {
                    self.visit_expr(exc);
                }
                if let Some(cause) = &r.cause {
                    self.visit_expr(cause);
                }
            }
            _ => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Await(aw) => {
                if let Expr::Call(call) = aw.value.as_ref() {
                    if !self.try_rewrite_call(call, Some(aw.range())) {
                        self.visit_expr(&aw.value);
                    }
                } else {
                    self.visit_expr(&aw.value);
                }
            }
            Expr::Call(call) => {
                if !self.try_rewrite_call(call, None) {
                    self.visit_expr(&call.func);
                    for arg in &call.arguments.args {
                        self.visit_expr(arg);
                    }
                    for keyword in &call.arguments.keywords {
                        self.visit_expr(&keyword.value);
                    }
                }
            }
            Expr::Attribute(attr) => {
                if let Some(info) = self.resolve_class_literal_member(&attr.value, attr.attr.as_str()) {
                    if !info.construct_kind.is_callable() {
                        self.record_rewrite(info.clone(), FxHashMap::default(), attr.range());
                        return;
                    }
                }
                self.visit_expr(&attr.value);
            }
            Expr::Name(name) => {
                if let Some(info) = self.resolve_direct_name(name.id.as_str(), name.range().start()) {
                    if !info.construct_kind.is_callable() {
                        self.record_rewrite(info.clone(), FxHashMap::default(), name.range());
                    }
                }
            }
            Expr::Lambda(lambda) => self.visit_expr(&lambda.body),
            Expr::BoolOp(ast::ExprBoolOp { values, .. }) => values.iter().for_each(|v| self.visit_expr(v)),
            Expr::NamedExpr(ast::ExprNamedExpr { target, value, .. }) => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Expr::BinOp(ast::ExprBinOp { left, right, .. }) => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::UnaryOp(ast::ExprUnaryOp { operand, .. }) => self.visit_expr(operand),
            Expr::IfExp(ast::ExprIfExp { test, body, orelse, .. }) => {
                self.visit_expr(test);
                self.visit_expr(body);
                self.visit_expr(orelse);
            }
            Expr::Dict(dict) => {
                for item in &dict.items {
                    if let Some(key) = &item.key {
                        self.visit_expr(key);
                    }
                    self.visit_expr(&item.value);
                }
            }
            Expr::Set(ast::ExprSet { elts, .. }) => elts.iter().for_each(|e| self.visit_expr(e)),
            Expr::ListComp(ast::ExprListComp { elt, generators, .. })
            | Expr::SetComp(ast::ExprSetComp { elt, generators, .. })
            | Expr::Generator(ast::ExprGenerator { elt, generators, .. }) => {
                self.visit_comprehensions(generators);
                self.visit_expr(elt);
            }
            Expr::DictComp(ast::ExprDictComp { key, value, generators, .. }) => {
                self.visit_comprehensions(generators);
                self.visit_expr(key);
                self.visit_expr(value);
            }
            Expr::Yield(ast::ExprYield { value, .. }) => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Expr::YieldFrom(ast::ExprYieldFrom { value, .. }) => self.visit_expr(value),
            Expr::Compare(ast::ExprCompare { left, comparators, .. }) => {
                self.visit_expr(left);
                comparators.iter().for_each(|c| self.visit_expr(c));
            }
            Expr::FString(fstring) => {
                for part in fstring.value.elements() {
                    if let ast::FStringElement::Expression(e) = part {
                        self.visit_expr(&e.expression);
                    }
                }
            }
            Expr::Subscript(ast::ExprSubscript { value, slice, .. }) => {
                self.visit_expr(value);
                self.visit_expr(slice);
            }
            Expr::Starred(ast::ExprStarred { value, .. }) => self.visit_expr(value),
            Expr::List(ast::ExprList { elts, .. }) => elts.iter().for_each(|e| self.visit_expr(e)),
            Expr::Tuple(tuple) => tuple.elts.iter().for_each(|e| self.visit_expr(e)),
            Expr::Slice(ast::ExprSlice { lower, upper, step, .. }) => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.visit_expr(part);
                }
            }
            _ => {}
        }
    }

    fn visit_comprehensions(&mut self, generators: &[ast::Comprehension]) {
        for generator in generators {
            self.visit_expr(&generator.iter);
            for condition in &generator.ifs {
                self.visit_expr(condition);
            }
        }
    }
}
