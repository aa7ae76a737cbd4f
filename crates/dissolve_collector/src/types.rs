use std::fmt;

use ruff_python_ast::Expr;
use ruff_text_size::TextRange;
use rustc_hash::FxHashMap;

/// What kind of construct a `ReplaceInfo` was derived from (`spec.md` §3).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Function,
    AsyncFunction,
    InstanceMethod,
    /// An `async def` method defined inside a class (neither `@staticmethod`
    /// nor `@classmethod`). Kept distinct from `AsyncFunction` — which is
    /// also used for module-level `async def`s with no receiver at all —
    /// so `has_receiver()` can tell the two apart: an in-class async method
    /// gets a `self` parameter spliced in at collection time just like
    /// `InstanceMethod` does, and argument binding needs to know that.
    AsyncMethod,
    ClassMethod,
    StaticMethod,
    Property,
    Class,
    ClassAttribute,
    ModuleAttribute,
}

impl ConstructKind {
    /// Whether the construct's `parameters` list has an implicit receiver
    /// as its first entry (`spec.md` §3: "For methods the implicit receiver
    /// parameter is recorded as the first entry").
    pub fn has_receiver(self) -> bool {
        matches!(
            self,
            Self::InstanceMethod | Self::AsyncMethod | Self::ClassMethod | Self::Property
        )
    }

    pub fn is_callable(self) -> bool {
        !matches!(self, Self::ClassAttribute | Self::ModuleAttribute)
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Function => "free function",
            Self::AsyncFunction => "async function",
            Self::InstanceMethod => "instance method",
            Self::AsyncMethod => "async method",
            Self::ClassMethod => "class method",
            Self::StaticMethod => "static method",
            Self::Property => "property",
            Self::Class => "class",
            Self::ClassAttribute => "class attribute",
            Self::ModuleAttribute => "module attribute",
        };
        f.write_str(s)
    }
}

/// One declared parameter of a deprecated construct (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub has_default: bool,
    pub default_source_text: Option<String>,
    pub variadic_positional: bool,
    pub variadic_keyword: bool,
    pub keyword_only: bool,
}

impl ParameterInfo {
    pub fn receiver(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_default: false,
            default_source_text: None,
            variadic_positional: false,
            variadic_keyword: false,
            keyword_only: false,
        }
    }
}

/// A parsed replacement-template expression, kept alongside the source text
/// it was extracted from so substitution can fall back to a textual splice
/// when a parameter reference appears somewhere the tree-walk doesn't
/// rewrite structurally (e.g. inside an f-string).
#[derive(Debug, Clone)]
pub struct Template {
    pub expr: Expr,
    pub source_text: String,
    pub range: TextRange,
}

/// One deprecated construct the Collector found a usable replacement for.
#[derive(Debug, Clone)]
pub struct ReplaceInfo {
    pub qualified_name: String,
    pub simple_name: String,
    pub construct_kind: ConstructKind,
    pub parameters: Vec<ParameterInfo>,
    pub replacement_template: Template,
    pub since: Option<String>,
    pub remove_in: Option<String>,
    pub message: Option<String>,
    /// Additive over `spec.md` §3: see `SPEC_FULL.md` §4.2. Never
    /// auto-removed by version-bounded cleanup, only by `--all`.
    pub temporary: bool,
    pub declaring_class: Option<String>,
    pub defined_in: std::path::PathBuf,
    pub definition_range: TextRange,
}

impl ReplaceInfo {
    pub fn receiver_parameter(&self) -> Option<&ParameterInfo> {
        self.construct_kind
            .has_receiver()
            .then(|| self.parameters.first())
            .flatten()
    }
}

/// Why the Collector saw a marker but could not produce a usable template
/// (`spec.md` §3).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureReason {
    ComplexBody,
    NoReturn,
    RecursiveCall,
    Lambda,
    DynamicMarkerArgs,
    SyntacticallyInvalidTemplate,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ComplexBody => "complex_body",
            Self::NoReturn => "no_return",
            Self::RecursiveCall => "recursive_call",
            Self::Lambda => "lambda",
            Self::DynamicMarkerArgs => "dynamic_marker_args",
            Self::SyntacticallyInvalidTemplate => "syntactically_invalid_template",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct UnreplaceableConstruct {
    pub qualified_name: String,
    pub construct_kind: ConstructKind,
    pub failure_reason: FailureReason,
    pub message: String,
    pub defined_in: std::path::PathBuf,
    pub definition_range: TextRange,
}

/// The output of collecting one module plus its transitively-collected
/// imports (`spec.md` §3/§4.2).
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    pub replacements: FxHashMap<String, ReplaceInfo>,
    pub unreplaceable: FxHashMap<String, UnreplaceableConstruct>,
    /// class qualified name -> base class qualified names, in MRO order.
    pub inheritance: FxHashMap<String, Vec<String>>,
}

impl CollectionResult {
    pub fn merge(&mut self, other: CollectionResult) {
        for (name, info) in other.replacements {
            self.unreplaceable.remove(&name);
            self.replacements.entry(name).or_insert(info);
        }
        for (name, info) in other.unreplaceable {
            if !self.replacements.contains_key(&name) {
                self.unreplaceable.entry(name).or_insert(info);
            }
        }
        for (class, bases) in other.inheritance {
            self.inheritance.entry(class).or_insert(bases);
        }
    }

    /// Walk the inheritance map from `class` looking for a class that has a
    /// `ReplaceInfo` for `method_simple_name` declared on it directly,
    /// breaking cycles with a visited-set guard (`spec.md` §3 invariant:
    /// "cycles are tolerated in the input but broken during lookup").
    pub fn resolve_method_on_class<'a>(
        &'a self,
        class: &str,
        qualify: impl Fn(&str, &str) -> String,
        method_simple_name: &str,
    ) -> Option<&'a ReplaceInfo> {
        let mut visited = rustc_hash::FxHashSet::default();
        let mut frontier = vec![class.to_string()];
        while let Some(current) = frontier.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let candidate = qualify(&current, method_simple_name);
            if let Some(info) = self.replacements.get(&candidate) {
                if info.declaring_class.as_deref() == Some(current.as_str()) {
                    return Some(info);
                }
            }
            if let Some(bases) = self.inheritance.get(&current) {
                frontier.extend(bases.iter().cloned());
            }
        }
        None
    }
}
