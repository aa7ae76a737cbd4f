/// The fixed set of dunder-dispatching builtins the Rewriter recognizes
/// (`spec.md` §4.4: "`g(e)` where `g` is one of a fixed set of
/// dunder-dispatching builtins"), paired with the dunder method name a
/// deprecated implementation would be declared under.
const MAGIC_BUILTINS: &[(&str, &str)] = &[
    ("str", "__str__"),
    ("repr", "__repr__"),
    ("len", "__len__"),
    ("bool", "__bool__"),
    ("int", "__int__"),
    ("float", "__float__"),
    ("bytes", "__bytes__"),
    ("hash", "__hash__"),
    ("iter", "__iter__"),
    ("next", "__next__"),
];

/// If `builtin_name` is one of the recognized dunder-dispatching builtins,
/// return the dunder method name a deprecated implementation would use.
pub fn dunder_for_builtin(builtin_name: &str) -> Option<&'static str> {
    MAGIC_BUILTINS
        .iter()
        .find(|(name, _)| *name == builtin_name)
        .map(|(_, dunder)| *dunder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_builtins() {
        assert_eq!(dunder_for_builtin("str"), Some("__str__"));
        assert_eq!(dunder_for_builtin("next"), Some("__next__"));
    }

    #[test]
    fn rejects_unknown_builtins() {
        assert_eq!(dunder_for_builtin("print"), None);
    }
}
