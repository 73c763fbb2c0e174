//! Hook discovery.
//!
//! A wrapper customizes construction by implementing runtime hook traits for itself:
//!
//! ```ignore
//! impl refine::Transformer<i32> for X10 {
//!     fn transform(value: i32) -> i32 { value * 10 }
//! }
//! ```
//!
//! A hook is wired only when its trait argument is exactly the base type. `impl Validator<i64> for W` on a wrapper of
//! `i32` is ignored without a diagnostic.

use std::fmt;

use crate::catalog::TypeCatalog;
use crate::paths::is_runtime_item;

/// Runtime trait names of the three hooks.
pub const VALIDATOR: &str = "Validator";
pub const FALLIBLE_VALIDATOR: &str = "FallibleValidator";
pub const TRANSFORMER: &str = "Transformer";

/// Which hooks a candidate implements for its base type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HookSet {
    pub validate: bool,
    pub try_validate: bool,
    pub transform: bool,
}

impl HookSet {
    /// Whether construction can fail.
    pub fn validates(&self) -> bool {
        self.validate || self.try_validate
    }

    /// A `validate` function must be synthesized from `try_validate`.
    pub fn needs_synthetic_validate(&self) -> bool {
        self.try_validate && !self.validate
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.validate {
            names.push(VALIDATOR);
        }
        if self.try_validate {
            names.push(FALLIBLE_VALIDATOR);
        }
        if self.transform {
            names.push(TRANSFORMER);
        }
        names
    }
}

impl fmt::Display for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// Find the hooks `wrapper_path` implements over exactly `base_key`.
pub fn discover(catalog: &TypeCatalog, wrapper_path: &str, base_key: &str) -> HookSet {
    let mut hooks = HookSet::default();
    for imp in catalog.impls_for(wrapper_path) {
        if imp.trait_args.len() != 1 || imp.trait_args[0] != base_key {
            continue;
        }
        if is_runtime_item(&imp.trait_path, VALIDATOR) {
            hooks.validate = true;
        } else if is_runtime_item(&imp.trait_path, FALLIBLE_VALIDATOR) {
            hooks.try_validate = true;
        } else if is_runtime_item(&imp.trait_path, TRANSFORMER) {
            hooks.transform = true;
        }
    }
    tracing::debug!(wrapper = wrapper_path, hooks = %hooks, "discovered hooks");
    hooks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::Compilation;

    fn hooks_of(source: &str, wrapper: &str, base: &str) -> HookSet {
        let compilation = Compilation::single("lib.rs", "crate", source).unwrap();
        let catalog = TypeCatalog::build(&compilation, false);
        discover(&catalog, wrapper, base)
    }

    #[test]
    fn test_all_three_hooks() {
        let hooks = hooks_of(
            r#"
            use refine::prelude::*;
            pub struct W;
            impl Validator<i32> for W { fn validate(v: &i32) -> Result<(), RefineError> { Ok(()) } }
            impl FallibleValidator<i32> for W { fn try_validate(v: &i32) -> bool { true } }
            impl refine::Transformer<i32> for W { fn transform(v: i32) -> i32 { v } }
            "#,
            "crate::W",
            "i32",
        );
        assert!(hooks.validate && hooks.try_validate && hooks.transform);
        assert!(!hooks.needs_synthetic_validate());
    }

    #[test]
    fn test_mismatched_base_is_not_wired() {
        let hooks = hooks_of(
            r#"
            use refine::Validator;
            pub struct W;
            impl Validator<i64> for W { fn validate(v: &i64) -> Result<(), refine::RefineError> { Ok(()) } }
            "#,
            "crate::W",
            "i32",
        );
        assert_eq!(hooks, HookSet::default());
    }

    #[test]
    fn test_foreign_trait_with_same_name_is_ignored() {
        let hooks = hooks_of(
            r#"
            mod other { pub trait Transformer<T> { fn transform(v: T) -> T; } }
            use other::Transformer;
            pub struct W;
            impl Transformer<i32> for W { fn transform(v: i32) -> i32 { v } }
            "#,
            "crate::W",
            "i32",
        );
        assert!(!hooks.transform);
    }

    #[test]
    fn test_hook_in_other_module_matches_by_canonical_key() {
        let hooks = hooks_of(
            r#"
            pub struct W;
            mod hooks {
                use refine::FallibleValidator;
                use super::W;
                impl FallibleValidator<::std::string::String> for W { fn try_validate(v: &String) -> bool { true } }
            }
            "#,
            "crate::W",
            "String",
        );
        assert!(hooks.try_validate);
        assert!(hooks.needs_synthetic_validate());
    }
}
