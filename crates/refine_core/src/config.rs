//! Generator configuration.

use crate::paths::ModulePath;

/// Settings for one generation run.
///
/// The defaults describe a whole-crate run driven by the CLI: module paths are anchored at `crate`, the marker must
/// be imported explicitly and every rendered unit starts with a `// @generated` header. Use
/// [`GeneratorConfig::macro_expansion`] for in-place expansion of a `refine! { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Unbound `refined`, `Validator`, ... resolve into the runtime crate without a `use`.
    pub implicit_prelude: bool,
    /// Prepend the descriptor summary header to rendered units.
    pub emit_header: bool,
    /// Root segment of module paths (`crate` or `self`).
    pub module_root: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            implicit_prelude: false,
            emit_header: true,
            module_root: "crate".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for expanding a block of items in place.
    pub fn macro_expansion() -> Self {
        Self {
            implicit_prelude: true,
            emit_header: false,
            module_root: "self".to_string(),
        }
    }

    pub fn with_implicit_prelude(mut self, enabled: bool) -> Self {
        self.implicit_prelude = enabled;
        self
    }

    pub fn with_header(mut self, enabled: bool) -> Self {
        self.emit_header = enabled;
        self
    }

    pub fn with_module_root(mut self, root: impl Into<String>) -> Self {
        self.module_root = root.into();
        self
    }

    pub fn root_module(&self) -> ModulePath {
        ModulePath::root(&self.module_root)
    }
}
