//! Parsed source units that together form one generation run.

use crate::diagnostics::GenerationError;
use crate::paths::ModulePath;

/// One parsed Rust source file (or macro block) and the module it belongs to.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Display name used in diagnostics (usually a relative file path).
    pub name: String,
    pub module: ModulePath,
    pub file: syn::File,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, module: ModulePath, file: syn::File) -> Self {
        Self {
            name: name.into(),
            module,
            file,
        }
    }

    /// Parse `source` as a Rust file.
    ///
    /// ## Errors
    /// - [`GenerationError::Parse`] when the text is not a valid Rust file.
    pub fn parse(name: impl Into<String>, module: ModulePath, source: &str) -> Result<Self, GenerationError> {
        let name = name.into();
        let file = syn::parse_file(source).map_err(|err| {
            let start = err.span().start();
            GenerationError::Parse {
                unit: name.clone(),
                reason: format!("{} at {}:{}", err, start.line, start.column + 1),
            }
        })?;
        Ok(Self { name, module, file })
    }
}

impl SourceUnit {
    /// Every module of this unit in pre-order (file root first), inline `mod` blocks included.
    pub fn modules(&self) -> Vec<(ModulePath, &[syn::Item])> {
        let mut out = Vec::new();
        collect_modules(&self.file.items, self.module.clone(), &mut out);
        out
    }
}

fn collect_modules<'a>(items: &'a [syn::Item], module: ModulePath, out: &mut Vec<(ModulePath, &'a [syn::Item])>) {
    out.push((module.clone(), items));
    for item in items {
        if let syn::Item::Mod(item_mod) = item {
            if let Some((_, content)) = &item_mod.content {
                collect_modules(content, module.child(&item_mod.ident.to_string()), out);
            }
        }
    }
}

/// An ordered set of source units analyzed together.
///
/// Order is preserved so that candidate enumeration (and therefore output) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub units: Vec<SourceUnit>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn push(&mut self, unit: SourceUnit) {
        self.units.push(unit);
    }

    /// A single-unit compilation, rooted at `root` (`crate` or `self`).
    ///
    /// ## Errors
    /// - [`GenerationError::Parse`] when the text is not a valid Rust file.
    pub fn single(name: &str, root: &str, source: &str) -> Result<Self, GenerationError> {
        Ok(Self::from_units(vec![SourceUnit::parse(
            name,
            ModulePath::root(root),
            source,
        )?]))
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
