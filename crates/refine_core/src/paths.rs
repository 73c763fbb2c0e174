//! Module paths and `use`-aware name resolution.
//!
//! The scanner, hook discovery and the type catalog all need to answer the same question: *which item does this path
//! name?* Rust has no runtime symbol table to ask, so resolution is done syntactically against the `use` declarations
//! visible in the enclosing module.
//!
//! ## Notes
//! - Resolution is per module: nested `mod` blocks do not inherit their parent's imports, mirroring Rust.
//! - Paths that cannot be resolved against the compilation are returned as written. This keeps extern crate paths
//!   (`chrono::NaiveDate`) and prelude names (`String`) stable.
//! - `refine::prelude::X` and `refine::hooks::X` are normalized to `refine::X` so identity checks have a single
//!   canonical spelling to compare against.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of the runtime crate whose items the generator recognizes.
pub const RUNTIME_CRATE: &str = "refine";

/// Items exported by the runtime crate that may be imported by name or glob.
pub const RUNTIME_EXPORTS: &[&str] = &["refined", "Validator", "FallibleValidator", "Transformer", "RefineError"];

/// Runtime sub-modules that re-export [`RUNTIME_EXPORTS`].
const RUNTIME_REEXPORT_MODULES: &[&str] = &["prelude", "hooks"];

/// Well-known std paths that are spelled by their prelude name once canonicalized.
const PRELUDE_ALIASES: &[(&str, &str)] = &[
    ("std::string::String", "String"),
    ("alloc::string::String", "String"),
    ("std::vec::Vec", "Vec"),
    ("alloc::vec::Vec", "Vec"),
    ("std::option::Option", "Option"),
    ("core::option::Option", "Option"),
    ("std::boxed::Box", "Box"),
    ("alloc::boxed::Box", "Box"),
    ("std::rc::Rc", "Rc"),
    ("alloc::rc::Rc", "Rc"),
    ("std::sync::Arc", "Arc"),
    ("alloc::sync::Arc", "Arc"),
    ("std::borrow::Cow", "Cow"),
    ("alloc::borrow::Cow", "Cow"),
    ("rust_decimal::Decimal", "Decimal"),
];

/// An absolute module path such as `crate::model`.
///
/// The first segment is the root the path is anchored at: `crate` for whole-crate compilations, `self` for
/// compilations that only see a block of items (the `refine!` macro). An empty path means "no module", which is the
/// namespace of primitives and prelude types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// The namespace of items that do not live in any module (primitives, prelude names).
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// A root anchored at `root` (`crate` or `self`).
    pub fn root(root: &str) -> Self {
        Self(vec![root.to_string()])
    }

    pub fn crate_root() -> Self {
        Self::root("crate")
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the path is anchored at a module-relative root (`self`) rather than `crate`.
    pub fn is_relative(&self) -> bool {
        self.0.first().is_some_and(|s| s == "self")
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// The enclosing module. The root is its own parent.
    pub fn parent(&self) -> Self {
        if self.0.len() <= 1 {
            return self.clone();
        }
        Self(self.0[..self.0.len() - 1].to_vec())
    }

    pub fn starts_with(&self, other: &ModulePath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Spell this module as seen from `from`, using `super::` hops for module-relative roots.
    ///
    /// ## Returns
    /// - Absolute spelling (`crate::a::b`) when the path is anchored at `crate` or an extern crate.
    /// - A `self::`/`super::` spelling when both paths are anchored at `self`.
    pub fn spelled_from(&self, from: &ModulePath) -> Vec<String> {
        if !(self.is_relative() && from.is_relative()) {
            return self.0.clone();
        }
        let common = self.0.iter().zip(from.0.iter()).take_while(|(a, b)| a == b).count();
        let hops = from.0.len() - common;
        let mut out = Vec::new();
        if hops == 0 {
            out.push("self".to_string());
        } else {
            out.extend(std::iter::repeat_n("super".to_string(), hops));
        }
        out.extend(self.0[common..].iter().cloned());
        out
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("::"))
    }
}

/// Bindings introduced by the `use` declarations of one module.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    /// Local name -> full path it was imported from.
    bindings: BTreeMap<String, Vec<String>>,
    /// Prefixes imported with `use prefix::*`.
    globs: Vec<Vec<String>>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the imports of a list of items belonging to `module`.
    pub fn from_items(items: &[syn::Item], module: &ModulePath) -> Self {
        let mut table = Self::new();
        for item in items {
            if let syn::Item::Use(item_use) = item {
                table.add_use_tree(&item_use.tree, Vec::new(), module);
            }
        }
        table
    }

    fn add_use_tree(&mut self, tree: &syn::UseTree, prefix: Vec<String>, module: &ModulePath) {
        match tree {
            syn::UseTree::Path(p) => {
                let mut next = prefix;
                next.push(p.ident.to_string());
                self.add_use_tree(&p.tree, next, module);
            }
            syn::UseTree::Name(n) => {
                let name = n.ident.to_string();
                if name == "self" {
                    // `use a::b::{self}` binds `b`.
                    if let Some(last) = prefix.last().cloned() {
                        self.bind(last, absolutize(&prefix, module));
                    }
                } else {
                    let mut full = prefix;
                    full.push(name.clone());
                    self.bind(name, absolutize(&full, module));
                }
            }
            syn::UseTree::Rename(r) => {
                let mut full = prefix;
                full.push(r.ident.to_string());
                self.bind(r.rename.to_string(), absolutize(&full, module));
            }
            syn::UseTree::Glob(_) => self.globs.push(absolutize(&prefix, module)),
            syn::UseTree::Group(g) => {
                for tree in &g.items {
                    self.add_use_tree(tree, prefix.clone(), module);
                }
            }
        }
    }

    pub fn bind(&mut self, local: String, full: Vec<String>) {
        self.bindings.insert(local, canonical_segments(full));
    }

    pub fn binding(&self, local: &str) -> Option<&[String]> {
        self.bindings.get(local).map(Vec::as_slice)
    }

    pub fn globs(&self) -> &[Vec<String>] {
        &self.globs
    }
}

/// Rewrite `self::`/`super::` prefixes of a `use` path into an absolute path.
fn absolutize(path: &[String], module: &ModulePath) -> Vec<String> {
    let mut base = module.clone();
    let mut rest = path;
    let mut anchored = false;
    while let Some(first) = rest.first() {
        match first.as_str() {
            "self" => {
                anchored = true;
                rest = &rest[1..];
            }
            "super" => {
                anchored = true;
                base = base.parent();
                rest = &rest[1..];
            }
            _ => break,
        }
    }
    if anchored {
        let mut out = base.segments().to_vec();
        out.extend(rest.iter().cloned());
        out
    } else {
        rest.to_vec()
    }
}

/// Normalize runtime re-export modules and well-known std paths.
pub fn canonical_segments(mut segments: Vec<String>) -> Vec<String> {
    if segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }
    if segments.len() == 3
        && segments[0] == RUNTIME_CRATE
        && RUNTIME_REEXPORT_MODULES.contains(&segments[1].as_str())
    {
        segments.remove(1);
    }
    let joined = segments.join("::");
    if let Some((_, alias)) = PRELUDE_ALIASES.iter().find(|(full, _)| *full == joined) {
        return vec![(*alias).to_string()];
    }
    segments
}

/// Items and modules known to exist in the compilation, used to anchor relative paths.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    modules: BTreeSet<ModulePath>,
    items: BTreeSet<Vec<String>>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: ModulePath) {
        self.modules.insert(module);
    }

    pub fn add_item(&mut self, module: &ModulePath, name: &str) {
        self.items.insert(module.child(name).segments().to_vec());
    }

    pub fn has_module(&self, module: &ModulePath) -> bool {
        self.modules.contains(module)
    }

    pub fn has_item(&self, path: &[String]) -> bool {
        self.items.contains(path)
    }
}

/// The resolution context of one module: where it lives and what it imports.
#[derive(Debug, Clone)]
pub struct Scope {
    pub module: ModulePath,
    pub imports: ImportTable,
    /// Whether unbound runtime export names (`refined`, `Validator`, ...) resolve into the runtime crate.
    pub implicit_prelude: bool,
}

impl Scope {
    pub fn new(module: ModulePath, imports: ImportTable, implicit_prelude: bool) -> Self {
        Self {
            module,
            imports,
            implicit_prelude,
        }
    }

    /// Resolve a path (as written) to its canonical segments.
    ///
    /// ## Notes
    /// - Order: `crate`/`self`/`super` anchors, explicit imports, items of the current module, glob imports, the
    ///   implicit runtime prelude, and finally the path as written.
    pub fn resolve(&self, written: &[String], index: &ItemIndex) -> Vec<String> {
        let Some(first) = written.first() else {
            return Vec::new();
        };

        match first.as_str() {
            "crate" => return canonical_segments(written.to_vec()),
            "self" | "super" => return canonical_segments(absolutize(written, &self.module)),
            _ => {}
        }

        if let Some(bound) = self.imports.binding(first) {
            let mut full = bound.to_vec();
            full.extend(written[1..].iter().cloned());
            return canonical_segments(full);
        }

        let local = self.module.child(first);
        if index.has_module(&local) || index.has_item(local.segments()) {
            let mut full = self.module.segments().to_vec();
            full.extend(written.iter().cloned());
            return full;
        }

        for glob in self.imports.globs() {
            let mut full = glob.clone();
            full.extend(written.iter().cloned());
            let full = canonical_segments(full);
            if is_runtime_export(&full) || index.has_item(&full) {
                return full;
            }
        }

        if self.implicit_prelude && written.len() == 1 && RUNTIME_EXPORTS.contains(&first.as_str()) {
            return vec![RUNTIME_CRATE.to_string(), first.clone()];
        }

        canonical_segments(written.to_vec())
    }

    /// Resolve a `syn::Path`, ignoring generic arguments.
    pub fn resolve_path(&self, path: &syn::Path, index: &ItemIndex) -> Vec<String> {
        let written: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        self.resolve(&written, index)
    }
}

/// Whether `segments` names one of the runtime crate's exports.
pub fn is_runtime_export(segments: &[String]) -> bool {
    segments.len() == 2 && segments[0] == RUNTIME_CRATE && RUNTIME_EXPORTS.contains(&segments[1].as_str())
}

/// Whether `segments` names the given runtime item (`refine::<name>`).
pub fn is_runtime_item(segments: &[String], name: &str) -> bool {
    is_runtime_export(segments) && segments[1] == name
}
