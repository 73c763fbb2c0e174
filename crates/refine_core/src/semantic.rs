//! Read-only semantic query interface.
//!
//! The capability prober never looks at syntax directly. It asks a [`SemanticModel`] three questions: what type does
//! this reference denote, which relational operators does it support, and which traits does it implement. The
//! [`crate::catalog::TypeCatalog`] answers them from the items of a compilation; tests can answer them from a table.

use std::collections::BTreeSet;
use std::fmt;

use crate::diagnostics::GenerationError;
use crate::paths::{ModulePath, Scope};

/// The six binary relational operators a base type may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
        Operator::Le,
        Operator::Ge,
    ];

    pub const ORDERING: [Operator; 4] = [Operator::Lt, Operator::Gt, Operator::Le, Operator::Ge];

    /// Canonical operator method name (`PartialEq::eq`, `PartialOrd::lt`, ...).
    pub fn method_name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Gt => "gt",
            Operator::Le => "le",
            Operator::Ge => "ge",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }

    /// The trait whose implementation provides this operator.
    pub fn provided_by(self) -> TraitId {
        match self {
            Operator::Eq | Operator::Ne => TraitId::PartialEq,
            _ => TraitId::PartialOrd,
        }
    }

    pub fn is_ordering(self) -> bool {
        self.provided_by() == TraitId::PartialOrd
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Std traits the catalog tracks for base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitId {
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Debug,
    Clone,
    Copy,
    Default,
}

impl TraitId {
    pub const ALL: [TraitId; 10] = [
        TraitId::PartialEq,
        TraitId::Eq,
        TraitId::PartialOrd,
        TraitId::Ord,
        TraitId::Hash,
        TraitId::Display,
        TraitId::Debug,
        TraitId::Clone,
        TraitId::Copy,
        TraitId::Default,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TraitId::PartialEq => "PartialEq",
            TraitId::Eq => "Eq",
            TraitId::PartialOrd => "PartialOrd",
            TraitId::Ord => "Ord",
            TraitId::Hash => "Hash",
            TraitId::Display => "Display",
            TraitId::Debug => "Debug",
            TraitId::Clone => "Clone",
            TraitId::Copy => "Copy",
            TraitId::Default => "Default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Std modules a qualified path to this trait may go through (`core::cmp::PartialEq`, `fmt::Display`).
    pub fn home_module(self) -> &'static str {
        match self {
            TraitId::PartialEq | TraitId::Eq | TraitId::PartialOrd | TraitId::Ord => "cmp",
            TraitId::Hash => "hash",
            TraitId::Display | TraitId::Debug => "fmt",
            TraitId::Clone => "clone",
            TraitId::Copy => "marker",
            TraitId::Default => "default",
        }
    }

    /// Whether the trait takes a right-hand-side type argument (`PartialEq<Rhs>`).
    pub fn has_rhs(self) -> bool {
        matches!(self, TraitId::PartialEq | TraitId::PartialOrd)
    }
}

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One trait implementation of a type.
///
/// `rhs` is `None` when the implementation is closed over the implementing type itself (`impl PartialEq for T`,
/// `PartialEq<Self>`, `PartialEq<T>`, or a derive). It carries the canonical key of the right-hand side otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceRef {
    pub trait_id: TraitId,
    pub rhs: Option<String>,
}

impl InterfaceRef {
    pub fn closed(trait_id: TraitId) -> Self {
        Self { trait_id, rhs: None }
    }

    pub fn with_rhs(trait_id: TraitId, rhs: impl Into<String>) -> Self {
        Self {
            trait_id,
            rhs: Some(rhs.into()),
        }
    }
}

/// Primitive-like kinds that are assumed to support the full operator set. `Enum` is capped by what the enum derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Integer,
    Float,
    Decimal,
    Char,
    Enum,
}

/// Std containers whose trait implementations are structural over their element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Option,
    Vec,
    Box,
    /// `Rc<T>` / `Arc<T>`.
    Shared,
}

/// The shape of a resolved type, as far as capability probing cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Textual,
    Boolean,
    Tuple(Vec<TypeDescriptor>),
    Array(Box<TypeDescriptor>),
    Reference(Box<TypeDescriptor>),
    Container(ContainerKind, Box<TypeDescriptor>),
    /// A struct, enum or union declared in the compilation, looked up by `path` (no generic arguments).
    Declared { path: String, args: Vec<TypeDescriptor> },
    /// A type the model knows nothing about.
    Opaque,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Canonical identity: absolute paths, std aliases collapsed. Two references denote the same type iff their keys
    /// are equal.
    pub key: String,
    /// The spelling the user wrote.
    pub written: String,
    /// Last path segment with generic arguments (`Person`, `Vec<u8>`); equal to `written` for non-path types.
    pub name: String,
    /// Module the type lives in; empty for primitives, prelude and structural types.
    pub namespace: ModulePath,
    pub kind: TypeKind,
}

/// Render a type the way rustfmt would print it (`Vec<u8>`, `&str`, `(i32, i32)`).
pub fn render_type(ty: &syn::Type) -> String {
    let file: syn::File = syn::parse_quote!(type __Refine = #ty;);
    let text = prettyplease::unparse(&file);
    text.trim()
        .strip_prefix("type __Refine = ")
        .and_then(|rest| rest.strip_suffix(';'))
        .map(str::to_string)
        .unwrap_or_else(|| quote::ToTokens::to_token_stream(ty).to_string())
}

/// Read-only semantic queries the prober depends on.
pub trait SemanticModel {
    /// Resolve a type reference written in `scope`.
    ///
    /// ## Errors
    /// - [`GenerationError::UnresolvableBaseType`] for types that cannot be wrapped at all (inferred `_`, `impl
    ///   Trait`, trait objects without a path, macros).
    fn resolve_type(&self, ty: &syn::Type, scope: &Scope) -> Result<TypeDescriptor, GenerationError>;

    /// Relational operators `ty` supports against itself.
    fn list_operators(&self, ty: &TypeDescriptor) -> BTreeSet<Operator> {
        let interfaces = self.list_interfaces(ty);
        Operator::ALL
            .into_iter()
            .filter(|op| interfaces.contains(&InterfaceRef::closed(op.provided_by())))
            .collect()
    }

    /// Trait implementations of `ty`.
    fn list_interfaces(&self, ty: &TypeDescriptor) -> BTreeSet<InterfaceRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_vocabulary() {
        assert_eq!(Operator::ALL.len(), 6);
        assert_eq!(Operator::Le.symbol(), "<=");
        assert_eq!(Operator::Ge.method_name(), "ge");
        assert!(Operator::Lt.is_ordering());
        assert!(!Operator::Ne.is_ordering());
    }

    #[test]
    fn test_render_type_is_compact() {
        let ty: syn::Type = syn::parse_str("std :: vec :: Vec < ( i32 , & 'static str ) >").unwrap();
        assert_eq!(render_type(&ty), "std::vec::Vec<(i32, &'static str)>");
    }

    #[test]
    fn test_trait_lookup_is_case_sensitive() {
        assert_eq!(TraitId::from_name("PartialOrd"), Some(TraitId::PartialOrd));
        assert_eq!(TraitId::from_name("partialord"), None);
        assert!(TraitId::PartialEq.has_rhs());
        assert!(!TraitId::Hash.has_rhs());
    }
}
