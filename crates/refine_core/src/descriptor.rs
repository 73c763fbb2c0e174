//! The per-candidate wrapper descriptor.
//!
//! A [`WrapperDescriptor`] is everything synthesis needs, with no reference back to syntax trees or the catalog. It is
//! plain data (`Send + Sync`), immutable once built, and hashable so callers can cache rendered output by content.

use std::collections::BTreeSet;

use crate::hooks::HookSet;
use crate::options::Options;
use crate::paths::ModulePath;
use crate::prober::{Capabilities, OperatorSupport};
use crate::semantic::{TraitId, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrapperDescriptor {
    pub name: String,
    /// Module the wrapper is declared in.
    pub namespace: ModulePath,
    /// Visibility as written on the placeholder (`pub`, `pub(crate)`, or empty).
    pub visibility: String,
    /// Placeholder attributes carried over to the generated struct, as token text.
    pub attributes: Vec<String>,
    /// Base type as written at the declaration.
    pub base_type: String,
    /// Last path segment of the base type (`Person`, `Vec<u8>`).
    pub base_type_name: String,
    /// Canonical, fully qualified base type.
    pub base_type_qualified: String,
    pub base_namespace: ModulePath,
    pub options: Options,
    pub hooks: HookSet,
    pub operators: OperatorSupport,
    pub implements_equatable_self: bool,
    pub implements_comparable_self: bool,
    /// Auxiliary std traits of the base type (`Hash`, `Display`, `Debug`, `Clone`, `Copy`).
    pub traits: BTreeSet<TraitId>,
}

/// Identity of the declaration a descriptor is built from.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub namespace: ModulePath,
    pub visibility: String,
    pub attributes: Vec<String>,
    pub options: Options,
}

impl WrapperDescriptor {
    pub fn new(decl: Declaration, base: &TypeDescriptor, hooks: HookSet, capabilities: Capabilities) -> Self {
        Self {
            name: decl.name,
            namespace: decl.namespace,
            visibility: decl.visibility,
            attributes: decl.attributes,
            base_type: base.written.clone(),
            base_type_name: base.name.clone(),
            base_type_qualified: base.key.clone(),
            base_namespace: base.namespace.clone(),
            options: decl.options,
            hooks,
            operators: capabilities.operators,
            implements_equatable_self: capabilities.equatable_self,
            implements_comparable_self: capabilities.comparable_self,
            traits: capabilities.traits,
        }
    }

    /// Fully qualified path of the wrapper (`crate::model::Score`).
    pub fn qualified_name(&self) -> String {
        self.namespace.child(&self.name).to_string()
    }

    pub fn has_trait(&self, trait_id: TraitId) -> bool {
        self.traits.contains(&trait_id)
    }

    /// Whether the base type must be spelled fully qualified from the wrapper's module.
    pub fn needs_qualified_base(&self) -> bool {
        !self.base_namespace.is_empty() && self.base_namespace != self.namespace
    }
}
