//! Capability prober: what a base type can do, independent of what the user asked for.
//!
//! ## Notes
//! - Operator support follows a tiered policy:
//!   1. primitive-like types (integers, floats, `char`, `Decimal`) support all six operators; fieldless enums are
//!      primitive-like too but only get the operators their `PartialEq`/`PartialOrd` derives or impls provide,
//!   2. textual types and `bool` support only `==`/`!=`; ordering is never derived for them,
//!   3. everything else is probed through the [`SemanticModel`].
//! - Self-equatable / self-comparable are trait lookups (`Eq` / `Ord` closed over the base type itself). An impl of
//!   `PartialEq<Other>` says nothing about comparing the base type with itself.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::semantic::{InterfaceRef, Operator, PrimitiveKind, SemanticModel, TraitId, TypeDescriptor, TypeKind};

/// Which of the six relational operators the base type supports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatorSupport(BTreeMap<Operator, bool>);

impl OperatorSupport {
    pub fn none() -> Self {
        Self(Operator::ALL.into_iter().map(|op| (op, false)).collect())
    }

    pub fn all() -> Self {
        Self(Operator::ALL.into_iter().map(|op| (op, true)).collect())
    }

    pub fn equality_only() -> Self {
        let mut support = Self::none();
        support.set(Operator::Eq, true);
        support.set(Operator::Ne, true);
        support
    }

    pub fn from_set(ops: &BTreeSet<Operator>) -> Self {
        Self(Operator::ALL.into_iter().map(|op| (op, ops.contains(&op))).collect())
    }

    pub fn set(&mut self, op: Operator, supported: bool) {
        self.0.insert(op, supported);
    }

    pub fn supports(&self, op: Operator) -> bool {
        self.0.get(&op).copied().unwrap_or(false)
    }

    /// Every ordering operator is available.
    pub fn full_ordering(&self) -> bool {
        Operator::ORDERING.into_iter().all(|op| self.supports(op))
    }

    pub fn any_ordering(&self) -> bool {
        Operator::ORDERING.into_iter().any(|op| self.supports(op))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, bool)> + '_ {
        self.0.iter().map(|(op, supported)| (*op, *supported))
    }
}

impl Default for OperatorSupport {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for OperatorSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(op, on)| format!("{op}: {on}")).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Everything the synthesizer needs to know about a base type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub operators: OperatorSupport,
    pub equatable_self: bool,
    pub comparable_self: bool,
    /// Other std traits that influence emission (`Hash`, `Display`, `Debug`, `Clone`, `Copy`).
    pub traits: BTreeSet<TraitId>,
}

/// Traits probed in addition to the relational ones.
pub const AUXILIARY_TRAITS: &[TraitId] = &[
    TraitId::Hash,
    TraitId::Display,
    TraitId::Debug,
    TraitId::Clone,
    TraitId::Copy,
];

/// Operator support for `base` under the tiered policy.
pub fn operator_support(model: &dyn SemanticModel, base: &TypeDescriptor) -> OperatorSupport {
    match base.kind {
        TypeKind::Primitive(PrimitiveKind::Enum) => OperatorSupport::from_set(&model.list_operators(base)),
        TypeKind::Primitive(_) => OperatorSupport::all(),
        TypeKind::Textual | TypeKind::Boolean => OperatorSupport::equality_only(),
        _ => OperatorSupport::from_set(&model.list_operators(base)),
    }
}

/// Whether `interfaces` contain `trait_id` closed over the type identified by `self_key`.
///
/// An implementation counts as self-referential when it has no right-hand side, names `Self`, or names the type
/// itself.
pub fn implements_self(interfaces: &BTreeSet<InterfaceRef>, trait_id: TraitId, self_key: &str) -> bool {
    interfaces.iter().any(|i| {
        i.trait_id == trait_id
            && match &i.rhs {
                None => true,
                Some(rhs) => rhs == "Self" || rhs == self_key,
            }
    })
}

/// Probe every capability of `base`.
pub fn probe(model: &dyn SemanticModel, base: &TypeDescriptor) -> Capabilities {
    let interfaces = model.list_interfaces(base);
    let traits = AUXILIARY_TRAITS
        .iter()
        .copied()
        .filter(|t| implements_self(&interfaces, *t, &base.key))
        .collect();
    let capabilities = Capabilities {
        operators: operator_support(model, base),
        equatable_self: implements_self(&interfaces, TraitId::Eq, &base.key),
        comparable_self: implements_self(&interfaces, TraitId::Ord, &base.key),
        traits,
    };
    tracing::debug!(
        base = %base.key,
        operators = %capabilities.operators,
        equatable = capabilities.equatable_self,
        comparable = capabilities.comparable_self,
        "probed base type"
    );
    capabilities
}
