//! The member decision table.
//!
//! Every derived member is emitted iff its option flag is set *and* the base type can support it. This module only
//! decides; [`super::members`] turns the decisions into tokens.

use crate::descriptor::WrapperDescriptor;
use crate::options::Options;
use crate::semantic::{Operator, TraitId};

/// How `Display` for the wrapper is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayVia {
    Display,
    Debug,
}

/// How two wrappers are compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityVia {
    /// `self.value == other.value`; the base type is `Eq`.
    Direct,
    /// `refine::structural_eq`, reflexive even for values unequal to themselves.
    Structural,
}

/// Which conversion impls to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `TryFrom<B> for W` + `From<W> for B`.
    Explicit,
    /// `From<B> for W` (no validation hook) + `From<W> for B` + `Deref` + `AsRef`.
    Implicit,
    /// `TryFrom<B> for W` (validation can fail) + `From<W> for B` + `Deref` + `AsRef`.
    ImplicitFallible,
}

/// The complete set of decisions for one wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPlan {
    pub derives: Vec<TraitId>,
    pub synthetic_validate: bool,
    pub try_create: bool,
    pub display: Option<DisplayVia>,
    pub equality: Option<EqualityVia>,
    pub hash: bool,
    pub eq: bool,
    pub partial_ord: bool,
    pub ord: bool,
    /// Cross-type equality with the base type; `Some(explicit_ne)`.
    pub cross_eq: Option<bool>,
    /// Cross-type ordering operators with the base type, each present only when the base supports it.
    pub cross_ord: Vec<Operator>,
    pub conversion: Option<Conversion>,
}

impl MemberPlan {
    pub fn decide(desc: &WrapperDescriptor) -> Self {
        let opts = desc.options;
        let ops = &desc.operators;
        let base_eq = ops.supports(Operator::Eq);

        let derives = [TraitId::Debug, TraitId::Clone, TraitId::Copy]
            .into_iter()
            .filter(|t| desc.has_trait(*t))
            .collect();

        let display = if !opts.contains(Options::TO_STRING) {
            None
        } else if desc.has_trait(TraitId::Display) {
            Some(DisplayVia::Display)
        } else if desc.has_trait(TraitId::Debug) {
            Some(DisplayVia::Debug)
        } else {
            None
        };

        let equality = (opts.intersects(Options::EQUALS | Options::EQUATABLE) && base_eq).then(|| {
            if desc.implements_equatable_self {
                EqualityVia::Direct
            } else {
                EqualityVia::Structural
            }
        });
        let eq = equality.is_some() && opts.contains(Options::EQUATABLE) && desc.implements_equatable_self;
        let partial_ord = equality.is_some() && opts.contains(Options::COMPARABLE) && ops.full_ordering();
        let ord = partial_ord && eq && desc.implements_comparable_self;

        let cross_ord: Vec<Operator> = if opts.contains(Options::COMPARISON_OPERATORS) && base_eq {
            Operator::ORDERING.into_iter().filter(|op| ops.supports(*op)).collect()
        } else {
            Vec::new()
        };
        let cross_eq = (base_eq && (opts.contains(Options::EQUALITY_OPERATORS) || !cross_ord.is_empty()))
            .then(|| ops.supports(Operator::Ne));

        let conversion = if opts.contains(Options::EXPLICIT_CONVERSION) {
            Some(Conversion::Explicit)
        } else if opts.contains(Options::IMPLICIT_CONVERSION) {
            Some(if desc.hooks.validates() {
                Conversion::ImplicitFallible
            } else {
                Conversion::Implicit
            })
        } else {
            None
        };

        Self {
            derives,
            synthetic_validate: desc.hooks.needs_synthetic_validate(),
            try_create: desc.hooks.try_validate,
            display,
            equality,
            hash: equality.is_some() && desc.has_trait(TraitId::Hash),
            eq,
            partial_ord,
            ord,
            cross_eq,
            cross_ord,
            conversion,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::descriptor::Declaration;
    use crate::hooks::HookSet;
    use crate::paths::ModulePath;
    use crate::prober::{Capabilities, OperatorSupport};
    use crate::semantic::{PrimitiveKind, TypeDescriptor, TypeKind};

    fn descriptor(options: Options, hooks: HookSet, caps: Capabilities) -> WrapperDescriptor {
        let base = TypeDescriptor {
            key: "T".into(),
            written: "T".into(),
            name: "T".into(),
            namespace: ModulePath::none(),
            kind: TypeKind::Primitive(PrimitiveKind::Integer),
        };
        WrapperDescriptor::new(
            Declaration {
                name: "W".into(),
                namespace: ModulePath::crate_root(),
                visibility: "pub".into(),
                attributes: vec![],
                options,
            },
            &base,
            hooks,
            caps,
        )
    }

    fn int_caps() -> Capabilities {
        Capabilities {
            operators: OperatorSupport::all(),
            equatable_self: true,
            comparable_self: true,
            traits: [TraitId::Hash, TraitId::Display, TraitId::Debug, TraitId::Clone, TraitId::Copy]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_default_options_on_integer() {
        let plan = MemberPlan::decide(&descriptor(Options::default(), HookSet::default(), int_caps()));
        assert_eq!(plan.display, Some(DisplayVia::Display));
        assert_eq!(plan.equality, Some(EqualityVia::Direct));
        assert!(plan.hash && plan.eq && plan.partial_ord && plan.ord);
        assert_eq!(plan.cross_eq, Some(true));
        assert_eq!(plan.cross_ord, Operator::ORDERING.to_vec());
        assert_eq!(plan.conversion, None);
        assert!(!plan.try_create && !plan.synthetic_validate);
    }

    #[test]
    fn test_textual_base_never_orders() {
        let caps = Capabilities {
            operators: OperatorSupport::equality_only(),
            ..int_caps()
        };
        let plan = MemberPlan::decide(&descriptor(Options::all(), HookSet::default(), caps));
        assert!(plan.cross_ord.is_empty());
        assert!(!plan.partial_ord && !plan.ord);
        assert_eq!(plan.cross_eq, Some(true));
    }

    #[test]
    fn test_partial_ordering_is_individually_gated() {
        let mut operators = OperatorSupport::equality_only();
        operators.set(Operator::Lt, true);
        let caps = Capabilities {
            operators,
            equatable_self: false,
            comparable_self: false,
            traits: BTreeSet::new(),
        };
        let plan = MemberPlan::decide(&descriptor(
            Options::COMPARISON_OPERATORS,
            HookSet::default(),
            caps,
        ));
        assert_eq!(plan.cross_ord, vec![Operator::Lt]);
        // ordering needs cross-type equality as a supertrait
        assert_eq!(plan.cross_eq, Some(true));
        assert_eq!(plan.equality, None);
    }

    #[test]
    fn test_float_like_base_uses_structural_equality() {
        let caps = Capabilities {
            equatable_self: false,
            comparable_self: false,
            ..int_caps()
        };
        let plan = MemberPlan::decide(&descriptor(Options::default(), HookSet::default(), caps));
        assert_eq!(plan.equality, Some(EqualityVia::Structural));
        assert!(!plan.eq && !plan.ord);
        assert!(plan.partial_ord);
    }

    #[test]
    fn test_try_validate_alone_synthesizes_validate() {
        let hooks = HookSet {
            try_validate: true,
            ..HookSet::default()
        };
        let plan = MemberPlan::decide(&descriptor(Options::empty(), hooks, int_caps()));
        assert!(plan.synthetic_validate && plan.try_create);
    }

    #[test]
    fn test_explicit_wins_over_implicit() {
        let both = Options::EXPLICIT_CONVERSION | Options::IMPLICIT_CONVERSION;
        let plan = MemberPlan::decide(&descriptor(both, HookSet::default(), int_caps()));
        assert_eq!(plan.conversion, Some(Conversion::Explicit));

        let validated = HookSet {
            validate: true,
            ..HookSet::default()
        };
        let plan = MemberPlan::decide(&descriptor(Options::IMPLICIT_CONVERSION, validated, int_caps()));
        assert_eq!(plan.conversion, Some(Conversion::ImplicitFallible));
    }

    #[test]
    fn test_display_falls_back_to_debug() {
        let caps = Capabilities {
            traits: [TraitId::Debug].into_iter().collect(),
            ..int_caps()
        };
        let plan = MemberPlan::decide(&descriptor(Options::TO_STRING, HookSet::default(), caps));
        assert_eq!(plan.display, Some(DisplayVia::Debug));
        assert_eq!(plan.derives, vec![TraitId::Debug]);
    }
}
