//! Requested-capability flags and their constant folding.
//!
//! Options are what the *user asks for*; whether the base type can actually support a member is decided separately by
//! the capability prober. Both must agree before a member is emitted.
//!
//! ## Notes
//! - Folding accepts flag names (optionally qualified, e.g. `Options::ToString`), `|` combinations, parentheses and
//!   integer literal bitmasks. Any other expression is rejected for the candidate; there is no symbolic fallback.
//! - Lookup via [`from_name`] is **case-sensitive**.

use bitflags::bitflags;
use quote::ToTokens;

use crate::diagnostics::GenerationError;

bitflags! {
    /// Generation features requested on a `#[refined(...)]` declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Options: u16 {
        const TO_STRING = 1 << 0;
        const EQUALS = 1 << 1;
        const EQUATABLE = 1 << 2;
        const EQUALITY_OPERATORS = 1 << 3;
        const COMPARABLE = 1 << 4;
        const COMPARISON_OPERATORS = 1 << 5;
        const EXPLICIT_CONVERSION = 1 << 6;
        const IMPLICIT_CONVERSION = 1 << 7;

        const DEFAULT = Self::TO_STRING.bits()
            | Self::EQUALS.bits()
            | Self::EQUATABLE.bits()
            | Self::EQUALITY_OPERATORS.bits()
            | Self::COMPARABLE.bits()
            | Self::COMPARISON_OPERATORS.bits();
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::DEFAULT
    }
}

/// Individual flags in declaration order, with their attribute spelling.
pub const FLAGS: &[(&str, Options)] = &[
    ("ToString", Options::TO_STRING),
    ("Equals", Options::EQUALS),
    ("Equatable", Options::EQUATABLE),
    ("EqualityOperators", Options::EQUALITY_OPERATORS),
    ("Comparable", Options::COMPARABLE),
    ("ComparisonOperators", Options::COMPARISON_OPERATORS),
    ("ExplicitConversion", Options::EXPLICIT_CONVERSION),
    ("ImplicitConversion", Options::IMPLICIT_CONVERSION),
];

/// Named bundles accepted alongside the individual flags.
const BUNDLES: &[(&str, Options)] = &[
    ("Default", Options::DEFAULT),
    ("All", Options::all()),
    ("None", Options::empty()),
];

/// Resolve an attribute spelling to its flag value.
pub fn from_name(name: &str) -> Option<Options> {
    FLAGS
        .iter()
        .chain(BUNDLES.iter())
        .find(|(spelling, _)| *spelling == name)
        .map(|(_, flags)| *flags)
}

impl Options {
    /// Names of the individual flags set, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        FLAGS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl std::fmt::Display for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&names.join(" | "))
        }
    }
}

/// Fold a flags expression into an [`Options`] value.
///
/// ## Errors
/// - [`GenerationError::UnresolvedOptions`] when the expression uses anything other than flag names, `|`,
///   parentheses or integer literals, names an unknown flag, or sets unknown bits.
pub fn fold(expr: &syn::Expr) -> Result<Options, GenerationError> {
    let unresolved = || GenerationError::UnresolvedOptions {
        expr: expr.to_token_stream().to_string(),
    };

    match expr {
        syn::Expr::Paren(p) => fold(&p.expr),
        syn::Expr::Group(g) => fold(&g.expr),
        syn::Expr::Binary(b) if matches!(b.op, syn::BinOp::BitOr(_)) => Ok(fold(&b.left)? | fold(&b.right)?),
        syn::Expr::Path(p) if p.qself.is_none() => {
            let segments: Vec<String> = p.path.segments.iter().map(|s| s.ident.to_string()).collect();
            let (last, qualifier) = segments.split_last().ok_or_else(unresolved)?;
            if qualifier.last().is_some_and(|q| q != "Options") {
                return Err(unresolved());
            }
            from_name(last).ok_or_else(unresolved)
        }
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(int), ..
        }) => {
            let bits: u16 = int.base10_parse().map_err(|_| unresolved())?;
            Options::from_bits(bits).ok_or_else(unresolved)
        }
        _ => Err(unresolved()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold_str(src: &str) -> Result<Options, GenerationError> {
        fold(&syn::parse_str::<syn::Expr>(src).unwrap())
    }

    #[test]
    fn test_default_bundle() {
        let d = Options::default();
        assert!(d.contains(Options::TO_STRING | Options::EQUALS | Options::COMPARISON_OPERATORS));
        assert!(!d.intersects(Options::EXPLICIT_CONVERSION | Options::IMPLICIT_CONVERSION));
    }

    #[test]
    fn test_fold_bitor_chain() {
        let opts = fold_str("ToString | ComparisonOperators | ExplicitConversion").unwrap();
        assert_eq!(
            opts,
            Options::TO_STRING | Options::COMPARISON_OPERATORS | Options::EXPLICIT_CONVERSION
        );
    }

    #[test]
    fn test_fold_qualified_and_parenthesized() {
        let opts = fold_str("(Options::Default | Options::ImplicitConversion)").unwrap();
        assert_eq!(opts, Options::DEFAULT | Options::IMPLICIT_CONVERSION);
    }

    #[test]
    fn test_fold_integer_literal() {
        assert_eq!(fold_str("0x3").unwrap(), Options::TO_STRING | Options::EQUALS);
        assert!(fold_str("0x100").is_err());
    }

    #[test]
    fn test_fold_rejects_calls_and_foreign_qualifiers() {
        assert!(matches!(
            fold_str("options()"),
            Err(GenerationError::UnresolvedOptions { .. })
        ));
        assert!(fold_str("Flags::ToString").is_err());
        assert!(fold_str("ToStrings").is_err());
    }

    #[test]
    fn test_display_lists_flags() {
        assert_eq!(
            (Options::TO_STRING | Options::EXPLICIT_CONVERSION).to_string(),
            "ToString | ExplicitConversion"
        );
        assert_eq!(Options::empty().to_string(), "None");
    }
}
