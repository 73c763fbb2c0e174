//! Runtime support for refined wrapper types.
//!
//! Wrappers produced by `refine-gen` (or expanded in place by [`refine!`]) call into this crate by absolute path:
//! the hook traits a wrapper may implement, the error its constructors return, and the equality fallback used for
//! bases without a total equality.
//!
//! ```ignore
//! use refine::prelude::*;
//!
//! refine! {
//!     #[refined(i32)]
//!     pub struct NonNegative;
//!
//!     impl Validator<i32> for NonNegative {
//!         fn validate(value: &i32) -> Result<(), RefineError> {
//!             if *value < 0 { Err(RefineError::invalid("must be non-negative")) } else { Ok(()) }
//!         }
//!     }
//! }
//!
//! assert!(NonNegative::create(-1).is_err());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod hooks;
pub mod prelude;

pub use error::{FieldViolation, RefineError};
pub use hooks::{FallibleValidator, Transformer, Validator};
pub use refine_derive::{refine, refined};

/// Equality that treats a value as equal to itself even when its `PartialEq` is not reflexive.
///
/// Used by generated `PartialEq` impls for bases without `Eq` (floats, or types containing them), so that a wrapper
/// always equals itself: two values are equal when `==` says so, or when neither is equal to itself (`NaN`).
pub fn structural_eq<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    #[allow(clippy::eq_op)]
    let unordered = a != a && b != b;
    a == b || unordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_eq_is_reflexive_for_nan() {
        assert!(structural_eq(&f64::NAN, &f64::NAN));
        assert!(structural_eq(&1.5_f64, &1.5));
        assert!(!structural_eq(&1.5_f64, &f64::NAN));
    }

    #[test]
    fn test_structural_eq_on_unsized() {
        assert!(structural_eq("abc", "abc"));
        assert!(!structural_eq::<[f32]>(&[1.0, 2.0], &[1.0, 3.0]));
    }
}
