//! Hook traits a wrapper implements to take part in its own construction.
//!
//! A hook only applies when its type argument is exactly the wrapper's base type: `impl Validator<i64> for W` is
//! ignored for a wrapper over `i32`.

use crate::error::RefineError;

/// Rejects invalid values with a descriptive error.
///
/// When present, `create` returns this error unchanged.
pub trait Validator<T: ?Sized> {
    fn validate(value: &T) -> Result<(), RefineError>;
}

/// Accepts or rejects a value without explaining why.
///
/// Enables `try_create`. When it is the only validation hook, `create` reports a rejection as
/// [`RefineError::Rejected`].
pub trait FallibleValidator<T: ?Sized> {
    fn try_validate(value: &T) -> bool;
}

/// Normalizes a value before validation.
pub trait Transformer<T> {
    fn transform(value: T) -> T;
}
