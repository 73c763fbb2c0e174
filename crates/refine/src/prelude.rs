//! Everything a module declaring refined wrappers usually needs.
//!
//! ```ignore
//! use refine::prelude::*;
//! ```

pub use crate::error::{FieldViolation, RefineError};
pub use crate::hooks::{FallibleValidator, Transformer, Validator};
pub use refine_derive::{refine, refined};
