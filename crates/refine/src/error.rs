//! The error returned by wrapper constructors.

use std::fmt;

/// Why a value could not be wrapped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefineError {
    /// A validator rejected the value with its own message.
    #[error("{message}")]
    Invalid { message: String },

    /// A fallible validator returned `false`.
    #[error("value rejected by `{type_name}`")]
    Rejected { type_name: &'static str },

    /// One or more fields of a composite value failed validation.
    #[error("{}", FieldList(.0))]
    Fields(Vec<FieldViolation>),
}

/// A single failing field of a composite value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

struct FieldList<'a>(&'a [FieldViolation]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl RefineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// The error generated wrappers return when their fallible validator says no.
    pub fn rejected<W: ?Sized>() -> Self {
        Self::Rejected {
            type_name: core::any::type_name::<W>(),
        }
    }

    /// Collect per-field checks into one error.
    ///
    /// Each entry pairs a field name with the outcome of its check. Passing fields are dropped; when none fail the
    /// result is `Ok(())`.
    ///
    /// ```ignore
    /// RefineError::fields([
    ///     ("name", if p.name.is_empty() { Some("must not be empty") } else { None }),
    ///     ("age", if p.age > 150 { Some("is not plausible") } else { None }),
    /// ])?;
    /// ```
    pub fn fields<I, F, M>(checks: I) -> Result<(), RefineError>
    where
        I: IntoIterator<Item = (F, Option<M>)>,
        F: Into<String>,
        M: Into<String>,
    {
        let violations: Vec<FieldViolation> = checks
            .into_iter()
            .filter_map(|(field, failure)| {
                failure.map(|message| FieldViolation {
                    field: field.into(),
                    message: message.into(),
                })
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Fields(violations))
        }
    }

    /// The failing fields, when this error came from [`RefineError::fields`].
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Fields(violations) => violations,
            _ => &[],
        }
    }
}
