//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable: the operation that produced it did not
/// change any state, and the presentation layer decides how to word it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Text that should hold an integer did not parse as one.
    #[error("invalid input for {field}: {input:?} is not an integer")]
    InvalidInput { field: String, input: String },

    /// A quantity parsed fine but was below zero.
    #[error("negative quantity for {field}: {value}")]
    NegativeQuantity { field: String, value: i64 },

    /// The item is not part of the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The class is not part of the configured class list.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A positional selection fell outside the list.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A statistic was requested over a class with no grades.
    #[error("class {0} has no grades")]
    EmptyClass(String),

    /// A percentage was requested for a grade whose maximum score is zero.
    #[error("division by zero: maximum score is 0")]
    DivisionByZero,

    /// An amount or count no longer fits its integer type.
    #[error("arithmetic overflow")]
    Overflow,

    /// The catalog definition itself is malformed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The grade book class list is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, input: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            input: input.into(),
        }
    }

    pub fn negative_quantity(field: impl Into<String>, value: i64) -> Self {
        Self::NegativeQuantity {
            field: field.into(),
            value,
        }
    }

    pub fn unknown_item(name: impl Into<String>) -> Self {
        Self::UnknownItem(name.into())
    }

    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass(name.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn empty_class(name: impl Into<String>) -> Self {
        Self::EmptyClass(name.into())
    }

    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidInput { .. } => "invalid_input",
            DomainError::NegativeQuantity { .. } => "negative_quantity",
            DomainError::UnknownItem(_) => "unknown_item",
            DomainError::UnknownClass(_) => "unknown_class",
            DomainError::IndexOutOfRange { .. } => "index_out_of_range",
            DomainError::EmptyClass(_) => "empty_class",
            DomainError::DivisionByZero => "division_by_zero",
            DomainError::Overflow => "overflow",
            DomainError::InvalidCatalog(_) => "invalid_catalog",
            DomainError::InvalidConfiguration(_) => "invalid_configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = DomainError::invalid_input("Brat", "abc");
        assert_eq!(err.to_string(), "invalid input for Brat: \"abc\" is not an integer");

        let err = DomainError::index_out_of_range(4, 2);
        assert_eq!(err.to_string(), "index 4 out of range (len 2)");
    }

    #[test]
    fn codes_are_distinct_per_kind() {
        assert_eq!(DomainError::DivisionByZero.code(), "division_by_zero");
        assert_eq!(DomainError::empty_class("Art").code(), "empty_class");
        assert_ne!(
            DomainError::unknown_item("x").code(),
            DomainError::unknown_class("x").code()
        );
    }
}
