//! Error types for the Kopis library.
//!
//! All fallible operations in this crate return [`Result`], whose error
//! type is the [`KopisError`] enum. Errors are reported synchronously at
//! the call that caused them and are never retryable: a failed predicate
//! build leaves no partially usable predicate behind.
//!
//! # Examples
//!
//! ```
//! use kopis::error::{KopisError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(KopisError::schema("Invalid field definition"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::predicate::element::QueryElementKind;
use crate::schema::field::FieldKind;

/// The main error type for Kopis operations.
///
/// Variants that carry structured data are part of the crate contract:
/// their messages always name the field path, element kind, and field
/// kind involved, so callers can diagnose a misconfigured query without
/// digging through backend internals.
#[derive(Error, Debug)]
pub enum KopisError {
    /// The field's declared type has no factory for the requested query element.
    #[error("field '{field}' of type '{field_kind}' does not support '{element}' predicates")]
    UnsupportedFieldType {
        /// Absolute path of the targeted field.
        field: String,
        /// The query element kind that was requested.
        element: QueryElementKind,
        /// The field's actual declared kind.
        field_kind: FieldKind,
    },

    /// Normalization broke the structure of a wildcard pattern.
    #[error("invalid wildcard pattern '{pattern}' on field '{field}': {reason}")]
    InvalidWildcardPattern {
        /// Absolute path of the targeted field.
        field: String,
        /// The raw pattern as given to the builder.
        pattern: String,
        /// What went wrong.
        reason: String,
    },

    /// A minimum-should-match constraint is out of range or conflicting.
    #[error("invalid minimum-should-match constraint: {0}")]
    InvalidMinimumShouldMatch(String),

    /// A builder was used again after its `build()` call.
    #[error("{builder} builder is not reusable: build() was already called")]
    IllegalBuilderReuse {
        /// Name of the offending builder, for diagnostics.
        builder: &'static str,
    },

    /// A field path is not declared in the schema.
    #[error("unknown field path '{0}'")]
    UnknownFieldPath(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Analysis-related errors (normalization, pattern handling, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query construction errors not covered by a structured variant
    #[error("Query error: {0}")]
    Query(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by external collaborators (normalizers, schema providers)
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with KopisError.
pub type Result<T> = std::result::Result<T, KopisError>;

impl KopisError {
    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        KopisError::Schema(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        KopisError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        KopisError::Query(msg.into())
    }

    /// Create a new unsupported-field-type error.
    pub fn unsupported_field_type<S: Into<String>>(
        field: S,
        element: QueryElementKind,
        field_kind: FieldKind,
    ) -> Self {
        KopisError::UnsupportedFieldType {
            field: field.into(),
            element,
            field_kind,
        }
    }

    /// Create a new invalid-wildcard-pattern error.
    pub fn invalid_wildcard_pattern<S, P, R>(field: S, pattern: P, reason: R) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        R: Into<String>,
    {
        KopisError::InvalidWildcardPattern {
            field: field.into(),
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid-minimum-should-match error.
    pub fn invalid_minimum_should_match<S: Into<String>>(msg: S) -> Self {
        KopisError::InvalidMinimumShouldMatch(msg.into())
    }

    /// Create a new illegal-builder-reuse error.
    pub fn illegal_reuse(builder: &'static str) -> Self {
        KopisError::IllegalBuilderReuse { builder }
    }

    /// Create a new unknown-field-path error.
    pub fn unknown_field_path<S: Into<String>>(path: S) -> Self {
        KopisError::UnknownFieldPath(path.into())
    }
}
