//! # Kopis
//!
//! A backend-agnostic search predicate construction and compilation
//! library for Rust.
//!
//! ## Features
//!
//! - Typed predicate DSL: boolean clauses, wildcard, range,
//!   spatial-within, term predicates
//! - Per-field capability dispatch through typed element keys
//! - Precise must/should/mustNot/filter clause algebra with
//!   minimum-should-match constraints
//! - Pluggable compilation backends: an evaluable native query tree and
//!   a JSON query-document target
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use kopis::analysis::LowercaseNormalizer;
//! use kopis::backend::NativeBackend;
//! use kopis::error::Result;
//! use kopis::schema::{FieldDefinition, Schema};
//! use kopis::scope::SearchScope;
//!
//! fn main() -> Result<()> {
//!     let mut schema = Schema::new();
//!     schema.add_field(
//!         "title",
//!         FieldDefinition::text().with_normalizer(Arc::new(LowercaseNormalizer::new())),
//!     )?;
//!
//!     let scope = SearchScope::new(&schema, NativeBackend::new())?;
//!     let factory = scope.predicate();
//!
//!     let mut wildcard = factory.wildcard("title")?;
//!     wildcard.pattern("Rust*")?;
//!     let clause = wildcard.build()?;
//!
//!     let mut boolean = factory.boolean();
//!     boolean.must(clause)?;
//!     let query = boolean.build()?;
//!     assert!(!query.description().is_empty());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod backend;
pub mod document;
pub mod error;
pub mod geo;
pub mod predicate;
pub mod schema;
pub mod scope;

pub mod prelude {
    //! Convenience re-exports for the common construction path.
    pub use crate::analysis::{LowercaseNormalizer, Normalizer};
    pub use crate::backend::{JsonBackend, NativeBackend, SearchBackend};
    pub use crate::document::{Document, FieldValue};
    pub use crate::error::{KopisError, Result};
    pub use crate::geo::{GeoBoundingBox, GeoCircle, GeoPoint, GeoPolygon, GeoShape};
    pub use crate::predicate::{
        Bound, MinimumShouldMatch, MinimumShouldMatchRule, QueryElementKind, RangeValue,
    };
    pub use crate::schema::{FieldDefinition, FieldKind, Schema};
    pub use crate::scope::SearchScope;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
