//! The native query-tree backend.
//!
//! Compiles predicates into [`NativeQuery`] trees: immutable, in-memory
//! query objects that can be evaluated directly against
//! [`Document`](crate::document::Document) values. Used both as a real
//! compilation target and as the reference implementation of the
//! boolean clause algebra.

pub mod factory;
pub mod query;

pub use self::factory::NativeBackend;
pub use self::query::{
    BooleanQuery, NativeQuery, RangeQuery, SpatialWithinQuery, TermQuery, WildcardQuery,
};
