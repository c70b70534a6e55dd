//! The structured-document (JSON tree) backend.
//!
//! Compiles predicates into `serde_json::Value` query trees in the
//! shape a remote JSON search engine consumes (`{"bool": ...}`,
//! `{"wildcard": ...}`, `{"range": ...}`, geo queries). The engine
//! treats the produced values as opaque fragments; transport to the
//! remote engine is an external concern.

pub mod factory;

pub use self::factory::JsonBackend;
