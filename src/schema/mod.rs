//! Schema management for searchable field definitions.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use self::field::{FieldDefinition, FieldKind};
pub use self::schema::Schema;
