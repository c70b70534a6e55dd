//! Compilation backends.
//!
//! A backend turns accumulated predicate state into its own native
//! fragment type. The engine never introspects fragments; it only hands
//! them back to the same backend's boolean combiner.

pub mod json;
pub mod native;

use std::fmt::Debug;

use crate::error::Result;
use crate::predicate::element::QueryElementRegistry;
use crate::predicate::spi::BooleanBuilder;
use crate::schema::field::FieldDefinition;

/// A search backend: the compilation target for predicates.
pub trait SearchBackend: Send + Sync + 'static {
    /// The backend-native compiled fragment type.
    type Fragment: Clone + Debug + Send + Sync + 'static;

    /// Get the name of this backend (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Register the query elements this backend supports for a field.
    ///
    /// Called once per field when the search scope is built; the
    /// resulting registry is frozen afterwards. Registration decides
    /// capability: a kind not registered here fails lookups with
    /// `UnsupportedFieldType`.
    fn register_field_elements(
        &self,
        field: &FieldDefinition,
        registry: &mut QueryElementRegistry,
    ) -> Result<()>;

    /// Create a builder combining fragments into a boolean fragment.
    fn boolean_builder(&self) -> Box<dyn BooleanBuilder<Self::Fragment>>;

    /// Produce the fragment matching every document.
    fn match_all(&self, boost: f32) -> Self::Fragment;
}

pub use self::json::JsonBackend;
pub use self::native::NativeBackend;
