//! Typed dispatch from query-element kinds to backend factories.
//!
//! A backend contributes query support for a field by registering, per
//! element kind, a factory that produces its builder type. Lookups go
//! through a [`QueryElementKey`]: a typed key combining the element kind
//! with the expected builder type, so that retrieving a factory of the
//! wrong type cannot type-check — there is no downcast to fail deep in a
//! call chain. Mismatched or duplicate registrations are rejected when
//! the registry is populated, at scope construction time.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{KopisError, Result};
use crate::scope::FieldContext;

/// The kinds of query elements a field may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryElementKind {
    /// Value equality.
    Term,
    /// Pattern matching with `*` and `?`.
    Wildcard,
    /// Bounded value ranges.
    Range,
    /// Spatial containment.
    SpatialWithin,
    /// Boolean clause combination.
    Boolean,
}

impl QueryElementKind {
    /// Get the name of this element kind.
    pub fn name(&self) -> &'static str {
        match self {
            QueryElementKind::Term => "term",
            QueryElementKind::Wildcard => "wildcard",
            QueryElementKind::Range => "range",
            QueryElementKind::SpatialWithin => "spatial_within",
            QueryElementKind::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for QueryElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed registry key: an element kind paired with the builder type
/// the registered factory produces.
///
/// Two keys are equal iff both the kind and the result type match. The
/// canonical constructors in [`crate::predicate::spi::keys`] are the
/// only places a kind is paired with its builder type, so a key built
/// there cannot encode a mismatched pair.
pub struct QueryElementKey<T: ?Sized + 'static> {
    kind: QueryElementKind,
    _result: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> QueryElementKey<T> {
    /// Create a key for the given kind, expecting builder type `T`.
    pub const fn of(kind: QueryElementKind) -> Self {
        QueryElementKey {
            kind,
            _result: PhantomData,
        }
    }

    /// Get the element kind of this key.
    pub fn kind(&self) -> QueryElementKind {
        self.kind
    }

    fn registry_key(&self) -> (QueryElementKind, TypeId) {
        (self.kind, TypeId::of::<T>())
    }
}

impl<T: ?Sized + 'static> Clone for QueryElementKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized + 'static> Copy for QueryElementKey<T> {}

impl<T: ?Sized + 'static> PartialEq for QueryElementKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl<T: ?Sized + 'static> Eq for QueryElementKey<T> {}

impl<T: ?Sized + 'static> std::fmt::Debug for QueryElementKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryElementKey")
            .field("kind", &self.kind)
            .field("result", &std::any::type_name::<T>())
            .finish()
    }
}

/// A factory producing builders of type `T` for one field.
///
/// Each `create` call yields an independent builder: factories hold no
/// per-query mutable state, so two builders for the same field never
/// share construction-time state.
pub trait QueryElementFactory<T: ?Sized + 'static>: Send + Sync {
    /// Create a fresh builder for the given field.
    fn create(&self, field: &FieldContext) -> Result<Box<T>>;
}

/// The per-field registry of query-element factories.
///
/// Populated once when the search scope is built, then read-only.
#[derive(Default)]
pub struct QueryElementRegistry {
    entries: AHashMap<(QueryElementKind, TypeId), Box<dyn Any + Send + Sync>>,
}

impl QueryElementRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        QueryElementRegistry {
            entries: AHashMap::new(),
        }
    }

    /// Register a factory under the given typed key.
    ///
    /// Fails if a factory is already registered for the same kind and
    /// builder type: a duplicate means the backend's registration code
    /// is inconsistent, and the mistake must surface at initialization.
    pub fn register<T: ?Sized + 'static>(
        &mut self,
        key: QueryElementKey<T>,
        factory: Arc<dyn QueryElementFactory<T>>,
    ) -> Result<()> {
        let registry_key = key.registry_key();
        if self.entries.contains_key(&registry_key) {
            return Err(KopisError::schema(format!(
                "query element '{}' is already registered for builder type {}",
                key.kind(),
                std::any::type_name::<T>()
            )));
        }
        self.entries.insert(registry_key, Box::new(factory));
        Ok(())
    }

    /// Look up the factory registered under the given typed key.
    ///
    /// Returns `None` when no factory was registered for this kind and
    /// builder type; the stored entry is keyed by the same `TypeId` the
    /// key encodes, so a present entry always has the expected type.
    pub fn resolve<T: ?Sized + 'static>(
        &self,
        key: QueryElementKey<T>,
    ) -> Option<Arc<dyn QueryElementFactory<T>>> {
        self.entries
            .get(&key.registry_key())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn QueryElementFactory<T>>>())
            .cloned()
    }

    /// Check whether any factory is registered for the given kind.
    pub fn supports(&self, kind: QueryElementKind) -> bool {
        self.entries.keys().any(|(entry_kind, _)| *entry_kind == kind)
    }

    /// Get the number of registered factories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for QueryElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.entries.keys().map(|(kind, _)| kind.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("QueryElementRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
