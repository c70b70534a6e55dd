//! Predicate construction: typed dispatch, builder DSL, clause algebra.

pub mod boolean;
pub mod element;
pub mod factory;
pub mod minimum_should_match;
pub mod range;
pub mod spatial;
pub mod spi;
pub mod term;
pub mod wildcard;

pub use self::boolean::BooleanPredicateBuilder;
pub use self::element::{
    QueryElementFactory, QueryElementKey, QueryElementKind, QueryElementRegistry,
};
pub use self::factory::{MatchAllPredicateBuilder, SearchPredicateFactory};
pub use self::minimum_should_match::{MinimumShouldMatch, MinimumShouldMatchRule};
pub use self::range::{Bound, RangePredicateBuilder, RangeValue};
pub use self::spatial::SpatialWithinPredicateBuilder;
pub use self::term::TermPredicateBuilder;
pub use self::wildcard::WildcardPredicateBuilder;

use crate::error::{KopisError, Result};

/// Construction state of a predicate builder.
///
/// Builders are single-use: `build()` moves them to [`Built`] exactly
/// once, and every state-mutating call afterwards fails with
/// [`KopisError::IllegalBuilderReuse`].
///
/// [`Built`]: BuilderState::Built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// The builder is still accepting state.
    Accumulating,
    /// `build()` has been called; the builder is spent.
    Built,
}

impl BuilderState {
    /// Fail if the builder has already been built.
    pub fn ensure_accumulating(self, builder: &'static str) -> Result<()> {
        match self {
            BuilderState::Accumulating => Ok(()),
            BuilderState::Built => Err(KopisError::illegal_reuse(builder)),
        }
    }

    /// Transition to [`BuilderState::Built`], failing on reuse.
    pub fn mark_built(&mut self, builder: &'static str) -> Result<()> {
        self.ensure_accumulating(builder)?;
        *self = BuilderState::Built;
        Ok(())
    }
}
