//! Builder contracts implemented by backends.
//!
//! The engine-side DSL accumulates predicate state and drives these
//! object-safe traits; each backend implements them to produce its own
//! fragment type `F`. Backends share the [`ClauseAccumulator`] for
//! boolean clause storage and differ only in the compile step, so there
//! is no builder inheritance across backends.

use crate::error::Result;
use crate::geo::GeoShape;
use crate::predicate::element::{QueryElementKey, QueryElementKind};
use crate::predicate::minimum_should_match::MinimumShouldMatch;
use crate::predicate::range::{Bound, RangeValue};

/// Backend builder for term (value equality) predicates.
pub trait TermBuilder<F>: Send {
    /// Set the value to match.
    fn value(&mut self, value: RangeValue) -> Result<()>;

    /// Set the boost factor.
    fn boost(&mut self, boost: f32);

    /// Compile the accumulated state into a fragment. Single-use.
    fn build(&mut self) -> Result<F>;
}

/// Backend builder for wildcard predicates.
pub trait WildcardBuilder<F>: Send {
    /// Set the wildcard pattern (raw, not yet normalized).
    fn pattern(&mut self, pattern: &str) -> Result<()>;

    /// Set the boost factor.
    fn boost(&mut self, boost: f32);

    /// Compile the accumulated state into a fragment. Single-use.
    ///
    /// Normalization of the pattern's literal segments happens here,
    /// since it needs the final pattern.
    fn build(&mut self) -> Result<F>;
}

/// Backend builder for range predicates.
pub trait RangeBuilder<F>: Send {
    /// Set the lower bound.
    fn lower(&mut self, bound: Bound<RangeValue>) -> Result<()>;

    /// Set the upper bound.
    fn upper(&mut self, bound: Bound<RangeValue>) -> Result<()>;

    /// Set the boost factor.
    fn boost(&mut self, boost: f32);

    /// Compile the accumulated state into a fragment. Single-use.
    fn build(&mut self) -> Result<F>;
}

/// Backend builder for spatial-within predicates on a single field.
pub trait SpatialWithinBuilder<F>: Send {
    /// Set the containment shape.
    fn shape(&mut self, shape: GeoShape) -> Result<()>;

    /// Set the boost factor.
    fn boost(&mut self, boost: f32);

    /// Compile the accumulated state into a fragment. Single-use.
    fn build(&mut self) -> Result<F>;
}

/// Backend builder for boolean predicates.
///
/// Clauses arrive already compiled to fragments; the builder only has
/// to combine them according to the backend's native representation.
pub trait BooleanBuilder<F>: Send {
    /// Add a clause that must match (scoring).
    fn must(&mut self, clause: F);

    /// Add a clause that must not match (non-scoring).
    fn must_not(&mut self, clause: F);

    /// Add a clause that should match (scoring, conditionally required).
    fn should(&mut self, clause: F);

    /// Add a clause that must match without contributing to the score.
    fn filter(&mut self, clause: F);

    /// Set the minimum-should-match constraints.
    fn minimum_should_match(&mut self, constraints: MinimumShouldMatch);

    /// Set the boost factor.
    fn boost(&mut self, boost: f32);

    /// Compile the accumulated clauses into a fragment. Single-use.
    fn build(&mut self) -> Result<F>;
}

/// Accumulated boolean clause state, shared by all backends.
#[derive(Debug, Clone)]
pub struct ClauseAccumulator<F> {
    /// Clauses that must match (scoring).
    pub must: Vec<F>,
    /// Clauses that must not match (non-scoring).
    pub must_not: Vec<F>,
    /// Clauses that should match (scoring, conditionally required).
    pub should: Vec<F>,
    /// Clauses that must match without contributing to the score.
    pub filter: Vec<F>,
    /// Minimum-should-match constraints.
    pub minimum_should_match: MinimumShouldMatch,
    /// Boost factor for the combined predicate.
    pub boost: f32,
}

impl<F> ClauseAccumulator<F> {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        ClauseAccumulator {
            must: Vec::new(),
            must_not: Vec::new(),
            should: Vec::new(),
            filter: Vec::new(),
            minimum_should_match: MinimumShouldMatch::new(),
            boost: 1.0,
        }
    }

    /// Check whether no clause has been added to any sequence.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
    }

    /// Get the total number of clauses across all sequences.
    pub fn total_clauses(&self) -> usize {
        self.must.len() + self.must_not.len() + self.should.len() + self.filter.len()
    }

    /// Resolve the effective number of "should" clauses required to
    /// match.
    ///
    /// An explicit constraint wins when one of its thresholds applies;
    /// otherwise at least one "should" clause is required exactly when
    /// there is no "must" and no "filter" clause to anchor the match.
    pub fn resolve_minimum_should_match(&self) -> Result<usize> {
        match self.minimum_should_match.resolve(self.should.len())? {
            Some(required) => Ok(required),
            None => {
                if self.must.is_empty() && self.filter.is_empty() && !self.should.is_empty() {
                    Ok(1)
                } else {
                    Ok(0)
                }
            }
        }
    }
}

impl<F> Default for ClauseAccumulator<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical typed keys pairing each element kind with its builder type.
///
/// These constructors are the only place a kind meets a builder type,
/// which is what makes a mismatched registry entry inexpressible.
pub mod keys {
    use super::*;

    /// Key for term predicate factories.
    pub fn term<F: 'static>() -> QueryElementKey<dyn TermBuilder<F>> {
        QueryElementKey::of(QueryElementKind::Term)
    }

    /// Key for wildcard predicate factories.
    pub fn wildcard<F: 'static>() -> QueryElementKey<dyn WildcardBuilder<F>> {
        QueryElementKey::of(QueryElementKind::Wildcard)
    }

    /// Key for range predicate factories.
    pub fn range<F: 'static>() -> QueryElementKey<dyn RangeBuilder<F>> {
        QueryElementKey::of(QueryElementKind::Range)
    }

    /// Key for spatial-within predicate factories.
    pub fn spatial_within<F: 'static>() -> QueryElementKey<dyn SpatialWithinBuilder<F>> {
        QueryElementKey::of(QueryElementKind::SpatialWithin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::minimum_should_match::MinimumShouldMatchRule;

    #[test]
    fn test_accumulator_counts() {
        let mut accumulator: ClauseAccumulator<u32> = ClauseAccumulator::new();
        assert!(accumulator.is_empty());

        accumulator.must.push(1);
        accumulator.should.push(2);
        accumulator.should.push(3);
        accumulator.filter.push(4);
        assert!(!accumulator.is_empty());
        assert_eq!(accumulator.total_clauses(), 4);
    }

    #[test]
    fn test_default_should_requirement() {
        // Pure should: OR semantics.
        let mut accumulator: ClauseAccumulator<u32> = ClauseAccumulator::new();
        accumulator.should.push(1);
        accumulator.should.push(2);
        assert_eq!(accumulator.resolve_minimum_should_match().unwrap(), 1);

        // A must clause makes should optional.
        accumulator.must.push(3);
        assert_eq!(accumulator.resolve_minimum_should_match().unwrap(), 0);

        // A filter clause alone also makes should optional.
        let mut accumulator: ClauseAccumulator<u32> = ClauseAccumulator::new();
        accumulator.should.push(1);
        accumulator.filter.push(2);
        assert_eq!(accumulator.resolve_minimum_should_match().unwrap(), 0);
    }

    #[test]
    fn test_explicit_constraint_overrides_default() {
        let mut accumulator: ClauseAccumulator<u32> = ClauseAccumulator::new();
        accumulator.must.push(0);
        accumulator.should.push(1);
        accumulator.should.push(2);
        accumulator
            .minimum_should_match
            .add(0, MinimumShouldMatchRule::Number(2))
            .unwrap();
        assert_eq!(accumulator.resolve_minimum_should_match().unwrap(), 2);
    }

    #[test]
    fn test_zero_clauses_requires_nothing() {
        let accumulator: ClauseAccumulator<u32> = ClauseAccumulator::new();
        assert_eq!(accumulator.resolve_minimum_should_match().unwrap(), 0);
    }
}
