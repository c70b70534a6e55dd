//! Boolean predicate: clause accumulation and combination.
//!
//! Clause semantics:
//!
//! - `must` clauses are required to match and contribute to the score.
//! - `must_not` clauses are required to not match; never scored.
//! - `filter` clauses are required to match; never scored, and neither
//!   is anything nested inside them.
//! - `should` clauses may optionally match and contribute to the score.
//!   With no `must` and no `filter` clause, at least one `should`
//!   clause must match; with at least one `must` or `filter` clause,
//!   `should` clauses are purely score-raising. Explicit
//!   minimum-should-match constraints override both defaults.

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::predicate::factory::SearchPredicateFactory;
use crate::predicate::minimum_should_match::{MinimumShouldMatch, MinimumShouldMatchRule};
use crate::predicate::spi::BooleanBuilder;
use crate::predicate::BuilderState;
use crate::scope::SearchScope;

/// Builder for boolean predicates.
///
/// Clauses are added either as already-compiled fragments or through
/// contributor functions, which receive a predicate factory and are
/// invoked synchronously at the point of attachment.
pub struct BooleanPredicateBuilder<'a, B: SearchBackend> {
    scope: &'a SearchScope<B>,
    inner: Box<dyn BooleanBuilder<B::Fragment>>,
    constraints: MinimumShouldMatch,
    state: BuilderState,
}

impl<'a, B: SearchBackend> BooleanPredicateBuilder<'a, B> {
    pub(crate) fn new(scope: &'a SearchScope<B>) -> Self {
        BooleanPredicateBuilder {
            scope,
            inner: scope.backend().boolean_builder(),
            constraints: MinimumShouldMatch::new(),
            state: BuilderState::Accumulating,
        }
    }

    /// Add a clause that must match.
    pub fn must(&mut self, clause: B::Fragment) -> Result<&mut Self> {
        self.state.ensure_accumulating("boolean")?;
        self.inner.must(clause);
        Ok(self)
    }

    /// Add a clause that must not match.
    pub fn must_not(&mut self, clause: B::Fragment) -> Result<&mut Self> {
        self.state.ensure_accumulating("boolean")?;
        self.inner.must_not(clause);
        Ok(self)
    }

    /// Add a clause that should match.
    pub fn should(&mut self, clause: B::Fragment) -> Result<&mut Self> {
        self.state.ensure_accumulating("boolean")?;
        self.inner.should(clause);
        Ok(self)
    }

    /// Add a clause that must match without affecting the score.
    pub fn filter(&mut self, clause: B::Fragment) -> Result<&mut Self> {
        self.state.ensure_accumulating("boolean")?;
        self.inner.filter(clause);
        Ok(self)
    }

    /// Add a "must" clause defined by the given contributor function.
    pub fn must_with<C>(&mut self, contributor: C) -> Result<&mut Self>
    where
        C: FnOnce(&SearchPredicateFactory<'a, B>) -> Result<B::Fragment>,
    {
        self.state.ensure_accumulating("boolean")?;
        let clause = contributor(&self.scope.predicate())?;
        self.must(clause)
    }

    /// Add a "must not" clause defined by the given contributor function.
    pub fn must_not_with<C>(&mut self, contributor: C) -> Result<&mut Self>
    where
        C: FnOnce(&SearchPredicateFactory<'a, B>) -> Result<B::Fragment>,
    {
        self.state.ensure_accumulating("boolean")?;
        let clause = contributor(&self.scope.predicate())?;
        self.must_not(clause)
    }

    /// Add a "should" clause defined by the given contributor function.
    pub fn should_with<C>(&mut self, contributor: C) -> Result<&mut Self>
    where
        C: FnOnce(&SearchPredicateFactory<'a, B>) -> Result<B::Fragment>,
    {
        self.state.ensure_accumulating("boolean")?;
        let clause = contributor(&self.scope.predicate())?;
        self.should(clause)
    }

    /// Add a "filter" clause defined by the given contributor function.
    pub fn filter_with<C>(&mut self, contributor: C) -> Result<&mut Self>
    where
        C: FnOnce(&SearchPredicateFactory<'a, B>) -> Result<B::Fragment>,
    {
        self.state.ensure_accumulating("boolean")?;
        let clause = contributor(&self.scope.predicate())?;
        self.filter(clause)
    }

    /// Require the given number of "should" clauses to match
    /// (threshold 0; see [`MinimumShouldMatchRule::Number`] for sign
    /// semantics).
    pub fn minimum_should_match_number(&mut self, number: i32) -> Result<&mut Self> {
        self.add_constraint(0, MinimumShouldMatchRule::Number(number))?;
        Ok(self)
    }

    /// Require the given percentage of "should" clauses to match
    /// (threshold 0; see [`MinimumShouldMatchRule::Percent`] for sign
    /// semantics).
    pub fn minimum_should_match_percent(&mut self, percent: i32) -> Result<&mut Self> {
        self.add_constraint(0, MinimumShouldMatchRule::Percent(percent))?;
        Ok(self)
    }

    /// Start defining conditional minimum-should-match constraints.
    pub fn minimum_should_match(&mut self) -> MinimumShouldMatchStep<'_, 'a, B> {
        MinimumShouldMatchStep { builder: self }
    }

    /// Set the boost factor.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("boolean")?;
        self.inner.boost(boost);
        Ok(self)
    }

    /// Compile the accumulated clauses into a backend fragment.
    /// Single-use.
    ///
    /// With zero clauses the result is the backend's match-all
    /// fragment.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("boolean")?;
        self.inner
            .minimum_should_match(std::mem::take(&mut self.constraints));
        self.inner.build()
    }

    fn add_constraint(&mut self, threshold: i32, rule: MinimumShouldMatchRule) -> Result<()> {
        self.state.ensure_accumulating("boolean")?;
        self.constraints.add(threshold, rule)
    }
}

/// Step for adding conditional minimum-should-match constraints.
pub struct MinimumShouldMatchStep<'s, 'a, B: SearchBackend> {
    builder: &'s mut BooleanPredicateBuilder<'a, B>,
}

impl<'s, 'a, B: SearchBackend> MinimumShouldMatchStep<'s, 'a, B> {
    /// Apply the next requirement once there are at least `threshold`
    /// "should" clauses.
    pub fn if_more_than(self, threshold: i32) -> MinimumShouldMatchRequireStep<'s, 'a, B> {
        MinimumShouldMatchRequireStep {
            builder: self.builder,
            threshold,
        }
    }
}

/// Step fixing the requirement for one threshold.
pub struct MinimumShouldMatchRequireStep<'s, 'a, B: SearchBackend> {
    builder: &'s mut BooleanPredicateBuilder<'a, B>,
    threshold: i32,
}

impl<'s, 'a, B: SearchBackend> MinimumShouldMatchRequireStep<'s, 'a, B> {
    /// Require an absolute number of matching clauses.
    pub fn then_require_number(self, number: i32) -> Result<MinimumShouldMatchStep<'s, 'a, B>> {
        self.builder
            .add_constraint(self.threshold, MinimumShouldMatchRule::Number(number))?;
        Ok(MinimumShouldMatchStep {
            builder: self.builder,
        })
    }

    /// Require a percentage of matching clauses.
    pub fn then_require_percent(self, percent: i32) -> Result<MinimumShouldMatchStep<'s, 'a, B>> {
        self.builder
            .add_constraint(self.threshold, MinimumShouldMatchRule::Percent(percent))?;
        Ok(MinimumShouldMatchStep {
            builder: self.builder,
        })
    }
}

impl<B: SearchBackend> std::fmt::Debug for BooleanPredicateBuilder<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BooleanPredicateBuilder")
            .field("constraints", &self.constraints)
            .field("state", &self.state)
            .finish()
    }
}
