//! Entry points for building predicates against a scope.

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::predicate::boolean::BooleanPredicateBuilder;
use crate::predicate::range::RangePredicateBuilder;
use crate::predicate::spatial::SpatialWithinPredicateBuilder;
use crate::predicate::spi::keys;
use crate::predicate::term::TermPredicateBuilder;
use crate::predicate::wildcard::WildcardPredicateBuilder;
use crate::predicate::BuilderState;
use crate::scope::SearchScope;

/// Factory for predicate builders, scoped to one schema and backend.
///
/// Field and capability resolution is eager: an unknown field path or an
/// unsupported predicate kind fails at the factory call, not at
/// `build()` time.
pub struct SearchPredicateFactory<'a, B: SearchBackend> {
    scope: &'a SearchScope<B>,
}

impl<'a, B: SearchBackend> SearchPredicateFactory<'a, B> {
    pub(crate) fn new(scope: &'a SearchScope<B>) -> Self {
        SearchPredicateFactory { scope }
    }

    /// Get the scope this factory builds against.
    pub fn scope(&self) -> &'a SearchScope<B> {
        self.scope
    }

    /// Start a term (value equality) predicate on the given field.
    pub fn term(&self, path: &str) -> Result<TermPredicateBuilder<B>> {
        let field = self.scope.field(path)?;
        let inner = field.create_element(keys::term::<B::Fragment>())?;
        Ok(TermPredicateBuilder::new(inner))
    }

    /// Start a wildcard predicate on the given field.
    pub fn wildcard(&self, path: &str) -> Result<WildcardPredicateBuilder<B>> {
        let field = self.scope.field(path)?;
        let inner = field.create_element(keys::wildcard::<B::Fragment>())?;
        Ok(WildcardPredicateBuilder::new(inner))
    }

    /// Start a range predicate on the given field.
    pub fn range(&self, path: &str) -> Result<RangePredicateBuilder<B>> {
        let field = self.scope.field(path)?;
        let inner = field.create_element(keys::range::<B::Fragment>())?;
        Ok(RangePredicateBuilder::new(inner))
    }

    /// Start a spatial-within predicate targeting one or more fields.
    ///
    /// With multiple fields the predicate matches if *any* targeted
    /// field matches; options set on the shared builder apply uniformly
    /// to all of them.
    pub fn spatial_within<I, S>(&self, paths: I) -> Result<SpatialWithinPredicateBuilder<'a, B>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inners = Vec::new();
        for path in paths {
            let field = self.scope.field(path.as_ref())?;
            inners.push(field.create_element(keys::spatial_within::<B::Fragment>())?);
        }
        SpatialWithinPredicateBuilder::new(self.scope, inners)
    }

    /// Start a boolean predicate.
    pub fn boolean(&self) -> BooleanPredicateBuilder<'a, B> {
        BooleanPredicateBuilder::new(self.scope)
    }

    /// Start a predicate matching every document.
    pub fn match_all(&self) -> MatchAllPredicateBuilder<'a, B> {
        MatchAllPredicateBuilder {
            scope: self.scope,
            boost: 1.0,
            state: BuilderState::Accumulating,
        }
    }
}

impl<B: SearchBackend> Clone for SearchPredicateFactory<'_, B> {
    fn clone(&self) -> Self {
        SearchPredicateFactory { scope: self.scope }
    }
}

impl<B: SearchBackend> std::fmt::Debug for SearchPredicateFactory<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPredicateFactory")
            .field("backend", &self.scope.backend().name())
            .finish()
    }
}

/// Builder for the match-all predicate.
pub struct MatchAllPredicateBuilder<'a, B: SearchBackend> {
    scope: &'a SearchScope<B>,
    boost: f32,
    state: BuilderState,
}

impl<B: SearchBackend> MatchAllPredicateBuilder<'_, B> {
    /// Set the boost factor.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("match_all")?;
        self.boost = boost;
        Ok(self)
    }

    /// Compile into the backend's match-all fragment. Single-use.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("match_all")?;
        Ok(self.scope.backend().match_all(self.boost))
    }
}

impl<B: SearchBackend> std::fmt::Debug for MatchAllPredicateBuilder<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchAllPredicateBuilder")
            .field("boost", &self.boost)
            .field("state", &self.state)
            .finish()
    }
}
