//! Minimum-should-match constraints and their resolution.
//!
//! A boolean predicate may carry an ordered set of `(threshold, rule)`
//! pairs: once the predicate's actual number of "should" clauses is
//! known, the rule attached to the greatest threshold at or below that
//! count decides how many "should" clauses are required to match.
//! Threshold `0` acts as the unconditional default.

use std::collections::BTreeMap;

use crate::error::{KopisError, Result};

/// The requirement a satisfied threshold applies.
///
/// Positive values demand that many clauses (or that percentage of
/// clauses) match; negative values allow that many (or that percentage)
/// to *not* match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimumShouldMatchRule {
    /// An absolute number of matching clauses.
    Number(i32),
    /// A percentage of the total number of "should" clauses.
    Percent(i32),
}

/// An ordered set of minimum-should-match constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimumShouldMatch {
    constraints: BTreeMap<u32, MinimumShouldMatchRule>,
}

impl MinimumShouldMatch {
    /// Create a new empty constraint set.
    pub fn new() -> Self {
        MinimumShouldMatch {
            constraints: BTreeMap::new(),
        }
    }

    /// Add a constraint for the given threshold.
    ///
    /// Fails fast when the threshold is negative or already carries a
    /// rule: conflicting thresholds are a caller bug and must not wait
    /// until build time to surface.
    pub fn add(&mut self, threshold: i32, rule: MinimumShouldMatchRule) -> Result<()> {
        if threshold < 0 {
            return Err(KopisError::invalid_minimum_should_match(format!(
                "threshold must not be negative, got {threshold}"
            )));
        }
        let threshold = threshold as u32;
        if self.constraints.contains_key(&threshold) {
            return Err(KopisError::invalid_minimum_should_match(format!(
                "conflicting constraints for threshold {threshold}"
            )));
        }
        self.constraints.insert(threshold, rule);
        Ok(())
    }

    /// Check whether no constraint has been added.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over constraints in ascending threshold order.
    pub fn constraints(
        &self,
    ) -> impl Iterator<Item = (u32, MinimumShouldMatchRule)> + '_ {
        self.constraints.iter().map(|(t, r)| (*t, *r))
    }

    /// Resolve the required number of matching "should" clauses for an
    /// actual clause count of `should_count`.
    ///
    /// Returns `Ok(None)` when no threshold qualifies (including the
    /// empty constraint set), leaving the default should-requirement in
    /// force. Fails with [`KopisError::InvalidMinimumShouldMatch`] when
    /// the winning rule resolves outside `[0, should_count]`.
    pub fn resolve(&self, should_count: usize) -> Result<Option<usize>> {
        let n = should_count as i64;
        let active = self
            .constraints
            .range(..=should_count.min(u32::MAX as usize) as u32)
            .next_back();
        let Some((_, rule)) = active else {
            return Ok(None);
        };

        let required = match *rule {
            MinimumShouldMatchRule::Number(k) => {
                if k > 0 {
                    k as i64
                } else {
                    n + k as i64
                }
            }
            MinimumShouldMatchRule::Percent(p) => {
                if p > 0 {
                    ceil_percent(n, p as i64)
                } else {
                    n - ceil_percent(n, -(p as i64))
                }
            }
        };

        if required < 0 || required > n {
            return Err(KopisError::invalid_minimum_should_match(format!(
                "requirement resolves to {required} for {should_count} should clause(s), \
                 outside the valid range [0, {should_count}]"
            )));
        }
        Ok(Some(required as usize))
    }
}

/// ceil(n * p / 100) for non-negative n and p.
fn ceil_percent(n: i64, p: i64) -> i64 {
    (n * p + 99) / 100
}
