//! Spatial-within predicate: containment in a geographical area.

use crate::backend::SearchBackend;
use crate::error::{KopisError, Result};
use crate::geo::{GeoBoundingBox, GeoCircle, GeoPoint, GeoPolygon, GeoShape};
use crate::predicate::spi::SpatialWithinBuilder;
use crate::predicate::BuilderState;
use crate::scope::SearchScope;

/// Builder for spatial-within predicates.
///
/// Targets one or more geo-point fields; with multiple fields the
/// semantics are OR — the predicate matches when *any* targeted field
/// holds a point inside the shape. Boost set on this builder applies
/// uniformly to every targeted field.
pub struct SpatialWithinPredicateBuilder<'a, B: SearchBackend> {
    scope: &'a SearchScope<B>,
    inners: Vec<Box<dyn SpatialWithinBuilder<B::Fragment>>>,
    state: BuilderState,
}

impl<'a, B: SearchBackend> SpatialWithinPredicateBuilder<'a, B> {
    pub(crate) fn new(
        scope: &'a SearchScope<B>,
        inners: Vec<Box<dyn SpatialWithinBuilder<B::Fragment>>>,
    ) -> Result<Self> {
        if inners.is_empty() {
            return Err(KopisError::query(
                "spatial_within requires at least one target field",
            ));
        }
        Ok(SpatialWithinPredicateBuilder {
            scope,
            inners,
            state: BuilderState::Accumulating,
        })
    }

    /// Match points within the given bounding box.
    pub fn bounding_box(&mut self, bounding_box: GeoBoundingBox) -> Result<&mut Self> {
        self.shape(GeoShape::BoundingBox(bounding_box))
    }

    /// Match points within the given radius (in meters) of a center.
    pub fn circle(&mut self, center: GeoPoint, radius_meters: f64) -> Result<&mut Self> {
        self.shape(GeoShape::Circle(GeoCircle::new(center, radius_meters)?))
    }

    /// Match points within the given polygon.
    pub fn polygon(&mut self, polygon: GeoPolygon) -> Result<&mut Self> {
        self.shape(GeoShape::Polygon(polygon))
    }

    /// Match points within the given shape.
    pub fn shape(&mut self, shape: GeoShape) -> Result<&mut Self> {
        self.state.ensure_accumulating("spatial_within")?;
        for inner in &mut self.inners {
            inner.shape(shape.clone())?;
        }
        Ok(self)
    }

    /// Set the boost factor, applied to every targeted field.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("spatial_within")?;
        for inner in &mut self.inners {
            inner.boost(boost);
        }
        Ok(self)
    }

    /// Compile into a backend fragment. Single-use.
    ///
    /// Multiple targeted fields compile to a boolean OR over the
    /// per-field fragments.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("spatial_within")?;

        if self.inners.len() == 1 {
            return self.inners[0].build();
        }

        let mut combiner = self.scope.backend().boolean_builder();
        for inner in &mut self.inners {
            combiner.should(inner.build()?);
        }
        combiner.build()
    }
}

impl<B: SearchBackend> std::fmt::Debug for SpatialWithinPredicateBuilder<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialWithinPredicateBuilder")
            .field("fields", &self.inners.len())
            .field("state", &self.state)
            .finish()
    }
}
