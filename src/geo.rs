//! Geographical value types used by spatial predicates.

use serde::{Deserialize, Serialize};

use crate::error::{KopisError, Result};

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(KopisError::query(format!(
                "Invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(KopisError::query(format!(
                "Invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Calculate the Haversine distance to another point in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;

        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Check if this point is within a rectangular latitude/longitude box.
    pub fn within_bounds(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> bool {
        self.lat >= min_lat && self.lat <= max_lat && self.lon >= min_lon && self.lon <= max_lon
    }
}

/// A geographical bounding box defined by its top-left and bottom-right corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    /// Top-left corner
    pub top_left: GeoPoint,
    /// Bottom-right corner
    pub bottom_right: GeoPoint,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self> {
        if top_left.lat < bottom_right.lat {
            return Err(KopisError::query(
                "Top-left latitude must be greater than bottom-right latitude",
            ));
        }
        if top_left.lon > bottom_right.lon {
            return Err(KopisError::query(
                "Top-left longitude must be less than bottom-right longitude",
            ));
        }

        Ok(GeoBoundingBox {
            top_left,
            bottom_right,
        })
    }

    /// Check if a point is within this bounding box.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.within_bounds(
            self.bottom_right.lat,
            self.top_left.lat,
            self.top_left.lon,
            self.bottom_right.lon,
        )
    }
}

/// A circle on the earth's surface, defined by a center and a radius in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCircle {
    /// Center of the circle.
    pub center: GeoPoint,
    /// Radius in meters.
    pub radius_meters: f64,
}

impl GeoCircle {
    /// Create a new circle.
    pub fn new(center: GeoPoint, radius_meters: f64) -> Result<Self> {
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(KopisError::query(format!(
                "Invalid circle radius: {radius_meters} (must be finite and non-negative)"
            )));
        }
        Ok(GeoCircle {
            center,
            radius_meters,
        })
    }

    /// Check if a point is within this circle.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_to(point) <= self.radius_meters
    }
}

/// A closed polygon on the earth's surface.
///
/// The boundary is implicitly closed: the last vertex connects back to
/// the first. Containment uses the even-odd (ray casting) rule in
/// lat/lon space, which is adequate for polygons that do not cross the
/// antimeridian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    /// Vertices of the polygon, in order.
    pub points: Vec<GeoPoint>,
}

impl GeoPolygon {
    /// Create a new polygon from at least three vertices.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
        if points.len() < 3 {
            return Err(KopisError::query(format!(
                "A polygon requires at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(GeoPolygon { points })
    }

    /// Check if a point is within this polygon.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.points[i];
            let b = &self.points[j];
            if ((a.lat > point.lat) != (b.lat > point.lat))
                && (point.lon
                    < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// The area a spatial-within predicate matches against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeoShape {
    /// A rectangular bounding box.
    BoundingBox(GeoBoundingBox),
    /// A circle with a radius in meters.
    Circle(GeoCircle),
    /// A closed polygon.
    Polygon(GeoPolygon),
}

impl GeoShape {
    /// Check if a point falls within this shape.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        match self {
            GeoShape::BoundingBox(bounding_box) => bounding_box.contains(point),
            GeoShape::Circle(circle) => circle.contains(point),
            GeoShape::Polygon(polygon) => polygon.contains(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(35.6, 139.7).is_ok());
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_distance_between_known_points() {
        // Tokyo Station to Shinjuku Station, roughly 6.3 km.
        let tokyo = GeoPoint::new(35.6812, 139.7671).unwrap();
        let shinjuku = GeoPoint::new(35.6896, 139.7006).unwrap();
        let distance = tokyo.distance_to(&shinjuku);
        assert!(distance > 5_500.0 && distance < 7_000.0, "got {distance}");
    }

    #[test]
    fn test_bounding_box_contains() {
        let bounding_box = GeoBoundingBox::new(
            GeoPoint::new(10.0, -10.0).unwrap(),
            GeoPoint::new(-10.0, 10.0).unwrap(),
        )
        .unwrap();

        assert!(bounding_box.contains(&GeoPoint::new(0.0, 0.0).unwrap()));
        assert!(bounding_box.contains(&GeoPoint::new(10.0, 10.0).unwrap()));
        assert!(!bounding_box.contains(&GeoPoint::new(11.0, 0.0).unwrap()));
    }

    #[test]
    fn test_bounding_box_corner_validation() {
        let result = GeoBoundingBox::new(
            GeoPoint::new(-10.0, 0.0).unwrap(),
            GeoPoint::new(10.0, 10.0).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_circle_contains() {
        let circle =
            GeoCircle::new(GeoPoint::new(0.0, 0.0).unwrap(), 200_000.0).unwrap();
        assert!(circle.contains(&GeoPoint::new(0.0, 1.0).unwrap()));
        assert!(!circle.contains(&GeoPoint::new(0.0, 3.0).unwrap()));
    }

    #[test]
    fn test_polygon_contains() {
        let polygon = GeoPolygon::new(vec![
            GeoPoint::new(0.0, 0.0).unwrap(),
            GeoPoint::new(0.0, 10.0).unwrap(),
            GeoPoint::new(10.0, 10.0).unwrap(),
            GeoPoint::new(10.0, 0.0).unwrap(),
        ])
        .unwrap();

        assert!(polygon.contains(&GeoPoint::new(5.0, 5.0).unwrap()));
        assert!(!polygon.contains(&GeoPoint::new(15.0, 5.0).unwrap()));
    }

    #[test]
    fn test_polygon_requires_three_points() {
        let result = GeoPolygon::new(vec![
            GeoPoint::new(0.0, 0.0).unwrap(),
            GeoPoint::new(1.0, 1.0).unwrap(),
        ]);
        assert!(result.is_err());
    }
}
