//! Geographic coordinate primitives.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate. Components must be finite.
    pub fn new(lat: f64, lng: f64) -> Self {
        debug_assert!(
            lat.is_finite() && lng.is_finite(),
            "non-finite coordinate ({lat}, {lng})"
        );
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance to another coordinate in meters (haversine).
    pub fn distance_to(&self, other: LatLng) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Project onto a local tangent plane centered at `origin`, in meters.
    ///
    /// Equirectangular approximation; good to well under a meter at the
    /// distances hit-testing cares about.
    pub fn project(&self, origin: LatLng) -> Point {
        let x = (self.lng - origin.lng).to_radians() * origin.lat.to_radians().cos() * EARTH_RADIUS_M;
        let y = (self.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
        Point::new(x, y)
    }
}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Smallest box enclosing all points. `None` for an empty slice.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        for p in &points[1..] {
            bounds.south = bounds.south.min(p.lat);
            bounds.west = bounds.west.min(p.lng);
            bounds.north = bounds.north.max(p.lat);
            bounds.east = bounds.east.max(p.lng);
        }
        Some(bounds)
    }

    /// Whether a coordinate lies inside the box (inclusive).
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(1.0, 0.0);
        let d = a.distance_to(b);
        // ~111.2 km per degree of latitude
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_distance_symmetric() {
        let a = LatLng::new(51.505, -0.09);
        let b = LatLng::new(51.51, -0.1);
        assert!((a.distance_to(b) - b.distance_to(a)).abs() < 1e-9);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_projection_centered_at_origin() {
        let origin = LatLng::new(51.505, -0.09);
        let p = origin.project(origin);
        assert_eq!((p.x, p.y), (0.0, 0.0));

        // A point due north projects onto the positive y axis.
        let north = LatLng::new(51.506, -0.09);
        let proj = north.project(origin);
        assert!(proj.x.abs() < 1e-6);
        assert!(proj.y > 100.0 && proj.y < 120.0);
    }

    #[test]
    fn test_bounds_contains() {
        let ring = [
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(2.0, 2.0),
        ];
        let bounds = GeoBounds::from_points(&ring).unwrap();
        assert!(bounds.contains(LatLng::new(1.0, 1.0)));
        assert!(!bounds.contains(LatLng::new(3.0, 1.0)));
        assert!(GeoBounds::from_points(&[]).is_none());
    }
}
