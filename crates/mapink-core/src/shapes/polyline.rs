//! Polyline shape.

use super::{ShapeId, ShapeStyle, point_to_polyline_dist};
use crate::geo::LatLng;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open path of two or more vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline {
    pub(crate) id: ShapeId,
    /// Vertices in drawing order.
    pub points: Vec<LatLng>,
    /// Popup label.
    pub label: Option<String>,
    /// Render style.
    pub style: ShapeStyle,
}

impl Polyline {
    /// Create a polyline. Callers guarantee at least two vertices.
    pub fn new(points: Vec<LatLng>) -> Self {
        debug_assert!(points.len() >= 2, "polyline needs at least 2 vertices");
        Self {
            id: Uuid::new_v4(),
            points,
            label: None,
            style: ShapeStyle::line(),
        }
    }

    /// Minimum distance from a query point to any segment, in meters.
    ///
    /// Segments are measured on a tangent plane centered at the query,
    /// where the query itself sits at the origin.
    pub fn distance_to(&self, query: LatLng) -> f64 {
        let projected: Vec<Point> = self.points.iter().map(|p| p.project(query)).collect();
        point_to_polyline_dist(Point::ZERO, &projected)
    }
}
