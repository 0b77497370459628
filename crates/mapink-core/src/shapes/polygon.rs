//! Polygon shape.

use super::{ShapeId, ShapeStyle};
use crate::geo::{GeoBounds, LatLng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed ring of three or more vertices.
///
/// The ring is stored open (first vertex not repeated); serialization
/// closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    /// Ring vertices in drawing order, unclosed.
    pub ring: Vec<LatLng>,
    /// Popup label.
    pub label: Option<String>,
    /// Render style.
    pub style: ShapeStyle,
}

impl Polygon {
    /// Create a polygon. Callers guarantee at least three vertices.
    pub fn new(ring: Vec<LatLng>) -> Self {
        debug_assert!(ring.len() >= 3, "polygon needs at least 3 vertices");
        Self {
            id: Uuid::new_v4(),
            ring,
            label: None,
            style: ShapeStyle::polygon(),
        }
    }

    /// Bounding box of the ring.
    pub fn bounds(&self) -> GeoBounds {
        // Ring is never empty for a constructed polygon.
        GeoBounds::from_points(&self.ring).expect("polygon ring is non-empty")
    }

    /// Whether the query point falls inside the ring's bounding box.
    pub fn contains(&self, query: LatLng) -> bool {
        self.bounds().contains(query)
    }
}
