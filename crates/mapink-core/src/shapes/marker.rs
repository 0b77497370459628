//! Marker shape (a single labeled point).

use super::ShapeId;
use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point marker anchored at one coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub(crate) id: ShapeId,
    /// Anchor position.
    pub position: LatLng,
    /// Popup label.
    pub label: Option<String>,
}

impl Marker {
    pub fn new(position: LatLng) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            label: None,
        }
    }

    pub fn with_label(position: LatLng, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            label: Some(label.into()),
        }
    }

    /// Great-circle distance from a query point, in meters.
    pub fn distance_to(&self, query: LatLng) -> f64 {
        self.position.distance_to(query)
    }
}
