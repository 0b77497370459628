//! Map document: the collection of drawn shapes.

use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All shapes drawn on the map, keyed by ID.
///
/// Iteration for export follows insertion order. Owner, name, and
/// timestamps of a persisted document are tracked by the store, not
/// here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapDocument {
    /// Shapes by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Insertion order of shape IDs.
    order: Vec<ShapeId>,
}

impl MapDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the document.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.order.push(id);
        self.shapes.insert(id, shape);
        id
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.order.retain(|&shape_id| shape_id != id);
        self.shapes.remove(&id)
    }

    /// Remove all shapes.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.order.clear();
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Whether a shape with this ID exists.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Shapes in insertion order.
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Shape IDs in insertion order.
    pub fn ids_ordered(&self) -> Vec<ShapeId> {
        self.order.clone()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}
