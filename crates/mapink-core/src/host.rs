//! Rendering host contract.
//!
//! The drawing logic never talks to a map engine directly. A host
//! translates screen clicks into [`LatLng`](crate::geo::LatLng) values
//! before calling in, and implements this trait to mirror document
//! mutations as visual layers.

use crate::geo::LatLng;
use crate::shapes::{Shape, ShapeId, ShapeKind};

/// Capabilities required from the embedding map view.
pub trait MapHost {
    /// Render a committed shape as a layer.
    fn add_layer(&mut self, shape: &Shape);

    /// Remove a shape's layer.
    fn remove_layer(&mut self, id: ShapeId);

    /// Render (or replace) the in-progress drawing preview.
    fn set_preview(&mut self, kind: ShapeKind, vertices: &[LatLng]);

    /// Remove the in-progress drawing preview, if any.
    fn clear_preview(&mut self);

    /// Toggle the selection highlight on a layer.
    fn set_highlight(&mut self, id: ShapeId, on: bool);
}

/// Host that ignores every render call, for headless use.
#[derive(Debug, Default)]
pub struct NullHost;

impl MapHost for NullHost {
    fn add_layer(&mut self, _shape: &Shape) {}
    fn remove_layer(&mut self, _id: ShapeId) {}
    fn set_preview(&mut self, _kind: ShapeKind, _vertices: &[LatLng]) {}
    fn clear_preview(&mut self) {}
    fn set_highlight(&mut self, _id: ShapeId, _on: bool) {}
}

/// A render call observed by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    LayerAdded(ShapeId),
    LayerRemoved(ShapeId),
    Preview(ShapeKind, usize),
    PreviewCleared,
    Highlight(ShapeId, bool),
}

/// Host that records every render call, for tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of preview updates recorded.
    pub fn count_previews(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Preview(_, _)))
            .count()
    }
}

impl MapHost for RecordingHost {
    fn add_layer(&mut self, shape: &Shape) {
        self.events.push(HostEvent::LayerAdded(shape.id()));
    }

    fn remove_layer(&mut self, id: ShapeId) {
        self.events.push(HostEvent::LayerRemoved(id));
    }

    fn set_preview(&mut self, kind: ShapeKind, vertices: &[LatLng]) {
        self.events.push(HostEvent::Preview(kind, vertices.len()));
    }

    fn clear_preview(&mut self) {
        self.events.push(HostEvent::PreviewCleared);
    }

    fn set_highlight(&mut self, id: ShapeId, on: bool) {
        self.events.push(HostEvent::Highlight(id, on));
    }
}
