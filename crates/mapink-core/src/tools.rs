//! Drawing tools and the click-driven state machine.

use crate::document::MapDocument;
use crate::geo::LatLng;
use crate::host::MapHost;
use crate::selection::{self, Selection};
use crate::shapes::{Marker, Polygon, Polyline, Shape, ShapeId, ShapeKind};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    None,
    Marker,
    Line,
    Polygon,
    Delete,
}

/// State of the drawing machine, determined by the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    /// No tool active; clicks are ignored.
    Idle,
    /// Each click commits one marker immediately.
    PlacingPoint,
    /// Clicks accumulate polyline vertices.
    CollectingLine,
    /// Clicks accumulate polygon ring vertices.
    CollectingPolygon,
    /// Clicks hit-test and destroy the resolved shape.
    Deleting,
}

impl ToolKind {
    /// The machine state this tool drives.
    pub fn state(self) -> DrawState {
        match self {
            ToolKind::None => DrawState::Idle,
            ToolKind::Marker => DrawState::PlacingPoint,
            ToolKind::Line => DrawState::CollectingLine,
            ToolKind::Polygon => DrawState::CollectingPolygon,
            ToolKind::Delete => DrawState::Deleting,
        }
    }
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No active tool; nothing happened.
    Ignored,
    /// A shape was committed to the document.
    Committed(ShapeId),
    /// A vertex was appended to the in-progress shape (total pending count).
    VertexAdded(usize),
    /// The delete tool destroyed a shape.
    Deleted(ShapeId),
    /// The delete tool found nothing under the click.
    Missed,
}

/// The in-progress interaction: active tool, pending vertices, selection.
///
/// One instance owns all ephemeral drawing state and is passed
/// explicitly into every operation, so the machine can be driven
/// without a live map behind it.
#[derive(Debug, Default)]
pub struct DrawingContext {
    tool: ToolKind,
    pending: Vec<LatLng>,
    pub selection: Selection,
}

impl DrawingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active tool.
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Current machine state.
    pub fn state(&self) -> DrawState {
        self.tool.state()
    }

    /// Vertices accumulated for the in-progress shape.
    pub fn pending(&self) -> &[LatLng] {
        &self.pending
    }

    /// Switch tools. Any in-progress multi-point shape is finalized
    /// first (committed if it meets the minimum vertex count, silently
    /// discarded otherwise). Returns the auto-committed shape, if any.
    pub fn set_tool(
        &mut self,
        doc: &mut MapDocument,
        host: &mut dyn MapHost,
        tool: ToolKind,
    ) -> Option<ShapeId> {
        let committed = self.finish(doc, host);
        self.tool = tool;
        committed
    }

    /// Interpret a map click according to the current state.
    pub fn handle_click(
        &mut self,
        doc: &mut MapDocument,
        host: &mut dyn MapHost,
        at: LatLng,
    ) -> ClickOutcome {
        match self.state() {
            DrawState::Idle => ClickOutcome::Ignored,
            DrawState::PlacingPoint => {
                let id = self.commit(doc, host, Shape::Marker(Marker::new(at)));
                ClickOutcome::Committed(id)
            }
            DrawState::CollectingLine => {
                self.pending.push(at);
                if self.pending.len() >= 2 {
                    host.set_preview(ShapeKind::LineString, &self.pending);
                }
                ClickOutcome::VertexAdded(self.pending.len())
            }
            DrawState::CollectingPolygon => {
                self.pending.push(at);
                if self.pending.len() >= 3 {
                    host.set_preview(ShapeKind::Polygon, &self.pending);
                }
                ClickOutcome::VertexAdded(self.pending.len())
            }
            DrawState::Deleting => match selection::hit_test(doc, at) {
                Some(id) => {
                    host.remove_layer(id);
                    doc.remove_shape(id);
                    self.selection.forget(id);
                    ClickOutcome::Deleted(id)
                }
                None => ClickOutcome::Missed,
            },
        }
    }

    /// Finalize the in-progress shape.
    ///
    /// Commits a polyline at ≥2 pending vertices or a polygon at ≥3;
    /// anything less is discarded without error (the drawing was
    /// cancelled, not broken). Pending state and preview are cleared
    /// either way.
    pub fn finish(&mut self, doc: &mut MapDocument, host: &mut dyn MapHost) -> Option<ShapeId> {
        let pending = std::mem::take(&mut self.pending);
        host.clear_preview();

        let shape = match self.tool {
            ToolKind::Line if pending.len() >= 2 => Some(Shape::Polyline(Polyline::new(pending))),
            ToolKind::Polygon if pending.len() >= 3 => Some(Shape::Polygon(Polygon::new(pending))),
            _ => None,
        };
        shape.map(|s| self.commit(doc, host, s))
    }

    /// Discard pending vertices and the preview. With `full`, also
    /// drop back to no tool.
    pub fn reset(&mut self, host: &mut dyn MapHost, full: bool) {
        self.pending.clear();
        host.clear_preview();
        if full {
            self.tool = ToolKind::None;
        }
    }

    /// Replace the document with a freshly loaded one and rebuild its
    /// layers. In-progress drawing state and the selection are dropped;
    /// the active tool survives.
    ///
    /// Callers import first and only swap on success, so a malformed
    /// load never disturbs the current document.
    pub fn load_document(
        &mut self,
        doc: &mut MapDocument,
        host: &mut dyn MapHost,
        loaded: MapDocument,
    ) {
        for id in doc.ids_ordered() {
            host.remove_layer(id);
        }
        self.selection.forget_all();
        self.reset(host, false);
        *doc = loaded;
        for shape in doc.shapes_ordered() {
            host.add_layer(shape);
        }
    }

    /// Remove every shape and all in-progress state.
    pub fn clear_all(&mut self, doc: &mut MapDocument, host: &mut dyn MapHost) {
        for id in doc.ids_ordered() {
            host.remove_layer(id);
        }
        doc.clear();
        self.selection.forget_all();
        self.reset(host, true);
    }

    fn commit(&mut self, doc: &mut MapDocument, host: &mut dyn MapHost, mut shape: Shape) -> ShapeId {
        let label = shape.kind().default_label();
        shape.set_label(label);
        host.add_layer(&shape);
        doc.add_shape(shape)
    }
}
