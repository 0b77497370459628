//! Shape selection and hit-testing.

use crate::document::MapDocument;
use crate::geo::LatLng;
use crate::host::MapHost;
use crate::shapes::{Shape, ShapeId};

/// Hit tolerance for markers, in meters.
pub const MARKER_TOLERANCE_M: f64 = 20.0;
/// Perpendicular hit tolerance for polylines, in meters.
pub const LINE_TOLERANCE_M: f64 = 10.0;

/// Resolve the shape nearest to a query point, if any is within tolerance.
///
/// Markers score by great-circle distance, polylines by perpendicular
/// segment distance, and polygons score zero when the query falls inside
/// their ring bounds (the click is on the shape). Ties keep the
/// earliest-drawn shape.
pub fn hit_test(doc: &MapDocument, query: LatLng) -> Option<ShapeId> {
    let mut best: Option<(f64, ShapeId)> = None;
    for shape in doc.shapes_ordered() {
        let score = match shape {
            Shape::Marker(m) => {
                let d = m.distance_to(query);
                (d <= MARKER_TOLERANCE_M).then_some(d)
            }
            Shape::Polyline(l) => {
                let d = l.distance_to(query);
                (d <= LINE_TOLERANCE_M).then_some(d)
            }
            Shape::Polygon(p) => p.contains(query).then_some(0.0),
        };
        if let Some(score) = score {
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, shape.id()));
            }
        }
    }
    best.map(|(_, id)| id)
}

/// The current selection: an identity handle on at most one shape.
///
/// Holds an ID, never a reference, so a destroyed shape cannot leave a
/// dangling selection behind. Highlighting is transient render state
/// and is never persisted.
#[derive(Debug, Default)]
pub struct Selection {
    current: Option<ShapeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected shape, if it still exists.
    pub fn selected(&self) -> Option<ShapeId> {
        self.current
    }

    /// Hit-test at `query` and move the highlight to the result.
    ///
    /// The previous selection is always de-highlighted first, whether or
    /// not anything new is hit.
    pub fn select_at(
        &mut self,
        doc: &MapDocument,
        host: &mut dyn MapHost,
        query: LatLng,
    ) -> Option<ShapeId> {
        self.clear(doc, host);
        let hit = hit_test(doc, query);
        if let Some(id) = hit {
            host.set_highlight(id, true);
            self.current = Some(id);
        }
        hit
    }

    /// Select a known shape directly (e.g. a click reported on its layer).
    pub fn set(&mut self, doc: &MapDocument, host: &mut dyn MapHost, id: ShapeId) {
        self.clear(doc, host);
        if doc.contains(id) {
            host.set_highlight(id, true);
            self.current = Some(id);
        }
    }

    /// Drop the selection, de-highlighting the shape if it still exists.
    pub fn clear(&mut self, doc: &MapDocument, host: &mut dyn MapHost) {
        if let Some(id) = self.current.take() {
            if doc.contains(id) {
                host.set_highlight(id, false);
            }
        }
    }

    /// Forget a destroyed shape without touching the host.
    pub fn forget(&mut self, id: ShapeId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }

    /// Forget any selection without touching the host.
    pub fn forget_all(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, RecordingHost};
    use crate::shapes::{Marker, Polygon, Polyline};

    #[test]
    fn test_marker_hit_within_tolerance() {
        let mut doc = MapDocument::new();
        let id = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(51.505, -0.09))));

        // ~11 m north of the marker.
        assert_eq!(hit_test(&doc, LatLng::new(51.5051, -0.09)), Some(id));
        // ~55 m north is out of tolerance.
        assert_eq!(hit_test(&doc, LatLng::new(51.5055, -0.09)), None);
    }

    #[test]
    fn test_nearest_marker_wins() {
        let mut doc = MapDocument::new();
        let _far = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(51.50515, -0.09))));
        let near = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(51.50505, -0.09))));

        assert_eq!(hit_test(&doc, LatLng::new(51.505, -0.09)), Some(near));
    }

    #[test]
    fn test_polygon_containment_beats_nearby_line() {
        let mut doc = MapDocument::new();
        let _line = doc.add_shape(Shape::Polyline(Polyline::new(vec![
            LatLng::new(0.00005, 0.0),
            LatLng::new(0.00005, 0.01),
        ])));
        let poly = doc.add_shape(Shape::Polygon(Polygon::new(vec![
            LatLng::new(-0.001, -0.001),
            LatLng::new(-0.001, 0.011),
            LatLng::new(0.001, 0.005),
        ])));

        // Query inside the polygon bounds, ~5.5 m from the line.
        assert_eq!(hit_test(&doc, LatLng::new(0.0, 0.005)), Some(poly));
    }

    #[test]
    fn test_select_moves_highlight() {
        let mut doc = MapDocument::new();
        let a = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(0.0, 0.0))));
        let b = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(10.0, 10.0))));

        let mut host = RecordingHost::new();
        let mut selection = Selection::new();

        assert_eq!(selection.select_at(&doc, &mut host, LatLng::new(0.0, 0.0)), Some(a));
        assert_eq!(selection.select_at(&doc, &mut host, LatLng::new(10.0, 10.0)), Some(b));
        assert_eq!(
            host.events,
            vec![
                HostEvent::Highlight(a, true),
                HostEvent::Highlight(a, false),
                HostEvent::Highlight(b, true),
            ]
        );
        assert_eq!(selection.selected(), Some(b));
    }

    #[test]
    fn test_miss_clears_selection() {
        let mut doc = MapDocument::new();
        let a = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(0.0, 0.0))));

        let mut host = RecordingHost::new();
        let mut selection = Selection::new();
        selection.select_at(&doc, &mut host, LatLng::new(0.0, 0.0));
        assert_eq!(selection.select_at(&doc, &mut host, LatLng::new(40.0, 40.0)), None);
        assert_eq!(selection.selected(), None);
        assert_eq!(host.events.last(), Some(&HostEvent::Highlight(a, false)));
    }

    #[test]
    fn test_forget_destroyed_shape() {
        let mut doc = MapDocument::new();
        let a = doc.add_shape(Shape::Marker(Marker::new(LatLng::new(0.0, 0.0))));

        let mut host = RecordingHost::new();
        let mut selection = Selection::new();
        selection.set(&doc, &mut host, a);

        doc.remove_shape(a);
        selection.forget(a);
        assert_eq!(selection.selected(), None);

        // Clearing after the shape is gone must not touch the host.
        let before = host.events.len();
        selection.clear(&doc, &mut host);
        assert_eq!(host.events.len(), before);
    }
}
