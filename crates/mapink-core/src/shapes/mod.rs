//! Shape definitions for drawn map objects.

mod marker;
mod polygon;
mod polyline;

pub use marker::Marker;
pub use polygon::Polygon;
pub use polyline::Polyline;

use crate::geo::LatLng;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable stroke/fill color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default vector layer blue.
    pub fn layer_blue() -> Self {
        Self::new(0x33, 0x88, 0xff, 255)
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    pub fn green() -> Self {
        Self::new(0, 128, 0, 255)
    }
}

/// Render style for vector layers (polylines and polygons).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: Rgba,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Dash pattern in pixels (None = solid).
    #[serde(default)]
    pub dash: Option<Vec<f64>>,
    /// Fill opacity, 0.0..=1.0 (only meaningful for polygons).
    #[serde(default)]
    pub fill_opacity: f64,
}

impl ShapeStyle {
    /// Committed polyline style.
    pub fn line() -> Self {
        Self {
            stroke_color: Rgba::red(),
            stroke_width: 3.0,
            dash: None,
            fill_opacity: 0.0,
        }
    }

    /// Committed polygon style.
    pub fn polygon() -> Self {
        Self {
            stroke_color: Rgba::green(),
            stroke_width: 3.0,
            dash: None,
            fill_opacity: 0.2,
        }
    }

    /// Dashed in-progress line preview.
    pub fn preview_line() -> Self {
        Self {
            stroke_color: Rgba::layer_blue(),
            stroke_width: 2.0,
            dash: Some(vec![5.0, 5.0]),
            fill_opacity: 0.0,
        }
    }

    /// Dashed in-progress polygon preview.
    pub fn preview_polygon() -> Self {
        Self {
            stroke_color: Rgba::green(),
            stroke_width: 2.0,
            dash: Some(vec![5.0, 5.0]),
            fill_opacity: 0.2,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Rgba::layer_blue(),
            stroke_width: 2.0,
            dash: None,
            fill_opacity: 0.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// The closed set of drawable geometry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Point,
    LineString,
    Polygon,
}

impl ShapeKind {
    /// GeoJSON geometry type name.
    pub fn geometry_type(&self) -> &'static str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::LineString => "LineString",
            ShapeKind::Polygon => "Polygon",
        }
    }

    /// Display label given to shapes of this kind when none is set.
    pub fn default_label(&self) -> &'static str {
        match self {
            ShapeKind::Point => "Marker",
            ShapeKind::LineString => "Line",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// Distance from a point to a line segment (a→b), planar.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Marker(Marker),
    Polyline(Polyline),
    Polygon(Polygon),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Marker(s) => s.id,
            Shape::Polyline(s) => s.id,
            Shape::Polygon(s) => s.id,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Marker(_) => ShapeKind::Point,
            Shape::Polyline(_) => ShapeKind::LineString,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Vertices in drawing order. Polygon rings are open here; closure is
    /// applied on serialization only.
    pub fn vertices(&self) -> Vec<LatLng> {
        match self {
            Shape::Marker(s) => vec![s.position],
            Shape::Polyline(s) => s.points.clone(),
            Shape::Polygon(s) => s.ring.clone(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Shape::Marker(s) => s.label.as_deref(),
            Shape::Polyline(s) => s.label.as_deref(),
            Shape::Polygon(s) => s.label.as_deref(),
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = Some(label.into());
        match self {
            Shape::Marker(s) => s.label = label,
            Shape::Polyline(s) => s.label = label,
            Shape::Polygon(s) => s.label = label,
        }
    }

    /// Label to display, falling back to the kind default.
    pub fn label_or_default(&self) -> &str {
        self.label().unwrap_or_else(|| self.kind().default_label())
    }
}
