//! GeoJSON serialization for map documents.
//!
//! Export produces a `FeatureCollection` with one feature per shape;
//! import rebuilds a [`MapDocument`] from arbitrary JSON. GeoJSON
//! coordinates are `[longitude, latitude]`, the reverse of the
//! internal (lat, lng) order.

use crate::document::MapDocument;
use crate::geo::LatLng;
use crate::shapes::{Marker, Polygon, Polyline, Shape, ShapeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

fn malformed(msg: impl Into<String>) -> GeoJsonError {
    GeoJsonError::MalformedDocument(msg.into())
}

/// A `[lng, lat]` coordinate pair.
pub type Position = [f64; 2];

/// The portable document: a GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
}

fn position(p: LatLng) -> Position {
    [p.lng, p.lat]
}

/// Export a document as a feature collection, in insertion order.
///
/// Unlabeled shapes get their kind's default name; polygon rings are
/// closed by repeating the first vertex.
pub fn export(doc: &MapDocument) -> FeatureCollection {
    let features = doc
        .shapes_ordered()
        .map(|shape| {
            let geometry = match shape {
                Shape::Marker(m) => Geometry::Point {
                    coordinates: position(m.position),
                },
                Shape::Polyline(l) => Geometry::LineString {
                    coordinates: l.points.iter().copied().map(position).collect(),
                },
                Shape::Polygon(p) => {
                    let mut ring: Vec<Position> = p.ring.iter().copied().map(position).collect();
                    if let Some(&first) = ring.first() {
                        ring.push(first);
                    }
                    Geometry::Polygon {
                        coordinates: vec![ring],
                    }
                }
            };
            Feature {
                kind: "Feature".to_string(),
                geometry,
                properties: Properties {
                    name: shape.label_or_default().to_string(),
                },
            }
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features,
    }
}

/// Import a document from raw GeoJSON.
///
/// All-or-nothing: any feature that parses into invalid geometry fails
/// the whole import, so a caller never ends up with a partial document.
/// Unrecognized `geometry.type` values are skipped, not fatal, to
/// tolerate foreign documents.
pub fn import(value: &Value) -> Result<MapDocument, GeoJsonError> {
    if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(malformed("expected type \"FeatureCollection\""));
    }
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing \"features\" array"))?;

    let mut doc = MapDocument::new();
    for feature in features {
        let geometry = feature
            .get("geometry")
            .ok_or_else(|| malformed("feature without geometry"))?;
        let geom_type = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("geometry without type"))?;
        let coordinates = geometry
            .get("coordinates")
            .ok_or_else(|| malformed("geometry without coordinates"))?;

        let label = feature
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let shape = match geom_type {
            "Point" => {
                let position = parse_position(coordinates)?;
                Shape::Marker(Marker {
                    label: label.or_else(|| default_label(ShapeKind::Point)),
                    ..Marker::new(position)
                })
            }
            "LineString" => {
                let points = parse_positions(coordinates)?;
                if points.len() < 2 {
                    return Err(malformed("LineString with fewer than 2 positions"));
                }
                Shape::Polyline(Polyline {
                    label: label.or_else(|| default_label(ShapeKind::LineString)),
                    ..Polyline::new(points)
                })
            }
            "Polygon" => {
                let outer = coordinates
                    .as_array()
                    .and_then(|rings| rings.first())
                    .ok_or_else(|| malformed("Polygon without an outer ring"))?;
                let mut ring = parse_positions(outer)?;
                // Serialized rings repeat the first vertex; store them open.
                if ring.len() >= 4 && ring.first() == ring.last() {
                    ring.pop();
                }
                if ring.len() < 3 {
                    return Err(malformed("Polygon ring with fewer than 3 vertices"));
                }
                Shape::Polygon(Polygon {
                    label: label.or_else(|| default_label(ShapeKind::Polygon)),
                    ..Polygon::new(ring)
                })
            }
            other => {
                log::debug!("skipping unsupported geometry type {other:?}");
                continue;
            }
        };
        doc.add_shape(shape);
    }
    Ok(doc)
}

fn default_label(kind: ShapeKind) -> Option<String> {
    Some(kind.default_label().to_string())
}

fn parse_position(value: &Value) -> Result<LatLng, GeoJsonError> {
    let pair = value
        .as_array()
        .ok_or_else(|| malformed("position is not an array"))?;
    if pair.len() < 2 {
        return Err(malformed("position needs [lng, lat]"));
    }
    let lng = pair[0]
        .as_f64()
        .ok_or_else(|| malformed("longitude is not a number"))?;
    let lat = pair[1]
        .as_f64()
        .ok_or_else(|| malformed("latitude is not a number"))?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(malformed("non-finite coordinate"));
    }
    Ok(LatLng::new(lat, lng))
}

fn parse_positions(value: &Value) -> Result<Vec<LatLng>, GeoJsonError> {
    value
        .as_array()
        .ok_or_else(|| malformed("coordinates are not an array"))?
        .iter()
        .map(parse_position)
        .collect()
}
