//! MapInk Core Library
//!
//! Platform-agnostic drawing, selection, and persistence logic for the
//! MapInk map sketching client. A rendering host (anything that can
//! turn clicks into coordinates and draw layers) plugs in through
//! [`host::MapHost`]; persistence plugs in through
//! [`client::PersistenceClient`].

pub mod api;
pub mod autosave;
pub mod client;
pub mod document;
pub mod geo;
pub mod geojson;
pub mod host;
pub mod selection;
pub mod shapes;
pub mod tools;

pub use autosave::{AutosaveScheduler, Autosaver};
pub use client::{ClientError, MemoryClient, PersistenceClient};
pub use document::MapDocument;
pub use geo::LatLng;
pub use host::{MapHost, NullHost, RecordingHost};
pub use selection::Selection;
pub use tools::{ClickOutcome, DrawState, DrawingContext, ToolKind};
