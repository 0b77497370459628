//! MapInk persistence service.
//!
//! Session-authenticated storage of named GeoJSON documents, one
//! namespace per user, with an admin view across all owners.

pub mod auth;
pub mod models;
pub mod routes;
pub mod store;
