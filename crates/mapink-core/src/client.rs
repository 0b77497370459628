//! Persistence client interface.
//!
//! The autosaver and any UI talk to storage through
//! [`PersistenceClient`]; implementations are the in-memory client
//! below and the HTTP client in [`crate::api`].

use crate::geojson::FeatureCollection;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

/// Client-visible persistence failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request went out.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("admin access required")]
    Forbidden,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Reject empty document names before any transport is involved.
pub fn validate_name(name: &str) -> Result<(), ClientError> {
    if name.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "document name is required".to_string(),
        ));
    }
    Ok(())
}

/// Storage backend for named portable documents.
pub trait PersistenceClient {
    /// Upsert a document under a name.
    fn save_document(&self, name: &str, doc: &FeatureCollection) -> Result<(), ClientError>;

    /// Fetch the raw portable document saved under a name.
    fn load_document(&self, name: &str) -> Result<Value, ClientError>;

    /// Names of saved documents.
    fn list_documents(&self) -> Result<Vec<String>, ClientError>;
}

/// In-memory client for tests and offline sketching.
#[derive(Debug, Default)]
pub struct MemoryClient {
    documents: RwLock<HashMap<String, Value>>,
    saves: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored value, if present.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.documents.read().ok()?.get(name).cloned()
    }

    /// Make the next save fail with a server error.
    pub fn fail_next_save(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl PersistenceClient for MemoryClient {
    fn save_document(&self, name: &str, doc: &FeatureCollection) -> Result<(), ClientError> {
        validate_name(name)?;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Server("injected save failure".to_string()));
        }
        let value = serde_json::to_value(doc).map_err(|e| ClientError::Server(e.to_string()))?;
        let mut docs = self
            .documents
            .write()
            .map_err(|e| ClientError::Server(format!("lock error: {e}")))?;
        docs.insert(name.to_string(), value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_document(&self, name: &str) -> Result<Value, ClientError> {
        validate_name(name)?;
        let docs = self
            .documents
            .read()
            .map_err(|e| ClientError::Server(format!("lock error: {e}")))?;
        docs.get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }

    fn list_documents(&self) -> Result<Vec<String>, ClientError> {
        let docs = self
            .documents
            .read()
            .map_err(|e| ClientError::Server(format!("lock error: {e}")))?;
        let mut names: Vec<String> = docs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
