//! Keyed document storage.
//!
//! Pure key-value semantics over `(owner, name)`; authorization is the
//! caller's job. The per-key map entry lock serializes concurrent
//! saves to the same document, so readers observe either the previous
//! payload or the new one, never a partial write, and the last save to
//! complete wins.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {owner}/{name}")]
    NotFound { owner: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocKey {
    owner: String,
    name: String,
}

/// One stored document revision.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A document as seen in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory store of one payload per `(owner, name)`.
#[derive(Default)]
pub struct DocumentStore {
    documents: DashMap<DocKey, StoredDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert. An existing document keeps its `created_at`; payload and
    /// `updated_at` are replaced in one step under the entry lock.
    pub fn save(&self, owner: &str, name: &str, payload: Value) {
        let key = DocKey {
            owner: owner.to_string(),
            name: name.to_string(),
        };
        let now = Utc::now();
        match self.documents.entry(key) {
            Entry::Occupied(mut slot) => {
                let doc = slot.get_mut();
                doc.payload = payload;
                doc.updated_at = now;
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument {
                    payload,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
    }

    /// Fetch a document. Missing keys fail without mutating anything.
    pub fn load(&self, owner: &str, name: &str) -> Result<StoredDocument, StoreError> {
        let key = DocKey {
            owner: owner.to_string(),
            name: name.to_string(),
        };
        self.documents
            .get(&key)
            .map(|doc| doc.clone())
            .ok_or_else(|| StoreError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    /// Names owned by one user, most recently created first.
    pub fn list(&self, owner: &str) -> Vec<String> {
        let mut entries: Vec<(String, DateTime<Utc>)> = self
            .documents
            .iter()
            .filter(|entry| entry.key().owner == owner)
            .map(|entry| (entry.key().name.clone(), entry.value().created_at))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.into_iter().map(|(name, _)| name).collect()
    }

    /// Every document in the store, most recently created first.
    pub fn list_all(&self) -> Vec<DocumentSummary> {
        let mut entries: Vec<DocumentSummary> = self
            .documents
            .iter()
            .map(|entry| DocumentSummary {
                owner: entry.key().owner.clone(),
                name: entry.key().name.clone(),
                created_at: entry.value().created_at,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.owner.cmp(&b.owner))
                .then_with(|| a.name.cmp(&b.name))
        });
        entries
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
