//! HTTP persistence client for the MapInk server.

use crate::client::{ClientError, PersistenceClient, validate_name};
use crate::geojson::FeatureCollection;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    token: String,
    username: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct SaveBody<'a> {
    file_name: &'a str,
    geojson: &'a FeatureCollection,
}

/// A document visible through the admin listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDocument {
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Session-holding client for the MapInk REST API.
///
/// The bearer token lives only in this struct; `logout` drops it.
/// Tokens are stateless, so a dropped token stays cryptographically
/// valid until its expiry. Logout is a client-side discard, not a
/// server-side revocation.
#[derive(Debug)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    username: Option<String>,
    role: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            token: None,
            username: None,
            role: None,
        }
    }

    /// Username of the active session, if logged in.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Whether the active session carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    /// Register a new account and start a session.
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&CredentialsBody { username, password })
            .send()?;
        self.accept_session(resp)
    }

    /// Log in to an existing account.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&CredentialsBody { username, password })
            .send()?;
        self.accept_session(resp).map_err(|err| match err {
            ClientError::Unauthenticated => ClientError::InvalidCredentials,
            other => other,
        })
    }

    /// Discard the held credential. The server is notified for logging,
    /// but a failure there still drops the token locally.
    pub fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            let result = self
                .http
                .post(format!("{}/logout", self.base_url))
                .bearer_auth(&token)
                .send();
            if let Err(err) = result {
                log::warn!("logout request failed: {err}");
            }
        }
        self.username = None;
        self.role = None;
    }

    /// All users' documents. Requires an admin session.
    pub fn list_all_documents(&self) -> Result<Vec<RemoteDocument>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/admin/files", self.base_url))
            .bearer_auth(self.bearer()?)
            .send()?;
        Ok(check(resp, "admin listing")?.json()?)
    }

    /// Load another owner's document. Requires an admin session.
    pub fn load_document_for(&self, owner: &str, name: &str) -> Result<Value, ClientError> {
        validate_name(name)?;
        let resp = self
            .http
            .get(format!("{}/admin/load/{}/{}", self.base_url, owner, name))
            .bearer_auth(self.bearer()?)
            .send()?;
        Ok(check(resp, name)?.json()?)
    }

    fn bearer(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::Unauthenticated)
    }

    fn accept_session(&mut self, resp: Response) -> Result<(), ClientError> {
        let session: SessionBody = check(resp, "session")?.json()?;
        self.token = Some(session.token);
        self.username = Some(session.username);
        self.role = Some(session.role);
        Ok(())
    }
}

impl PersistenceClient for HttpClient {
    fn save_document(&self, name: &str, doc: &FeatureCollection) -> Result<(), ClientError> {
        validate_name(name)?;
        let resp = self
            .http
            .post(format!("{}/api/save", self.base_url))
            .bearer_auth(self.bearer()?)
            .json(&SaveBody {
                file_name: name,
                geojson: doc,
            })
            .send()?;
        check(resp, name)?;
        Ok(())
    }

    fn load_document(&self, name: &str) -> Result<Value, ClientError> {
        validate_name(name)?;
        let resp = self
            .http
            .get(format!("{}/api/load/{}", self.base_url, name))
            .bearer_auth(self.bearer()?)
            .send()?;
        Ok(check(resp, name)?.json()?)
    }

    fn list_documents(&self) -> Result<Vec<String>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/files", self.base_url))
            .bearer_auth(self.bearer()?)
            .send()?;
        Ok(check(resp, "listing")?.json()?)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

fn check(resp: Response, what: &str) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::InvalidInput(message),
        StatusCode::CONFLICT => ClientError::UsernameTaken,
        StatusCode::UNAUTHORIZED => ClientError::Unauthenticated,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        StatusCode::NOT_FOUND => ClientError::NotFound(what.to_string()),
        _ => ClientError::Server(message),
    })
}
