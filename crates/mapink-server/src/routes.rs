//! HTTP API: session routes, per-user document routes, admin routes.
//!
//! Authorization happens here, one layer above the store: the bearer
//! middleware rejects unauthenticated requests before any handler
//! runs, and handlers compare the verified session against the
//! requested owner or role.

use crate::auth::{AuthError, Claims, Role, SessionKeys, UserRegistry};
use crate::models::{Credentials, ErrorResponse, MessageResponse, SaveRequest, SessionResponse};
use crate::store::{DocumentStore, DocumentSummary, StoreError};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    pub users: UserRegistry,
    pub store: DocumentStore,
    pub keys: SessionKeys,
}

impl AppState {
    pub fn new(secret: &[u8], admin_username: &str) -> Self {
        Self {
            users: UserRegistry::new(admin_username),
            store: DocumentStore::new(),
            keys: SessionKeys::from_secret(secret),
        }
    }
}

/// Request failures, mapped onto status codes. Internal detail is
/// logged server-side and never leaks into the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("admin access required")]
    Forbidden,
    #[error("document not found")]
    NotFound,
    #[error("server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(detail) => {
                error!("request failed: {detail}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            // self.to_string() is the generic "server error" for Internal.
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken => ApiError::UsernameTaken,
            AuthError::InvalidInput(msg) => ApiError::InvalidInput(msg.to_string()),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidSession => ApiError::Unauthenticated,
            AuthError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound,
        }
    }
}

/// Build the router.
pub fn app(state: Arc<AppState>) -> Router {
    let authed = Router::new()
        .route("/logout", post(logout))
        .route("/api/save", post(save_document))
        .route("/api/load/{name}", get(load_document))
        .route("/api/files", get(list_documents))
        .route("/admin/files", get(admin_list_documents))
        .route("/admin/load/{owner}/{name}", get(admin_load_document))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(authed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Verify the bearer credential and stash the claims for handlers.
/// Requests without a valid session never reach the store.
async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;
    let claims = state
        .keys
        .verify(token)
        .map_err(|_| ApiError::Unauthenticated)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

async fn health() -> &'static str {
    "ok"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<SessionResponse>, ApiError> {
    let role = state.users.register(&creds.username, &creds.password)?;
    let token = state.keys.issue(&creds.username, role)?;
    info!("registered user {:?}", creds.username);
    Ok(Json(SessionResponse {
        token,
        username: creds.username,
        role,
    }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<SessionResponse>, ApiError> {
    let role = state.users.login(&creds.username, &creds.password)?;
    let token = state.keys.issue(&creds.username, role)?;
    info!("user {:?} logged in", creds.username);
    Ok(Json(SessionResponse {
        token,
        username: creds.username,
        role,
    }))
}

/// Acknowledge a client-side credential discard. Sessions are
/// stateless, so the token itself stays valid until expiry; there is
/// no revocation list.
async fn logout(Extension(claims): Extension<Claims>) -> Json<MessageResponse> {
    info!("user {:?} logged out", claims.sub);
    Json(MessageResponse {
        message: "logged out".to_string(),
    })
}

async fn save_document(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = req.file_name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("file name is required".to_string()));
    }
    state.store.save(&claims.sub, name, req.geojson);
    info!("saved {:?} for {:?}", name, claims.sub);
    Ok(Json(MessageResponse {
        message: "saved".to_string(),
    }))
}

async fn load_document(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let doc = state.store.load(&claims.sub, &name)?;
    Ok(Json(doc.payload))
}

async fn list_documents(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Json<Vec<String>> {
    Json(state.store.list(&claims.sub))
}

async fn admin_list_documents(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.list_all()))
}

/// Owner-bypassing load, gated on the admin role.
async fn admin_load_document(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&claims)?;
    let doc = state.store.load(&owner, &name)?;
    info!("admin {:?} loaded {}/{}", claims.sub, owner, name);
    Ok(Json(doc.payload))
}

fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(AppState::new(b"test-secret", "admin")))
    }

    async fn request(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn session(app: &Router, username: &str, password: &str) -> String {
        let (status, body) = request(
            app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, _) = request(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_login_and_duplicate() {
        let app = test_app();
        let (status, body) = request(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": "bob", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "bob");
        assert_eq!(body["role"], "user");

        let (status, body) = request(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": "bob", "password": "pw2" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "username already taken");

        let (status, _) = request(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": "bob", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = request(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": "bob", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_document_routes_require_session() {
        let app = test_app();
        let (status, _) = request(&app, "GET", "/api/files", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = request(&app, "GET", "/api/files", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_save_load_list_cycle() {
        let app = test_app();
        let token = session(&app, "alice", "pw").await;

        let geojson = json!({ "type": "FeatureCollection", "features": [] });
        let (status, _) = request(
            &app,
            "POST",
            "/api/save",
            Some(&token),
            Some(json!({ "file_name": "map1", "geojson": geojson })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = request(&app, "GET", "/api/load/map1", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, geojson);

        let (status, body) = request(&app, "GET", "/api/files", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["map1"]));

        let (status, _) = request(&app, "GET", "/api/load/missing", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_file_name_rejected() {
        let app = test_app();
        let token = session(&app, "alice", "pw").await;
        let (status, _) = request(
            &app,
            "POST",
            "/api/save",
            Some(&token),
            Some(json!({ "file_name": "  ", "geojson": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_documents_are_owner_scoped() {
        let app = test_app();
        let alice = session(&app, "alice", "pw").await;
        let bob = session(&app, "bob", "pw").await;

        let (status, _) = request(
            &app,
            "POST",
            "/api/save",
            Some(&alice),
            Some(json!({ "file_name": "secret", "geojson": {"type": "FeatureCollection", "features": []} })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Bob cannot see or load Alice's document through user routes.
        let (_, body) = request(&app, "GET", "/api/files", Some(&bob), None).await;
        assert_eq!(body, json!([]));
        let (status, _) = request(&app, "GET", "/api/load/secret", Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_routes_gated_on_role() {
        let app = test_app();
        let alice = session(&app, "alice", "pw").await;
        let admin = session(&app, "admin", "pw").await;

        let (status, _) = request(
            &app,
            "POST",
            "/api/save",
            Some(&alice),
            Some(json!({ "file_name": "map1", "geojson": {"type": "FeatureCollection", "features": []} })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Plain users are rejected.
        let (status, _) = request(&app, "GET", "/admin/files", Some(&alice), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The admin sees everyone's documents and can load them.
        let (status, body) = request(&app, "GET", "/admin/files", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["owner"], "alice");
        assert_eq!(body[0]["name"], "map1");

        let (status, body) =
            request(&app, "GET", "/admin/load/alice/map1", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn test_logout_round_trip() {
        let app = test_app();
        let token = session(&app, "alice", "pw").await;
        let (status, body) = request(&app, "POST", "/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "logged out");

        // Stateless sessions: the discarded token still verifies until
        // it expires. The client is responsible for dropping it.
        let (status, _) = request(&app, "GET", "/api/files", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
