//! End-to-end flow: register, draw, save, log out, log back in, load.
//!
//! Drives the real client drawing machine against the real router;
//! only the map rendering and the network transport are stubbed out.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use mapink_server::routes::{AppState, app};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use mapink_core::geo::LatLng;
use mapink_core::host::NullHost;
use mapink_core::shapes::ShapeKind;
use mapink_core::{DrawingContext, MapDocument, ToolKind, geojson};

async fn send(
    router: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
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

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_draw_save_logout_login_load() {
    let router = app(Arc::new(AppState::new(b"scenario-secret", "admin")));

    // Register alice.
    let (status, body) = send(
        &router,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    // Draw one marker at (10, 20) and one triangle.
    let mut doc = MapDocument::new();
    let mut host = NullHost;
    let mut ctx = DrawingContext::new();

    ctx.set_tool(&mut doc, &mut host, ToolKind::Marker);
    ctx.handle_click(&mut doc, &mut host, LatLng::new(10.0, 20.0));

    ctx.set_tool(&mut doc, &mut host, ToolKind::Polygon);
    ctx.handle_click(&mut doc, &mut host, LatLng::new(0.0, 0.0));
    ctx.handle_click(&mut doc, &mut host, LatLng::new(0.0, 1.0));
    ctx.handle_click(&mut doc, &mut host, LatLng::new(1.0, 1.0));
    ctx.finish(&mut doc, &mut host);
    assert_eq!(doc.len(), 2);

    // Save as "map1".
    let portable = serde_json::to_value(geojson::export(&doc)).unwrap();
    let (status, _) = send(
        &router,
        "POST",
        "/api/save",
        Some(&token),
        Some(json!({ "file_name": "map1", "geojson": portable })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Log out, then back in as alice.
    let (status, _) = send(&router, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    // Load "map1" and rebuild the document.
    let (status, payload) = send(&router, "GET", "/api/load/map1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let loaded = geojson::import(&payload).unwrap();

    assert_eq!(loaded.len(), 2);
    let shapes: Vec<_> = loaded.shapes_ordered().collect();
    assert_eq!(shapes[0].kind(), ShapeKind::Point);
    assert_eq!(shapes[0].vertices(), vec![LatLng::new(10.0, 20.0)]);
    assert_eq!(shapes[1].kind(), ShapeKind::Polygon);
    assert_eq!(shapes[1].vertices().len(), 3);
}
