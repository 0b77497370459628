//! MapInk persistence server binary.

use mapink_server::routes::{AppState, app};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEV_SECRET: &str = "mapink-dev-secret";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapink_server=info,tower_http=info".into()),
        )
        .init();

    let secret = std::env::var("MAPINK_SECRET").unwrap_or_else(|_| {
        warn!("MAPINK_SECRET not set, using the development secret");
        DEV_SECRET.to_string()
    });
    let admin = std::env::var("MAPINK_ADMIN").unwrap_or_else(|_| "admin".to_string());
    let addr: SocketAddr = std::env::var("MAPINK_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .expect("invalid MAPINK_ADDR");

    let state = Arc::new(AppState::new(secret.as_bytes(), &admin));
    let router = app(state);

    info!("MapInk server listening on {}", addr);
    info!("admin account name: {:?}", admin);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, router).await.unwrap();
}
