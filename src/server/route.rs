use crate::matchmaking::{MatchService, ServiceStats};
use crate::model::UserId;
use crate::server::websocket_listener;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Identity issued on an earlier connection.
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: ServiceStats,
}

/// `/ws` for the event channel, `/health` for a state snapshot and, when
/// `static_dir` is set, the client assets as fallback.
pub fn create_router(service: MatchService, static_dir: Option<&Path>) -> Router {
    debug!(?static_dir, "Creating routes");
    let router = Router::new()
        .route("/ws", get(handle_upgrade))
        .route("/health", get(health))
        .with_state(service);

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        ),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

async fn handle_upgrade(
    ws: WebSocketUpgrade,
    State(service): State<MatchService>,
    Query(params): Query<ConnectParams>,
) -> impl IntoResponse {
    websocket_listener::handle_websocket(ws, service, params.user_id).await
}

async fn health(State(service): State<MatchService>) -> Result<Json<HealthResponse>, StatusCode> {
    let stats = service.stats().map_err(|e| {
        error!(error = %e, "Failed to collect stats");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(HealthResponse {
        status: "ok",
        stats,
    }))
}
