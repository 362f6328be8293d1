//! HTTP adapters - REST and live endpoints.
//!
//! `router` assembles the whole surface:
//!
//! - `GET /health`
//! - `/api/workout-sessions/...` - REST endpoints (see [`workout_session`])
//! - `GET /api/workout-sessions/:id/live` - WebSocket upgrade

pub mod workout_session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::websocket::{ws_handler, RoomManager, WebSocketState};
use crate::application::session_actor::SessionActorRegistry;

pub use workout_session::{workout_session_routes, WorkoutSessionHandlers};

/// Shared state for building the router.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionActorRegistry>,
    pub room_manager: Arc<RoomManager>,
    /// Allowed CORS origins. Empty or `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Upper bound for a REST request. Live connections are not limited.
    pub request_timeout: Duration,
}

/// Build the axum Router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let rest = workout_session_routes(WorkoutSessionHandlers::from_registry(
        state.registry.clone(),
    ))
    .layer(TimeoutLayer::new(state.request_timeout))
    .layer(CompressionLayer::new());

    let live = Router::new()
        .route("/:id/live", get(ws_handler))
        .with_state(WebSocketState::new(
            state.room_manager.clone(),
            state.registry.clone(),
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/workout-sessions", rest.merge(live))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(&state.cors_origins))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(Any)
        .allow_origin(allow_origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::session_actor::ActorConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let room_manager = Arc::new(RoomManager::default());
        let registry = Arc::new(SessionActorRegistry::new(
            Arc::new(InMemorySessionStore::new()),
            room_manager.clone(),
            ActorConfig::default(),
        ));
        router(AppState {
            registry,
            room_manager,
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn health_reports_ok_with_request_id() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn rest_routes_are_nested() {
        let response = app()
            .oneshot(
                Request::get(format!(
                    "/api/workout-sessions/{}",
                    crate::domain::foundation::SessionId::new()
                ))
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn live_route_requires_upgrade() {
        let response = app()
            .oneshot(
                Request::get(format!(
                    "/api/workout-sessions/{}/live",
                    crate::domain::foundation::SessionId::new()
                ))
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();

        // Without upgrade headers the extractor rejects the request.
        assert!(response.status().is_client_error());
    }
}
