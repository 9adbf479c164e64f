use super::state::AppState;
use crate::bridge::{BridgeSession, SessionStats};
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /transcriber
/// WebSocket upgrade for the calling platform's duplex audio stream
pub async fn transcriber_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let session_id = format!("session-{}", uuid::Uuid::new_v4());
        let session = Arc::new(BridgeSession::with_provider(
            session_id.clone(),
            Arc::clone(&state.config),
            Arc::clone(&state.provider),
        ));

        info!("Caller connected: {}", session_id);

        // Register so /sessions can see the live call
        {
            let mut sessions = state.sessions.write().await;
            sessions.insert(session_id.clone(), Arc::clone(&session));
        }

        if let Err(e) = session.run(socket).await {
            error!("Session {} failed: {:#}", session_id, e);
        }

        {
            let mut sessions = state.sessions.write().await;
            sessions.remove(&session_id);
        }

        info!("Caller disconnected: {}", session_id);
    })
}

/// GET /sessions
/// List statistics for all active sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    let mut stats: Vec<SessionStats> = Vec::with_capacity(sessions.len());
    for session in sessions.values() {
        stats.push(session.stats().await);
    }

    (StatusCode::OK, Json(stats)).into_response()
}

/// GET /sessions/:session_id
/// Get statistics for one session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
