//! HTTP server: the bridge WebSocket endpoint plus observability routes
//!
//! - GET /transcriber - WebSocket upgrade for the calling platform
//! - GET /sessions - List active bridge sessions
//! - GET /sessions/:id - Per-session statistics
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
