use crate::bridge::BridgeSession;
use crate::config::Config;
use crate::stt::{SpeechStreamFactory, SpeechStreamProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,

    /// Opens vendor streams for new sessions
    pub provider: Arc<dyn SpeechStreamProvider>,

    /// Active bridge sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<BridgeSession>>>>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_provider(config, Arc::new(SpeechStreamFactory))
    }

    pub fn with_provider(config: Arc<Config>, provider: Arc<dyn SpeechStreamProvider>) -> Self {
        Self {
            config,
            provider,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
