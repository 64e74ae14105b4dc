use std::sync::Arc;

use crate::assist::ContentAssistant;
use crate::config::Config;
use crate::store::ProjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Injected persistence: PostgreSQL or the demo-mode memory store.
    pub store: Arc<dyn ProjectStore>,
    /// Pluggable AI backend. Default: LlmAssistant; MockAssistant without an API key.
    pub assistant: Arc<dyn ContentAssistant>,
    pub config: Config,
}
