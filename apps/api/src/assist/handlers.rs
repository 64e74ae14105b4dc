use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// Also make a round trip to the backend.
    #[serde(default)]
    pub check: bool,
}

#[derive(Debug, Serialize)]
pub struct AssistStatus {
    pub assistant: &'static str,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/v1/assist/status
///
/// Which assistant is configured, and with `?check=true` whether it answers.
/// A failed check is reported in the body, not as an error status.
pub async fn handle_assist_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<AssistStatus> {
    let assistant = &state.assistant;
    let mut status = AssistStatus {
        assistant: assistant.name(),
        live: assistant.is_live(),
        reachable: None,
        error: None,
    };
    if !query.check {
        return Json(status);
    }

    let outcome = match tokio::time::timeout(CHECK_TIMEOUT, assistant.check_connection()).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!(
            "No answer within {} seconds",
            CHECK_TIMEOUT.as_secs()
        )),
    };
    match outcome {
        Ok(()) => {
            info!("Assistant {} is reachable", status.assistant);
            status.reachable = Some(true);
        }
        Err(message) => {
            warn!("Assistant {} check failed: {message}", status.assistant);
            status.reachable = Some(false);
            status.error = Some(message);
        }
    }
    Json(status)
}
