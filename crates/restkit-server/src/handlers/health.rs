use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Backend del cache compartido
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "UP",
            version: crate::version(),
            store: None,
        }
    }
}

/// GET /health sin estado (router minimo).
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// GET /health
pub async fn health_with_state(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        store: Some(state.store().name().to_string()),
        ..HealthResponse::default()
    })
}
