//! Throttle status endpoint.

use axum::{Json, extract::State};
use restkit_core::ThrottleReport;
use tracing::instrument;

use crate::state::AppState;
use crate::throttle::ClientIdentity;

/// Throttle set reported by `GET /throttle`.
pub const STATUS_VIEW: &str = "throttle";

/// GET /throttle
/// Reporta el uso actual del cliente sin registrar la request.
#[instrument(skip_all, fields(client = %client.ident()))]
pub async fn throttle_status(
    State(state): State<AppState>,
    client: ClientIdentity,
) -> Json<ThrottleReport> {
    let throttles = state.throttles_for(STATUS_VIEW);
    Json(state.inspector().inspect(&client, &throttles).await)
}
