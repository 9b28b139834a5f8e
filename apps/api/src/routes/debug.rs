use axum::{extract::State, Json};

use crate::access::address::ClientAddress;
use crate::access::gate::{AccessDecision, GateRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/debug/rate-limit
///
/// Runs the debug gate (20 per minute per address, no geofence) and echoes
/// the decision. Denials come back as 429 with `Retry-After`.
pub async fn handle_rate_limit_probe(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
) -> Result<Json<AccessDecision>, AppError> {
    let decision = state
        .debug_gate
        .evaluate(&GateRequest::from_address(address))
        .await;
    if !decision.allowed {
        return Err(AppError::Denied(decision));
    }
    Ok(Json(decision))
}
