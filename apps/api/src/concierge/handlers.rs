//! Axum route handlers for the esthetics concierge flow.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

use crate::access::address::ClientAddress;
use crate::access::gate::GateRequest;
use crate::concierge::models::{
    ConciergeSubmitRequest, ConciergeSubmitResponse, SessionStartRequest, SessionStartResponse,
};
use crate::concierge::protocol::build_protocol;
use crate::concierge::questions::{validate_answers, QUESTIONS};
use crate::concierge::sessions::RedeemError;
use crate::errors::AppError;
use crate::mailer::templates::protocol_email;
use crate::mailer::OutgoingEmail;
use crate::state::AppState;

/// POST /api/v1/concierge/session
///
/// Geofenced (service-area radius) and rate-limited (per email + address).
/// Returns a single-use session id and the question set.
pub async fn handle_start_session(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    payload: Result<Json<SessionStartRequest>, JsonRejection>,
) -> Result<Json<SessionStartResponse>, AppError> {
    let Json(request) = payload?;
    let client = request.validate()?;

    let decision = state
        .concierge_gate
        .evaluate(&GateRequest::with_email(&address, &client.email))
        .await;
    if !decision.allowed {
        return Err(AppError::Denied(decision));
    }

    let session_id = state.sessions.issue(&client.email);
    info!(%session_id, %address, "Concierge session started");

    Ok(Json(SessionStartResponse {
        session_id,
        decision,
        questions: QUESTIONS,
    }))
}

/// POST /api/v1/concierge/submit
///
/// Validates answers against the fixed question set, builds the protocol
/// summary and emails it to the client and the provider. The session stays
/// usable until both emails are accepted.
pub async fn handle_submit(
    State(state): State<AppState>,
    payload: Result<Json<ConciergeSubmitRequest>, JsonRejection>,
) -> Result<Json<ConciergeSubmitResponse>, AppError> {
    let Json(request) = payload?;
    let client = request.identity()?;
    let answers = validate_answers(request.answers)?;

    let redemption = state
        .sessions
        .redeem(request.session_id, &client.email)
        .map_err(|e| {
            warn!(session_id = %request.session_id, "Concierge submit rejected: {e:?}");
            AppError::InvalidInput(
                match e {
                    RedeemError::Unknown => "session_id is unknown or already used",
                    RedeemError::Expired => "session has expired, please start again",
                    RedeemError::EmailMismatch => "email does not match the session",
                }
                .to_string(),
            )
        })?;

    let protocol = build_protocol(&answers);

    let to_client = OutgoingEmail {
        to: vec![client.email.clone()],
        subject: format!("{}, your concierge protocol", client.first_name),
        html: protocol_email(&client.first_name, &protocol, None),
        reply_to: Some(state.config.provider_inbox.clone()),
    };
    let to_provider = OutgoingEmail {
        to: vec![state.config.provider_inbox.clone()],
        subject: format!("Concierge protocol: {} <{}>", client.first_name, client.email),
        html: protocol_email(&client.first_name, &protocol, Some(&answers)),
        reply_to: Some(client.email.clone()),
    };
    tokio::try_join!(state.mailer.send(&to_client), state.mailer.send(&to_provider))?;
    redemption.commit();

    info!(session_id = %request.session_id, focus = %protocol.focus, "Concierge protocol sent");

    Ok(Json(ConciergeSubmitResponse {
        protocol,
        emailed: true,
    }))
}
