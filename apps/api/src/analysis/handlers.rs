//! Axum route handlers for the skin analysis flow.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::address::ClientAddress;
use crate::access::gate::AccessDecision;
use crate::access::region::screen_country;
use crate::analysis::models::{AnalysisRequest, AnalysisResponse};
use crate::analysis::pipeline::{run_analysis, AnalysisDeps};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analysis
///
/// Order: validate → country screen → one-per-30-days claim → pipeline.
/// The claim is committed only once the letter has been delivered; a failed
/// or abandoned request releases it so the visitor can retry.
pub async fn handle_submit_analysis(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(request) = payload?;
    let request = request.validate()?;

    let country = screen_country(state.geo.as_ref(), &address, &state.config.allowed_countries)
        .await
        .map_err(AppError::Denied)?;

    let claim = state.submissions.claim(&request.email).map_err(|wait| {
        warn!(%address, "Repeat analysis submission inside cooldown");
        AppError::Denied(AccessDecision::rate_limited(wait.as_millis() as u64))
    })?;

    let deps = AnalysisDeps {
        llm: state.llm.as_ref(),
        previews: state.previews.as_deref(),
        mailer: state.mailer.as_ref(),
        clinic_inbox: &state.config.clinic_inbox,
    };

    let outcome = run_analysis(&deps, &request).await?;
    claim.commit();

    let analysis_id = Uuid::new_v4();
    info!(
        %analysis_id,
        %country,
        previews = outcome.preview_urls.len(),
        "Skin analysis delivered"
    );

    Ok(Json(AnalysisResponse {
        analysis_id,
        letter: outcome.letter,
        observations: outcome.observations,
        preview_urls: outcome.preview_urls,
        emailed: true,
        completed_at: Utc::now(),
    }))
}
