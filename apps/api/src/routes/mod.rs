pub mod debug;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::analysis::models::MAX_ANALYSIS_BODY_BYTES;
use crate::concierge::handlers as concierge;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/debug/rate-limit",
            get(debug::handle_rate_limit_probe),
        )
        // Skin analysis
        .route(
            "/api/v1/analysis",
            post(analysis::handle_submit_analysis)
                .layer(DefaultBodyLimit::max(MAX_ANALYSIS_BODY_BYTES)),
        )
        // Esthetics concierge
        .route(
            "/api/v1/concierge/session",
            post(concierge::handle_start_session),
        )
        .route("/api/v1/concierge/submit", post(concierge::handle_submit))
        .with_state(state)
}
