use std::sync::Arc;

use crate::access::clock::Clock;
use crate::access::gate::{AccessGate, GateConfig, Geofence};
use crate::access::geo::GeoResolver;
use crate::access::ledger::{SubmissionLedger, SUBMISSION_COOLDOWN};
use crate::access::window::FixedWindowCounter;
use crate::concierge::sessions::{SessionRegistry, SESSION_TTL};
use crate::config::Config;
use crate::imagegen::PreviewGenerator;
use crate::llm_client::LanguageModel;
use crate::mailer::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn LanguageModel>,
    /// `None` when no image API key is configured.
    pub previews: Option<Arc<dyn PreviewGenerator>>,
    pub mailer: Arc<dyn Mailer>,
    pub geo: Arc<dyn GeoResolver>,
    pub debug_gate: Arc<AccessGate>,
    pub concierge_gate: Arc<AccessGate>,
    pub submissions: Arc<SubmissionLedger>,
    pub sessions: Arc<SessionRegistry>,
}

/// External collaborators; swapped for stubs in tests.
pub struct Collaborators {
    pub llm: Arc<dyn LanguageModel>,
    pub previews: Option<Arc<dyn PreviewGenerator>>,
    pub mailer: Arc<dyn Mailer>,
    pub geo: Arc<dyn GeoResolver>,
}

impl AppState {
    /// Wires the in-memory stores and gates. The bucket table lives exactly as
    /// long as this state; a restart resets every counter.
    pub fn new(config: Config, collaborators: Collaborators, clock: Arc<dyn Clock>) -> Self {
        let Collaborators {
            llm,
            previews,
            mailer,
            geo,
        } = collaborators;

        let counter = Arc::new(FixedWindowCounter::new(Arc::clone(&clock)));
        let service_area = Geofence {
            center: config.concierge_center,
            radius_miles: config.concierge_radius_miles,
        };

        let debug_gate = AccessGate::new(
            GateConfig::debug_probe(),
            Arc::clone(&counter),
            Arc::clone(&geo),
        );
        let concierge_gate = AccessGate::new(
            GateConfig::concierge(service_area),
            Arc::clone(&counter),
            Arc::clone(&geo),
        );

        Self {
            debug_gate: Arc::new(debug_gate),
            concierge_gate: Arc::new(concierge_gate),
            submissions: Arc::new(SubmissionLedger::new(SUBMISSION_COOLDOWN, Arc::clone(&clock))),
            sessions: Arc::new(SessionRegistry::new(SESSION_TTL, clock)),
            config,
            llm,
            previews,
            mailer,
            geo,
        }
    }
}
