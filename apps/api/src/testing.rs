//! Test doubles for the external collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::access::clock::MockClock;
use crate::access::distance::GeoPoint;
use crate::access::geo::{GeoFailure, GeoResolution, GeoResolver};
use crate::config::Config;
use crate::imagegen::{ImageGenError, PreviewGenerator};
use crate::llm_client::{ImageInput, LanguageModel, LlmError};
use crate::mailer::{MailError, Mailer, OutgoingEmail};
use crate::state::{AppState, Collaborators};

/// 1x1 transparent PNG.
pub const PIXEL_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Geo resolver with a fixed, switchable outcome. Clones share state.
#[derive(Clone)]
pub struct StubGeo {
    outcome: Arc<Mutex<Result<GeoResolution, GeoFailure>>>,
    calls: Arc<AtomicUsize>,
}

impl StubGeo {
    fn with_outcome(outcome: Result<GeoResolution, GeoFailure>) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolves every address to `point` in the US.
    pub fn at(point: GeoPoint) -> Self {
        Self::with_outcome(Ok(GeoResolution {
            point,
            country_code: Some("US".to_string()),
            city: Some("Alpharetta".to_string()),
            region: Some("Georgia".to_string()),
        }))
    }

    /// Simulates a transport/provider error.
    pub fn failing() -> Self {
        Self::with_outcome(Err(GeoFailure::new("provider error")))
    }

    /// Simulates a provider that answered without usable coordinates.
    pub fn null_coordinates() -> Self {
        Self::with_outcome(Err(GeoFailure::new("missing or non-finite coordinates")))
    }

    pub fn with_country(self, code: &str) -> Self {
        if let Ok(r) = self.outcome.lock().unwrap().as_mut() {
            r.country_code = Some(code.to_string());
        }
        self
    }

    pub fn without_country(self) -> Self {
        if let Ok(r) = self.outcome.lock().unwrap().as_mut() {
            r.country_code = None;
        }
        self
    }

    /// Switches to failing from now on.
    pub fn fail(&self) {
        *self.outcome.lock().unwrap() = Err(GeoFailure::new("provider error"));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoResolver for StubGeo {
    async fn resolve(&self, _address: &str) -> Result<GeoResolution, GeoFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }
}

/// Captures every message instead of sending it.
/// Clones share the outbox and the failure switch.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.fail.store(true, Ordering::SeqCst);
        mailer
    }

    /// Accepts messages from now on.
    pub fn recover(&self) {
        self.fail.store(false, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Rejected {
                status: 503,
                message: "provider down".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Returns canned replies: `vision` for image calls, `text` for text calls.
#[derive(Clone)]
pub struct ScriptedModel {
    vision: String,
    text: String,
}

impl ScriptedModel {
    pub fn new(vision: &str, text: &str) -> Self {
        Self {
            vision: vision.to_string(),
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        Ok(self.text.clone())
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _system: &str,
        _image: &ImageInput,
    ) -> Result<String, LlmError> {
        Ok(self.vision.clone())
    }
}

/// Never answers an image call, like a provider that hangs.
pub struct StalledModel;

#[async_trait]
impl LanguageModel for StalledModel {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        std::future::pending().await
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _system: &str,
        _image: &ImageInput,
    ) -> Result<String, LlmError> {
        std::future::pending().await
    }
}

pub struct StubPreviews {
    fail: bool,
    generated: AtomicUsize,
}

impl StubPreviews {
    pub fn working() -> Self {
        Self {
            fail: false,
            generated: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            generated: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PreviewGenerator for StubPreviews {
    async fn generate(&self, _prompt: &str) -> Result<String, ImageGenError> {
        if self.fail {
            return Err(ImageGenError::EmptyResult);
        }
        let n = self.generated.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://previews.test/{n}.png"))
    }
}

pub fn test_config() -> Config {
    Config {
        anthropic_api_key: "test".to_string(),
        openai_api_key: None,
        email_api_key: "test".to_string(),
        email_from: "studio@example.com".to_string(),
        clinic_inbox: "clinic@example.com".to_string(),
        provider_inbox: "provider@example.com".to_string(),
        geo_lookup_url: "http://127.0.0.1:9".to_string(),
        allowed_countries: vec!["US".to_string()],
        concierge_center: GeoPoint::new(34.14352, -84.29926),
        concierge_radius_miles: 20.0,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn test_state(
    geo: StubGeo,
    llm: impl LanguageModel + 'static,
    mailer: RecordingMailer,
) -> (AppState, MockClock) {
    let clock = MockClock::default();
    let state = AppState::new(
        test_config(),
        Collaborators {
            llm: Arc::new(llm),
            previews: None,
            mailer: Arc::new(mailer),
            geo: Arc::new(geo),
        },
        Arc::new(clock.clone()),
    );
    (state, clock)
}
