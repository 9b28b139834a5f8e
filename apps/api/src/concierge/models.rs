use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::gate::AccessDecision;
use crate::concierge::protocol::ProtocolSummary;
use crate::concierge::questions::{AnswerValue, Question};
use crate::errors::AppError;
use crate::validation::{normalize_email, require_text};

/// Identity fields shared by both concierge requests, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub email: String,
    pub first_name: String,
}

fn identity(email: &str, first_name: &str) -> Result<ClientIdentity, AppError> {
    Ok(ClientIdentity {
        email: normalize_email(email)?,
        first_name: require_text("first_name", first_name, 60)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct SessionStartRequest {
    pub email: String,
    pub first_name: String,
}

impl SessionStartRequest {
    pub fn validate(&self) -> Result<ClientIdentity, AppError> {
        identity(&self.email, &self.first_name)
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStartResponse {
    pub session_id: Uuid,
    pub decision: AccessDecision,
    pub questions: &'static [Question],
}

#[derive(Debug, Deserialize)]
pub struct ConciergeSubmitRequest {
    pub session_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub answers: BTreeMap<String, AnswerValue>,
}

impl ConciergeSubmitRequest {
    pub fn identity(&self) -> Result<ClientIdentity, AppError> {
        identity(&self.email, &self.first_name)
    }
}

#[derive(Debug, Serialize)]
pub struct ConciergeSubmitResponse {
    pub protocol: ProtocolSummary,
    pub emailed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_validates_identity() {
        let req = SessionStartRequest {
            email: "Ana@Example.com".to_string(),
            first_name: " Ana ".to_string(),
        };
        assert_eq!(
            req.validate().unwrap(),
            ClientIdentity {
                email: "ana@example.com".to_string(),
                first_name: "Ana".to_string(),
            }
        );
    }

    #[test]
    fn test_submit_request_rejects_bad_session_id() {
        let result: Result<ConciergeSubmitRequest, _> = serde_json::from_value(serde_json::json!({
            "session_id": "not-a-uuid",
            "email": "a@b.com",
            "first_name": "Ana",
            "answers": {}
        }));
        assert!(result.is_err());
    }
}
