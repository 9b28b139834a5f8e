use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::ImageInput;
use crate::validation::{normalize_email, require_text};

/// Decoded size cap for the uploaded selfie.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Request body cap for the analysis route: a base64 image at the decoded cap
/// plus room for the rest of the JSON.
pub const MAX_ANALYSIS_BODY_BYTES: usize = MAX_IMAGE_BYTES.div_ceil(3) * 4 + 1024 * 1024;
pub const MAX_CONCERNS: usize = 8;
const ALLOWED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "under_25")]
    Under25,
    #[serde(rename = "25_34")]
    From25To34,
    #[serde(rename = "35_44")]
    From35To44,
    #[serde(rename = "45_54")]
    From45To54,
    #[serde(rename = "55_plus")]
    Over55,
}

impl AgeRange {
    pub fn label(&self) -> &'static str {
        match self {
            AgeRange::Under25 => "under 25",
            AgeRange::From25To34 => "25–34",
            AgeRange::From35To44 => "35–44",
            AgeRange::From45To54 => "45–54",
            AgeRange::Over55 => "55+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Normal,
    Sensitive,
}

impl SkinType {
    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
            SkinType::Normal => "normal",
            SkinType::Sensitive => "sensitive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunExposure {
    Minimal,
    Moderate,
    Frequent,
}

impl SunExposure {
    pub fn label(&self) -> &'static str {
        match self {
            SunExposure::Minimal => "minimal",
            SunExposure::Moderate => "moderate",
            SunExposure::Frequent => "frequent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub age_range: AgeRange,
    pub skin_type: SkinType,
    pub concerns: Vec<String>,
    pub sun_exposure: SunExposure,
    #[serde(default)]
    pub routine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub email: String,
    pub first_name: String,
    /// Raw base64 or a `data:image/...;base64,` URL.
    pub image_base64: String,
    pub image_media_type: String,
    pub questionnaire: Questionnaire,
    #[serde(default)]
    pub include_aging_preview: bool,
}

/// An `AnalysisRequest` that passed boundary validation.
#[derive(Debug, Clone)]
pub struct ValidatedAnalysis {
    pub email: String,
    pub first_name: String,
    pub image: ImageInput,
    pub questionnaire: Questionnaire,
    pub include_aging_preview: bool,
}

impl AnalysisRequest {
    pub fn validate(self) -> Result<ValidatedAnalysis, AppError> {
        let email = normalize_email(&self.email)?;
        let first_name = require_text("first_name", &self.first_name, 60)?;
        let image = validate_image(&self.image_base64, &self.image_media_type)?;
        let questionnaire = validate_questionnaire(self.questionnaire)?;

        Ok(ValidatedAnalysis {
            email,
            first_name,
            image,
            questionnaire,
            include_aging_preview: self.include_aging_preview,
        })
    }
}

fn validate_image(raw: &str, media_type: &str) -> Result<ImageInput, AppError> {
    let media_type = media_type.trim().to_lowercase();
    if !ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "image_media_type must be one of {}",
            ALLOWED_MEDIA_TYPES.join(", ")
        )));
    }

    let data = raw.trim();
    let data = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    if data.is_empty() {
        return Err(AppError::InvalidInput("image_base64 is required".to_string()));
    }

    let decoded = STANDARD
        .decode(data)
        .map_err(|_| AppError::InvalidInput("image_base64 is not valid base64".to_string()))?;
    if decoded.is_empty() {
        return Err(AppError::InvalidInput("image_base64 is empty".to_string()));
    }
    if decoded.len() > MAX_IMAGE_BYTES {
        return Err(AppError::InvalidInput(format!(
            "image must be at most {} MiB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(ImageInput {
        media_type,
        data_base64: data.to_string(),
    })
}

fn validate_questionnaire(mut q: Questionnaire) -> Result<Questionnaire, AppError> {
    if q.concerns.is_empty() {
        return Err(AppError::InvalidInput(
            "questionnaire.concerns needs at least one entry".to_string(),
        ));
    }
    if q.concerns.len() > MAX_CONCERNS {
        return Err(AppError::InvalidInput(format!(
            "questionnaire.concerns allows at most {MAX_CONCERNS} entries"
        )));
    }
    q.concerns = q
        .concerns
        .iter()
        .map(|c| require_text("questionnaire.concerns[]", c, 80))
        .collect::<Result<_, _>>()?;
    q.routine = match q.routine.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(r) => Some(require_text("questionnaire.routine", r, 500)?),
    };
    Ok(q)
}

/// Cosmetic description returned by the vision model. Never diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinObservations {
    pub overall_tone: String,
    pub texture: String,
    pub hydration_cues: String,
    #[serde(default)]
    pub visible_concerns: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub letter: String,
    pub observations: SkinObservations,
    pub preview_urls: Vec<String>,
    pub emailed: bool,
    pub completed_at: DateTime<Utc>,
}
