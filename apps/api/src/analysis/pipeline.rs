//! Skin analysis pipeline: vision → letter → previews → delivery.

use tracing::{info, warn};

use crate::analysis::models::{Questionnaire, SkinObservations, ValidatedAnalysis};
use crate::analysis::prompts::{
    LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM, VISION_PROMPT_TEMPLATE, VISION_SYSTEM,
};
use crate::errors::AppError;
use crate::imagegen::prompts::{AGING_PREVIEW_TEMPLATE, PREVIEW_HORIZONS};
use crate::imagegen::PreviewGenerator;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NON_DIAGNOSTIC_INSTRUCTION};
use crate::llm_client::{parse_json_reply, LanguageModel};
use crate::mailer::templates::{clinic_analysis_email, letter_email};
use crate::mailer::{Mailer, OutgoingEmail};

/// Collaborators borrowed from `AppState` for one run.
pub struct AnalysisDeps<'a> {
    pub llm: &'a dyn LanguageModel,
    pub previews: Option<&'a dyn PreviewGenerator>,
    pub mailer: &'a dyn Mailer,
    pub clinic_inbox: &'a str,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub observations: SkinObservations,
    pub letter: String,
    pub preview_urls: Vec<String>,
}

pub async fn run_analysis(
    deps: &AnalysisDeps<'_>,
    request: &ValidatedAnalysis,
) -> Result<AnalysisOutcome, AppError> {
    let observations = describe_skin(deps.llm, request).await?;
    let letter = write_letter(deps.llm, &request.first_name, &request.questionnaire, &observations)
        .await?;

    let preview_urls = match (request.include_aging_preview, deps.previews) {
        (true, Some(generator)) => {
            generate_previews(generator, &request.questionnaire, &observations).await
        }
        (true, None) => {
            warn!("Aging preview requested but image generation is not configured");
            Vec::new()
        }
        (false, _) => Vec::new(),
    };

    let outcome = AnalysisOutcome {
        observations,
        letter,
        preview_urls,
    };
    deliver(deps, request, &outcome).await?;
    Ok(outcome)
}

pub fn build_vision_prompt(q: &Questionnaire) -> String {
    VISION_PROMPT_TEMPLATE
        .replace("{skin_type}", q.skin_type.label())
        .replace("{age_range}", q.age_range.label())
        .replace("{concerns}", &q.concerns.join(", "))
        .replace("{sun_exposure}", q.sun_exposure.label())
}

async fn describe_skin(
    llm: &dyn LanguageModel,
    request: &ValidatedAnalysis,
) -> Result<SkinObservations, AppError> {
    let system = format!("{VISION_SYSTEM}\n\n{NON_DIAGNOSTIC_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}");
    let prompt = build_vision_prompt(&request.questionnaire);
    let reply = llm.describe_image(&prompt, &system, &request.image).await?;
    Ok(parse_json_reply(&reply)?)
}

pub fn build_letter_prompt(
    first_name: &str,
    q: &Questionnaire,
    observations: &SkinObservations,
) -> String {
    LETTER_PROMPT_TEMPLATE
        .replace("{first_name}", first_name)
        .replace(
            "{questionnaire_json}",
            &serde_json::to_string_pretty(q).unwrap_or_default(),
        )
        .replace(
            "{observations_json}",
            &serde_json::to_string_pretty(observations).unwrap_or_default(),
        )
}

async fn write_letter(
    llm: &dyn LanguageModel,
    first_name: &str,
    q: &Questionnaire,
    observations: &SkinObservations,
) -> Result<String, AppError> {
    let system = format!("{LETTER_SYSTEM}\n\n{NON_DIAGNOSTIC_INSTRUCTION}");
    let prompt = build_letter_prompt(first_name, q, observations);
    Ok(llm.complete(&prompt, &system).await?)
}

pub fn build_preview_prompts(q: &Questionnaire, observations: &SkinObservations) -> Vec<String> {
    PREVIEW_HORIZONS
        .iter()
        .map(|(horizon, care)| {
            AGING_PREVIEW_TEMPLATE
                .replace("{horizon}", horizon)
                .replace("{skin_type}", q.skin_type.label())
                .replace("{tone}", &observations.overall_tone)
                .replace("{texture}", &observations.texture)
                .replace("{care}", care)
        })
        .collect()
}

/// Best-effort: each failed image is logged and skipped.
async fn generate_previews(
    generator: &dyn PreviewGenerator,
    q: &Questionnaire,
    observations: &SkinObservations,
) -> Vec<String> {
    let mut urls = Vec::new();
    for prompt in build_preview_prompts(q, observations) {
        match generator.generate(&prompt).await {
            Ok(url) => urls.push(url),
            Err(e) => warn!("Aging preview generation failed, skipping: {e}"),
        }
    }
    urls
}

async fn deliver(
    deps: &AnalysisDeps<'_>,
    request: &ValidatedAnalysis,
    outcome: &AnalysisOutcome,
) -> Result<(), AppError> {
    let visitor = OutgoingEmail {
        to: vec![request.email.clone()],
        subject: format!("{}, your personal skin letter", request.first_name),
        html: letter_email(&request.first_name, &outcome.letter, &outcome.preview_urls),
        reply_to: Some(deps.clinic_inbox.to_string()),
    };
    let clinic = OutgoingEmail {
        to: vec![deps.clinic_inbox.to_string()],
        subject: format!("New skin analysis: {}", request.first_name),
        html: clinic_analysis_email(
            &request.first_name,
            &request.email,
            &request.questionnaire,
            &outcome.observations,
            &outcome.letter,
        ),
        reply_to: Some(request.email.clone()),
    };

    tokio::try_join!(deps.mailer.send(&visitor), deps.mailer.send(&clinic))?;
    info!("Delivered skin analysis letter and clinic copy");
    Ok(())
}
