// Skin analysis: selfie + questionnaire → cosmetic observations → persona letter
// → optional aging previews → email to visitor and clinic.
// All model calls go through llm_client / imagegen, never directly.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
