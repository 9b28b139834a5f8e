// Prompt constants for the skin analysis flow.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the vision pass. Append `JSON_ONLY_SYSTEM` and
/// `NON_DIAGNOSTIC_INSTRUCTION` before sending.
pub const VISION_SYSTEM: &str = "You are a licensed esthetician's assistant reviewing a \
    client-submitted selfie for a complimentary cosmetic consultation.";

/// Vision prompt. Replace: {skin_type}, {age_range}, {concerns}, {sun_exposure}
pub const VISION_PROMPT_TEMPLATE: &str = r#"Describe the visible skin in this photo.

The client reports:
- skin type: {skin_type}
- age range: {age_range}
- concerns: {concerns}
- sun exposure: {sun_exposure}

Return a JSON object with this EXACT schema:
{
  "overall_tone": "short phrase describing visible tone and evenness",
  "texture": "short phrase describing visible texture",
  "hydration_cues": "short phrase describing visible hydration cues",
  "visible_concerns": ["cosmetic attribute visible in the photo"],
  "strengths": ["something genuinely positive about the visible skin"]
}

If the photo is too dark, blurry, or does not show a face, say so in each field
and leave both arrays empty."#;

/// Persona for the narrative letter.
pub const LETTER_SYSTEM: &str = "You are Dr. Celeste, the warm, plain-spoken lead esthetician \
    of a boutique skin studio. You write personal letters to new clients. \
    You never diagnose and never promise results. Write in plain text paragraphs, \
    no markdown, no headings, under 350 words, signed 'Warmly, Celeste'.";

/// Letter prompt. Replace: {first_name}, {questionnaire_json}, {observations_json}
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Write a personal letter to {first_name}.

What they told us:
{questionnaire_json}

What was visible in their photo (cosmetic only):
{observations_json}

Open by acknowledging one strength. Address their stated concerns in the order given,
connecting each to what was visible where possible. Suggest a simple daily routine
direction and invite them to book a complimentary in-studio consultation."#;
