// Shared prompt fragments. Each flow that calls the model keeps its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps every skin-related output cosmetic.
pub const NON_DIAGNOSTIC_INSTRUCTION: &str = "\
    CRITICAL: You are describing visible cosmetic attributes only. \
    Do NOT diagnose, name medical conditions, or suggest medication. \
    Do NOT guess age, ethnicity, or health status. \
    If something cannot be seen clearly, say so instead of inferring.";
