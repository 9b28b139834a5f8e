/// Aging preview prompt. Replace: {horizon}, {skin_type}, {tone}, {texture}, {care}
pub const AGING_PREVIEW_TEMPLATE: &str = "Soft-lit editorial skincare portrait of an adult \
    with {skin_type} skin, {tone} complexion and {texture} texture, shown {horizon}. \
    {care} Natural, respectful, non-clinical, no text, no logos.";

/// (horizon, care) pairs; one preview is generated per pair.
pub const PREVIEW_HORIZONS: &[(&str, &str)] = &[
    (
        "ten years from now without a consistent routine",
        "Show realistic, gentle signs of time and sun.",
    ),
    (
        "twenty years from now after consistent professional care",
        "Show healthy, well-cared-for skin with graceful aging.",
    ),
];
