//! Deterministic mapping from concierge answers to a protocol outline.
//!
//! The provider finalizes the plan in person; this only shapes the first
//! conversation, so it stays a plain lookup with no model call.

use serde::Serialize;

use crate::concierge::questions::{
    AnswerSheet, BUDGET, DOWNTIME_TOLERANCE, NO_PRIOR_TREATMENT, PRIMARY_GOAL, SENSITIVITIES,
    TIMELINE, TREATMENT_HISTORY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Downtime {
    Minimal,
    Short,
    Extended,
}

impl Downtime {
    fn tolerance(answer: Option<&str>) -> Self {
        match answer {
            Some("week_plus") => Downtime::Extended,
            Some("few_days") => Downtime::Short,
            _ => Downtime::Minimal,
        }
    }
}

struct Treatment {
    name: &'static str,
    downtime: Downtime,
}

static GENTLE_FALLBACK: Treatment = Treatment {
    name: "Customized hydrating facial",
    downtime: Downtime::Minimal,
};

const fn treatment(name: &'static str, downtime: Downtime) -> Treatment {
    Treatment { name, downtime }
}

const TEXTURE_PLAN: &[Treatment] = &[
    treatment("Microneedling series", Downtime::Short),
    treatment("Light glycolic peel", Downtime::Short),
    treatment("Enzyme resurfacing facial", Downtime::Minimal),
];

const TONE_PLAN: &[Treatment] = &[
    treatment("IPL photofacial", Downtime::Short),
    treatment("Brightening chemical peel", Downtime::Extended),
    treatment("Vitamin C infusion facial", Downtime::Minimal),
];

const FIRMNESS_PLAN: &[Treatment] = &[
    treatment("Radiofrequency microneedling", Downtime::Extended),
    treatment("Radiofrequency skin tightening", Downtime::Minimal),
    treatment("Collagen-support facial", Downtime::Minimal),
];

const CLARITY_PLAN: &[Treatment] = &[
    treatment("Salicylic peel", Downtime::Short),
    treatment("Clarifying extraction facial", Downtime::Minimal),
];

const HYDRATION_PLAN: &[Treatment] = &[
    treatment("Hydrating infusion facial", Downtime::Minimal),
    treatment("Barrier-repair home regimen", Downtime::Minimal),
];

fn goal_plan(goal: Option<&str>) -> (&'static str, &'static [Treatment]) {
    match goal {
        Some("smoother_texture") => ("Texture refinement", TEXTURE_PLAN),
        Some("even_tone") => ("Tone correction", TONE_PLAN),
        Some("firmness") => ("Firmness and lift", FIRMNESS_PLAN),
        Some("clearer_skin") => ("Clarity", CLARITY_PLAN),
        _ => ("Barrier and hydration", HYDRATION_PLAN),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolSummary {
    pub focus: String,
    pub treatments: Vec<String>,
    pub cadence: String,
    pub notes: Vec<String>,
}

pub fn build_protocol(answers: &AnswerSheet) -> ProtocolSummary {
    let (focus, candidates) = goal_plan(answers.first(PRIMARY_GOAL));
    let tolerance = Downtime::tolerance(answers.first(DOWNTIME_TOLERANCE));
    let mut notes = Vec::new();

    let mut treatments: Vec<&Treatment> =
        candidates.iter().filter(|t| t.downtime <= tolerance).collect();
    if treatments.len() < candidates.len() {
        notes.push("Gentler options chosen to match your downtime preference.".to_string());
    }
    if treatments.is_empty() {
        treatments.push(&GENTLE_FALLBACK);
    }

    if answers.first(BUDGET) == Some("under_500") && treatments.len() > 1 {
        treatments.truncate(1);
        notes.push("Starting with a single treatment to fit your budget.".to_string());
    }

    let cadence = match answers.first(TIMELINE) {
        Some("asap") => "Every 2 weeks for 6 weeks",
        Some("one_to_three_months") => "Monthly for 3 months",
        _ => "Monthly, adjusted at your consultation",
    };

    let history: Vec<&str> = answers
        .values(TREATMENT_HISTORY)
        .iter()
        .map(String::as_str)
        .filter(|t| *t != NO_PRIOR_TREATMENT)
        .collect();
    if !history.is_empty() {
        notes.push(format!(
            "Prior treatments noted: {}.",
            history.join(", ").replace('_', " ")
        ));
    }

    if let Some(sensitivities) = answers.first(SENSITIVITIES) {
        notes.push(format!("Provider to review before treatment: {sensitivities}"));
    }

    ProtocolSummary {
        focus: focus.to_string(),
        treatments: treatments.iter().map(|t| t.name.to_string()).collect(),
        cadence: cadence.to_string(),
        notes,
    }
}
