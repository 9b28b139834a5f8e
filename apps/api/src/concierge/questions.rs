//! Fixed concierge question set and answer validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice { options: &'static [&'static str] },
    MultiChoice { options: &'static [&'static str] },
    FreeText { max_chars: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub kind: QuestionKind,
    pub required: bool,
}

pub const PRIMARY_GOAL: &str = "primary_goal";
pub const TREATMENT_HISTORY: &str = "treatment_history";
pub const DOWNTIME_TOLERANCE: &str = "downtime_tolerance";
pub const BUDGET: &str = "budget";
pub const TIMELINE: &str = "timeline";
pub const SENSITIVITIES: &str = "sensitivities";

/// Marker option in `treatment_history` that cannot be combined with others.
pub const NO_PRIOR_TREATMENT: &str = "none";

pub const QUESTIONS: &[Question] = &[
    Question {
        id: PRIMARY_GOAL,
        prompt: "What would you most like to improve?",
        kind: QuestionKind::SingleChoice {
            options: &["smoother_texture", "even_tone", "firmness", "hydration", "clearer_skin"],
        },
        required: true,
    },
    Question {
        id: TREATMENT_HISTORY,
        prompt: "Which treatments have you had before?",
        kind: QuestionKind::MultiChoice {
            options: &[
                NO_PRIOR_TREATMENT,
                "chemical_peel",
                "microneedling",
                "laser",
                "injectables",
                "facials",
            ],
        },
        required: true,
    },
    Question {
        id: DOWNTIME_TOLERANCE,
        prompt: "How much visible recovery time can you accept?",
        kind: QuestionKind::SingleChoice {
            options: &["none", "few_days", "week_plus"],
        },
        required: true,
    },
    Question {
        id: BUDGET,
        prompt: "What budget do you have in mind for a first protocol?",
        kind: QuestionKind::SingleChoice {
            options: &["under_500", "500_1500", "over_1500"],
        },
        required: true,
    },
    Question {
        id: TIMELINE,
        prompt: "When would you like to see results?",
        kind: QuestionKind::SingleChoice {
            options: &["asap", "one_to_three_months", "flexible"],
        },
        required: false,
    },
    Question {
        id: SENSITIVITIES,
        prompt: "Anything your provider should know (allergies, sensitivities, medications)?",
        kind: QuestionKind::FreeText { max_chars: 500 },
        required: false,
    },
];

/// A single answer as sent by the client: one value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    fn into_values(self) -> Vec<String> {
        match self {
            AnswerValue::One(v) => vec![v],
            AnswerValue::Many(vs) => vs,
        }
    }
}

/// Validated answers keyed by question id. Every value is trimmed and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSheet(BTreeMap<String, Vec<String>>);

impl AnswerSheet {
    pub fn values(&self, id: &str) -> &[String] {
        self.0.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, id: &str) -> Option<&str> {
        self.values(id).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

pub fn validate_answers(raw: BTreeMap<String, AnswerValue>) -> Result<AnswerSheet, AppError> {
    if let Some(unknown) = raw.keys().find(|k| !QUESTIONS.iter().any(|q| q.id == k.as_str())) {
        return Err(AppError::InvalidInput(format!("unknown question '{unknown}'")));
    }

    let mut raw = raw;
    let mut sheet = BTreeMap::new();

    for question in QUESTIONS {
        let values: Vec<String> = raw
            .remove(question.id)
            .map(AnswerValue::into_values)
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        if values.is_empty() {
            if question.required {
                return Err(AppError::InvalidInput(format!(
                    "'{}' is required",
                    question.id
                )));
            }
            continue;
        }

        let values = check_values(question, values)?;
        sheet.insert(question.id.to_string(), values);
    }

    Ok(AnswerSheet(sheet))
}

fn check_values(question: &Question, values: Vec<String>) -> Result<Vec<String>, AppError> {
    let invalid = |msg: String| AppError::InvalidInput(format!("'{}' {msg}", question.id));

    match question.kind {
        QuestionKind::SingleChoice { options } => {
            if values.len() != 1 {
                return Err(invalid("takes exactly one answer".to_string()));
            }
            if !options.contains(&values[0].as_str()) {
                return Err(invalid(format!("must be one of {}", options.join(", "))));
            }
            Ok(values)
        }
        QuestionKind::MultiChoice { options } => {
            let mut picked: Vec<String> = Vec::with_capacity(values.len());
            for value in values {
                if !options.contains(&value.as_str()) {
                    return Err(invalid(format!("has unknown option '{value}'")));
                }
                if !picked.contains(&value) {
                    picked.push(value);
                }
            }
            if picked.len() > 1 && picked.iter().any(|v| v == NO_PRIOR_TREATMENT) {
                return Err(invalid(format!(
                    "cannot combine '{NO_PRIOR_TREATMENT}' with other options"
                )));
            }
            Ok(picked)
        }
        QuestionKind::FreeText { max_chars } => {
            if values.len() != 1 {
                return Err(invalid("takes a single text answer".to_string()));
            }
            if values[0].chars().count() > max_chars {
                return Err(invalid(format!("must be at most {max_chars} characters")));
            }
            Ok(values)
        }
    }
}
