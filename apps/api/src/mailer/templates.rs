//! Plain HTML email bodies. Every interpolated value passes through `escape_html`.

use crate::analysis::models::{Questionnaire, SkinObservations};
use crate::concierge::protocol::ProtocolSummary;
use crate::concierge::questions::AnswerSheet;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><body style=\"font-family:Georgia,serif;max-width:640px;margin:auto\">\
         <h1>{}</h1>{}</body></html>",
        escape_html(title),
        body
    )
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect()
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let items: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    format!("<ul>{items}</ul>")
}

pub fn letter_email(first_name: &str, letter: &str, preview_urls: &[String]) -> String {
    let mut body = paragraphs(letter);
    for url in preview_urls {
        body.push_str(&format!(
            "<p><img src=\"{}\" alt=\"Aging preview\" width=\"480\"></p>",
            escape_html(url)
        ));
    }
    wrap(&format!("A letter for {first_name}"), &body)
}

pub fn clinic_analysis_email(
    first_name: &str,
    email: &str,
    questionnaire: &Questionnaire,
    observations: &SkinObservations,
    letter: &str,
) -> String {
    let mut body = format!(
        "<p><strong>Lead:</strong> {} &lt;{}&gt;</p>\
         <p><strong>Age range:</strong> {} · <strong>Skin type:</strong> {} · \
         <strong>Sun exposure:</strong> {}</p>",
        escape_html(first_name),
        escape_html(email),
        escape_html(questionnaire.age_range.label()),
        escape_html(questionnaire.skin_type.label()),
        escape_html(questionnaire.sun_exposure.label()),
    );
    body.push_str("<h2>Stated concerns</h2>");
    body.push_str(&list(&questionnaire.concerns));
    body.push_str("<h2>Visible observations</h2>");
    body.push_str(&format!(
        "<p>Tone: {}<br>Texture: {}<br>Hydration: {}</p>",
        escape_html(&observations.overall_tone),
        escape_html(&observations.texture),
        escape_html(&observations.hydration_cues),
    ));
    body.push_str(&list(&observations.visible_concerns));
    body.push_str("<h2>Letter sent</h2>");
    body.push_str(&paragraphs(letter));
    wrap("New skin analysis submission", &body)
}

pub fn protocol_email(
    first_name: &str,
    summary: &ProtocolSummary,
    answers: Option<&AnswerSheet>,
) -> String {
    let mut body = format!(
        "<p>{}, here is the protocol outline prepared from your answers.</p>\
         <p><strong>Focus:</strong> {}</p>",
        escape_html(first_name),
        escape_html(&summary.focus),
    );
    body.push_str("<h2>Recommended treatments</h2>");
    body.push_str(&list(&summary.treatments));
    body.push_str(&format!(
        "<p><strong>Cadence:</strong> {}</p>",
        escape_html(&summary.cadence)
    ));
    body.push_str(&list(&summary.notes));

    if let Some(answers) = answers {
        body.push_str("<h2>Client answers</h2>");
        let lines: Vec<String> = answers
            .iter()
            .map(|(id, value)| format!("{id}: {}", value.join(", ")))
            .collect();
        body.push_str(&list(&lines));
    }
    wrap("Esthetics concierge protocol", &body)
}
