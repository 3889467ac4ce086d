//! Telegram HTML for every screen of the form. Nothing here mutates state.

use teloxide::utils::html::{bold, escape, italic};

use super::{catalog::PLACEHOLDER_LABEL, AnswerRecord, Field, SubmissionState};

pub const TITLE: &str = "Cause Of Death Prediction";
pub const SUBMIT_LABEL: &str = "Submit";
pub const PROCESSING_LABEL: &str = "Processing...";
pub const ERROR_MARK: &str = "⚠️";

pub fn submit_label(state: &SubmissionState) -> &'static str {
    if state.is_loading() {
        PROCESSING_LABEL
    } else {
        SUBMIT_LABEL
    }
}

/// Error banner or result block; `None` while idle or waiting.
pub fn outcome(state: &SubmissionState) -> Option<String> {
    match state {
        SubmissionState::Idle | SubmissionState::Loading => None,
        SubmissionState::Failed(message) => Some(format!("{} {}", ERROR_MARK, escape(message))),
        SubmissionState::Success(result) => {
            let mut text = format!(
                "{}\n\n{}\n{}",
                bold("Analysis Result"),
                bold(&escape(&result.conclusion)),
                escape(&result.explanation)
            );
            if let Some(probability) = result.probability {
                text.push_str(&format!("\n\n{}", italic(&format!("Probability: {:.1}%", probability * 100.0))));
            }
            Some(text)
        }
    }
}

/// Display text of a stored answer, the placeholder label when unanswered.
pub fn answer_label(answers: &AnswerRecord, field: Field) -> String {
    let value = answers.get(field);
    match field.catalog() {
        Some(catalog) => catalog.label_for(value).unwrap_or(value).to_string(),
        None if value.is_empty() => PLACEHOLDER_LABEL.to_string(),
        None => value.to_string(),
    }
}

pub fn question(answers: &AnswerRecord, field: Field) -> String {
    let position = Field::ALL.iter().position(|f| *f == field).unwrap_or(0) + 1;
    let mut text = format!("{}/{} {}", position, Field::ALL.len(), bold(&escape(field.label())));

    match field {
        Field::Age => text.push_str("\nEnter a whole number from 0 to 120."),
        _ => text.push_str("\nPick one of the options below."),
    }
    if !answers.get(field).is_empty() {
        text.push_str(&format!("\nCurrent answer: {}", escape(&answer_label(answers, field))));
    }
    text
}

/// Labels of the buttons offered for `field`; empty for free input.
pub fn question_options(field: Field) -> Vec<&'static str> {
    field
        .catalog()
        .map(|catalog| catalog.selectable().map(|o| o.label).collect())
        .unwrap_or_default()
}

pub fn summary(answers: &AnswerRecord) -> String {
    let lines = Field::ALL
        .iter()
        .map(|field| format!("{} {}", escape(field.label()), bold(&escape(&answer_label(answers, *field)))))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\n{}\n\nPress {} to get a prediction or pick a question to change it.", bold(TITLE), lines, SUBMIT_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::form::record::tests::complete_record;
    use crate::form::PredictionResult;

    #[test]
    fn nothing_to_show_while_idle_or_loading() {
        assert_eq!(outcome(&SubmissionState::Idle), None);
        assert_eq!(outcome(&SubmissionState::Loading), None);
    }

    #[test]
    fn failure_renders_an_escaped_banner() {
        let shown = outcome(&SubmissionState::Failed("age < 0".into())).unwrap();
        assert_eq!(shown, format!("{} age &lt; 0", ERROR_MARK));
    }

    #[test]
    fn success_emphasises_the_conclusion() {
        let state = SubmissionState::Success(PredictionResult {
            conclusion: "Heart Disease was the likely cause of death".into(),
            explanation: "The analysis indicates with 91.0% probability...".into(),
            probability: Some(0.91),
        });
        let shown = outcome(&state).unwrap();

        assert!(shown.starts_with("<b>Analysis Result</b>"));
        assert!(shown.contains("<b>Heart Disease was the likely cause of death</b>\nThe analysis indicates"));
        assert!(shown.contains("Probability: 91.0%"));
    }

    #[test]
    fn summary_shows_labels_and_placeholders() {
        let mut answers = AnswerRecord::new();
        answers.update_field(Field::ChestPainDuration, ">24 hr");
        let shown = summary(&answers);

        assert!(shown.contains("Chest pain duration <b>More than 24 hours</b>"));
        assert!(shown.contains(&format!("Age <b>{}</b>", PLACEHOLDER_LABEL)));
    }

    #[test]
    fn question_mentions_current_answer() {
        let answers = complete_record();
        let shown = question(&answers, Field::PainLocation);
        assert!(shown.starts_with("18/20 <b>Where was the pain located?</b>"));
        assert!(shown.contains("Current answer: Upper/middle chest"));
        assert!(!question(&AnswerRecord::new(), Field::Age).contains("Current answer"));
    }

    #[test]
    fn options_skip_the_placeholder() {
        assert_eq!(question_options(Field::BreathingOnOff), vec!["Continuous", "On and Off", "Don't Know"]);
        assert!(question_options(Field::Age).is_empty());
    }

    #[test]
    fn rendering_leaves_the_record_alone() {
        let answers = complete_record();
        let before = answers.clone();
        let _ = summary(&answers);
        let _ = question(&answers, Field::Age);
        assert_eq!(answers, before);
    }
}
