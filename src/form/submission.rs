use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{client::PredictionClient, client::PredictionError, Field, HealthForm, PredictionRequest, RecordError};

/// What the prediction service concluded. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub conclusion: String,
    pub explanation: String,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success(PredictionResult),
    Failed(String),
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// Why pressing submit did not start a request.
#[derive(Debug, Error, PartialEq)]
pub enum SubmitRejected {
    #[error("a prediction is already in progress")]
    InFlight,
    #[error("please answer: {}", .0.label())]
    Incomplete(Field),
    #[error("{0}")]
    Invalid(RecordError),
}

impl HealthForm {
    /// Enters `Loading` and returns the body to send, built from the answers
    /// as they are now. Later edits do not reach this request.
    pub fn start_submission(&mut self) -> Result<PredictionRequest, SubmitRejected> {
        if self.submission.is_loading() {
            return Err(SubmitRejected::InFlight);
        }

        let request = self.answers.to_request().map_err(|e| match e {
            RecordError::Missing(field) => SubmitRejected::Incomplete(field),
            other => SubmitRejected::Invalid(other),
        })?;

        self.submission = SubmissionState::Loading;
        Ok(request)
    }

    /// Leaves `Loading` with the outcome of the request. Returns `false` and
    /// changes nothing if this form was not waiting for one.
    pub fn finish_submission(&mut self, outcome: Result<PredictionResult, PredictionError>) -> bool {
        if !self.submission.is_loading() {
            return false;
        }

        self.submission = match outcome {
            Ok(result) => {
                info!("Prediction received: {}", result.conclusion);
                SubmissionState::Success(result)
            }
            Err(e) => SubmissionState::Failed(e.user_message()),
        };
        true
    }

    /// Runs one full submission against `client`.
    pub async fn submit(&mut self, client: &PredictionClient) -> Result<&SubmissionState, SubmitRejected> {
        let request = self.start_submission()?;
        let outcome = client.predict(&request).await;
        self.finish_submission(outcome);
        Ok(&self.submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::Url;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::form::client::FALLBACK_MESSAGE;
    use crate::form::record::tests::complete_record;
    use crate::form::render;

    fn filled_form() -> HealthForm {
        HealthForm {
            answers: complete_record(),
            submission: SubmissionState::Idle,
        }
    }

    async fn mock_predict(status: u16, body: Option<serde_json::Value>) -> (MockServer, PredictionClient) {
        let server = MockServer::start().await;
        let mut response = ResponseTemplate::new(status);
        if let Some(body) = body {
            response = response.set_body_json(body);
        }
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(response)
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/predict", server.uri())).unwrap();
        (server, PredictionClient::new(url))
    }

    #[tokio::test]
    async fn successful_prediction_is_rendered() {
        let (_server, client) = mock_predict(
            200,
            Some(json!({"conclusion": "Cardiac event", "explanation": "Pattern consistent with..."})),
        )
        .await;
        let mut form = filled_form();

        form.submit(&client).await.unwrap();

        assert_eq!(form.submission.error(), None);
        assert_eq!(form.submission.result().map(|r| r.conclusion.as_str()), Some("Cardiac event"));
        let shown = render::outcome(&form.submission).unwrap();
        assert!(shown.contains("<b>Cardiac event</b>"));
        assert!(shown.contains("Pattern consistent with..."));
        assert!(!shown.contains(render::ERROR_MARK));
    }

    #[tokio::test]
    async fn server_detail_becomes_the_error() {
        let (_server, client) = mock_predict(422, Some(json!({"detail": "age must be non-negative"}))).await;
        let mut form = filled_form();

        form.submit(&client).await.unwrap();

        assert_eq!(form.submission.error(), Some("age must be non-negative"));
    }

    #[tokio::test]
    async fn bare_status_error_mentions_the_code() {
        let (_server, client) = mock_predict(500, None).await;
        let mut form = filled_form();

        form.submit(&client).await.unwrap();

        assert!(form.submission.error().unwrap().contains("500"));
        assert!(!form.submission.is_loading());
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_with_a_message() {
        let url = {
            let server = MockServer::start().await;
            Url::parse(&format!("{}/predict", server.uri())).unwrap()
        };
        let client = PredictionClient::new(url);
        let mut form = filled_form();

        form.submit(&client).await.unwrap();

        let message = form.submission.error().unwrap();
        assert!(!message.is_empty());
        assert!(!form.submission.is_loading());
    }

    #[test]
    fn error_without_message_uses_the_fallback() {
        let mut form = filled_form();
        form.start_submission().unwrap();
        form.finish_submission(Err(PredictionError::Rejected {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: String::new(),
        }));
        assert_eq!(form.submission.error(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn second_submit_while_loading_is_inert() {
        let mut form = filled_form();

        form.start_submission().unwrap();
        assert_eq!(render::submit_label(&form.submission), render::PROCESSING_LABEL);
        assert_eq!(form.start_submission(), Err(SubmitRejected::InFlight));
        assert!(form.submission.is_loading());

        let result = PredictionResult {
            conclusion: "c".into(),
            explanation: "e".into(),
            probability: None,
        };
        assert!(form.finish_submission(Ok(result.clone())));
        assert_eq!(form.submission, SubmissionState::Success(result));
        assert_eq!(render::submit_label(&form.submission), render::SUBMIT_LABEL);
        assert!(form.start_submission().is_ok());
    }

    #[test]
    fn late_outcome_for_a_reset_form_is_dropped() {
        let mut form = filled_form();
        assert!(!form.finish_submission(Err(PredictionError::Rejected {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        })));
        assert_eq!(form.submission, SubmissionState::Idle);
    }

    #[test]
    fn new_attempt_clears_the_previous_error() {
        let mut form = filled_form();
        form.submission = SubmissionState::Failed("old".into());
        form.start_submission().unwrap();
        assert_eq!(form.submission.error(), None);
    }

    #[test]
    fn edits_during_loading_stay_out_of_the_request() {
        let mut form = filled_form();
        let sent = form.start_submission().unwrap();

        form.answers.update_field(Field::HadDiabetes, "No");

        assert_eq!(sent.answers[&Field::HadDiabetes], "Yes");
        assert_eq!(form.answers.get(Field::HadDiabetes), "No");
        assert!(form.submission.is_loading());
    }

    #[test]
    fn incomplete_form_does_not_start() {
        let mut form = HealthForm::new();
        assert_eq!(form.start_submission(), Err(SubmitRejected::Incomplete(Field::Age)));
        assert_eq!(form.submission, SubmissionState::Idle);
    }

    #[tokio::test]
    async fn two_submissions_send_two_identical_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"conclusion": "c", "explanation": "e"})))
            .expect(2)
            .mount(&server)
            .await;
        let client = PredictionClient::new(Url::parse(&format!("{}/predict", server.uri())).unwrap());
        let mut form = filled_form();

        form.submit(&client).await.unwrap();
        form.submit(&client).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].body, received[1].body);
    }
}
