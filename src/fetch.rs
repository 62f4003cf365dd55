//! HTTP client for the question endpoint.
//!
//! Talks to `POST /api/questions` and applies the bounded retry policy:
//! any transport or malformed-response failure is retried up to
//! [`MAX_RETRIES`] times with a fixed delay, then the last error is
//! returned. Callers observe retry attempts through a callback so the UI
//! can show progress.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{Question, QuizType};

/// Retry attempts after the initial request.
pub const MAX_RETRIES: u32 = 3;
/// Fixed delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Failure modes of a question fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server answered with a non-success status code.
    #[error("server error (HTTP {0})")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A well-formed response carried no questions.
    #[error("no questions received from server")]
    Empty,
}

#[derive(Serialize)]
struct QuestionRequest<'a> {
    quiz_type: &'a str,
    num_questions: usize,
}

#[derive(Deserialize)]
struct QuestionResponse {
    status: String,
    #[serde(default)]
    questions: Vec<Question>,
}

/// Client for the question-fetch endpoint.
pub struct QuestionClient {
    base_url: String,
    retry_delay: Duration,
    client: reqwest::Client,
}

impl QuestionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            retry_delay: RETRY_DELAY,
            client,
        }
    }

    /// Override the delay between retries (tests).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch a question set, retrying on failure.
    ///
    /// `on_retry` is invoked with the attempt number (1-based) before each
    /// retry. After [`MAX_RETRIES`] retries the last error is returned; no
    /// further attempts happen.
    pub async fn fetch_questions<F>(
        &self,
        quiz_type: QuizType,
        count: usize,
        mut on_retry: F,
    ) -> Result<Vec<Question>, FetchError>
    where
        F: FnMut(u32),
    {
        let mut attempt = 0u32;

        loop {
            match self.request_once(quiz_type, count).await {
                Ok(questions) => return Ok(questions),
                Err(err) => {
                    if attempt >= MAX_RETRIES {
                        warn!(%err, "question fetch failed terminally");
                        return Err(err);
                    }
                    attempt += 1;
                    warn!(%err, attempt, "question fetch failed, retrying");
                    on_retry(attempt);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn request_once(
        &self,
        quiz_type: QuizType,
        count: usize,
    ) -> Result<Vec<Question>, FetchError> {
        let response = self
            .client
            .post(format!("{}/api/questions", self.base_url))
            .json(&QuestionRequest {
                quiz_type: quiz_type.as_str(),
                num_questions: count,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: QuestionResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        if payload.status != "success" {
            return Err(FetchError::Malformed(format!(
                "unexpected status \"{}\"",
                payload.status
            )));
        }
        if payload.questions.is_empty() {
            return Err(FetchError::Empty);
        }
        for question in &payload.questions {
            if question.correct_index().is_none() {
                return Err(FetchError::Malformed(format!(
                    "correct answer not among options for \"{}\"",
                    question.question
                )));
            }
        }

        Ok(payload.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn question_json(correct: &str) -> serde_json::Value {
        serde_json::json!({
            "question": "What comes next: 2, 4, 8, ...?",
            "options": ["12", "14", "16", "18"],
            "correct_answer": correct,
            "explanation": "Each term doubles."
        })
    }

    fn fast_client(server: &MockServer) -> QuestionClient {
        QuestionClient::new(server.uri()).with_retry_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn successful_fetch_parses_questions() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .and(body_partial_json(serde_json::json!({
                "quiz_type": "reasoning",
                "num_questions": 12
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "questions": [question_json("16")]
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let questions = client
            .fetch_questions(QuizType::Reasoning, 12, |_| {})
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_index(), Some(2));
    }

    #[tokio::test]
    async fn server_errors_exhaust_exactly_three_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4) // initial request + 3 retries, nothing more
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let mut retries = Vec::new();
        let err = client
            .fetch_questions(QuizType::Mixed, 10, |attempt| retries.push(attempt))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(500)));
        assert_eq!(retries, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn recovers_when_a_retry_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "questions": [question_json("16")]
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let mut retries = Vec::new();
        let questions = client
            .fetch_questions(QuizType::Mixed, 10, |attempt| retries.push(attempt))
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(retries, vec![1, 2]);
    }

    #[tokio::test]
    async fn non_success_payload_is_treated_as_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "quota exhausted"
            })))
            .expect(4)
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let err = client
            .fetch_questions(QuizType::Mixed, 10, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn question_with_unmatched_answer_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "questions": [question_json("42")]
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let err = client
            .fetch_questions(QuizType::Mixed, 10, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_question_list_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "questions": []
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let err = client
            .fetch_questions(QuizType::Mixed, 10, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Empty));
    }
}
