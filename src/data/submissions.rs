//! Code submission and quiz answer client
//!
//! Neither call is cached: each one is an action the backend must see.

use reqwest::Client;
use tracing::debug;

use super::{
    endpoint, send_json, with_bearer, AnswerRequest, AnswerResult, ApiError, Session, SubmitRequest,
    SubmitResponse,
};

/// Client for posting solutions and quiz answers
#[derive(Debug, Clone)]
pub struct SubmissionsClient {
    http_client: Client,
    base_url: String,
}

impl SubmissionsClient {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Submits code for `slug` to the runner
    ///
    /// The bearer credential is attached when the session has one.
    pub async fn submit(
        &self,
        slug: &str,
        submission: &SubmitRequest,
        session: &Session,
    ) -> Result<SubmitResponse, ApiError> {
        let url = endpoint(&self.base_url, &["api", "problems", slug, "submit"])?;
        debug!(slug, language = %submission.language_name, "submitting solution");

        let request = with_bearer(self.http_client.post(url), session).json(submission);
        send_json(request).await
    }

    /// Submits a quiz answer
    ///
    /// Requires a logged-in session. Without a token no request is made and
    /// `ApiError::Unauthenticated` is returned.
    pub async fn answer_question(&self, answer: &AnswerRequest, session: &Session) -> Result<AnswerResult, ApiError> {
        let token = session.token().ok_or(ApiError::Unauthenticated)?;
        let url = endpoint(&self.base_url, &["api", "quiz", "question", "answer"])?;
        debug!(question_id = answer.question_id, answer_id = answer.answer_id, "submitting quiz answer");

        let request = self.http_client.post(url).bearer_auth(token).json(answer);
        send_json(request).await
    }
}
