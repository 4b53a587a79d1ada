//! Core data models for problemdesk
//!
//! This module contains the payload types exchanged with the platform API:
//! problem listings, problem details, submissions, quiz answers and the
//! authenticated user record.

pub mod auth;
pub mod problems;
pub mod submissions;

pub use auth::{AuthClient, Session, SessionError, SessionStore};
pub use problems::{list_cache_key, ProblemsClient};
pub use submissions::SubmissionsClient;

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur when talking to the platform API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("API error: {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The endpoint requires a session token and none is stored
    #[error("Not logged in: this action requires a session token")]
    Unauthenticated,

    /// The base URL cannot carry the request path
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Appends path segments to a base URL
///
/// Each segment is percent-encoded on its own, so a slug containing `/`, `?`
/// or `#` stays a single segment. An empty last segment leaves a trailing slash.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Attaches `Authorization: Bearer` when the session holds a token
pub(crate) fn with_bearer(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Sends a request and decodes a 2xx JSON body
///
/// Any 2xx status counts as success. The body is read as text first so that
/// a malformed payload surfaces as `ApiError::Parse` rather than a transport error.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.header(ACCEPT, "application/json").send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            url: response.url().to_string(),
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Problem difficulty, serialized as the integer the API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("invalid difficulty level: {}", other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl Difficulty {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// One row of a problem listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub title: String,
    pub slug: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fields this client does not model, kept for JSON output
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A paginated page of problems
///
/// Pagination fields default when the server omits them, so an empty
/// listing such as `{"results": [], "total_pages": 0}` still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub previous_page: Option<u32>,
    pub results: Vec<ProblemSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Starter code for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartFunction {
    pub language_id: u32,
    pub language_name: String,
    pub template: String,
}

/// A worked input/output example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemExample {
    pub id: u32,
    pub input_txt: String,
    pub output_txt: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemHint {
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemChallenge {
    pub id: u32,
    pub text: String,
}

/// Video walkthrough attached to a problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemVideo {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hls_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub status: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub dislikes_count: u64,
}

/// A quiz answer option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: u32,
    pub description: String,
}

/// A quiz question attached to a problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub description: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Full problem record as returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub start_function: Vec<StartFunction>,
    #[serde(default)]
    pub examples: Vec<ProblemExample>,
    #[serde(default)]
    pub hints: Vec<ProblemHint>,
    #[serde(default)]
    pub challenges: Vec<ProblemChallenge>,
    #[serde(default)]
    pub videos: Vec<ProblemVideo>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a code submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub language_name: String,
    pub code: String,
    pub user_input: String,
}

/// Outcome of a code submission; `result` is whatever the runner reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Body of a quiz answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question_id: u32,
    pub answer_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub is_correct: bool,
}

/// Authenticated user record returned on login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub last_login_time: Option<DateTime<Utc>>,
}

/// Response of the OTP login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
