//! Application wiring and command execution
//!
//! `App` is built once at startup: one HTTP client, one response cache over
//! one store, and the session loaded from disk. Every command borrows these
//! instead of reaching for globals.

use reqwest::Client;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::cache::{CacheError, CacheStore, Collection, FileStore, ResponseCache};
use crate::cli::{CacheAction, Command, Config};
use crate::data::{
    AnswerRequest, ApiError, AuthClient, ProblemsClient, Session, SessionError, SessionStore, SubmissionsClient,
    SubmitRequest,
};
use crate::output;

/// Errors surfaced to the user by a command
#[derive(Debug, Error)]
pub enum AppError {
    /// A remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response cache could not be cleared
    #[error(transparent)]
    Storage(#[from] CacheError),

    /// The session file could not be written or removed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A cache-aside lookup produced nothing
    #[error("Could not load {0}; see the log for the cause (-v)")]
    Unavailable(String),

    /// The solution file could not be read
    #[error("Failed to read {path}: {source}")]
    SourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Response could not be rendered as JSON
    #[error("Failed to render JSON: {0}")]
    Render(#[from] serde_json::Error),
}

/// Holds the clients and state shared by all commands
pub struct App {
    json: bool,
    store: Arc<dyn CacheStore>,
    problems: ProblemsClient,
    submissions: SubmissionsClient,
    auth: AuthClient,
    sessions: SessionStore,
    session: Session,
}

impl App {
    /// Builds the application from its configuration, using a file-backed cache
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let store: Arc<dyn CacheStore> = Arc::new(FileStore::with_dir(config.cache_dir.clone()));
        Self::with_store(config, store)
    }

    /// Builds the application over a caller-supplied store
    pub fn with_store(config: &Config, store: Arc<dyn CacheStore>) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("problemdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AppError::HttpClient)?;

        let cache = ResponseCache::with_ttl(store.clone(), config.cache_ttl);
        let sessions = SessionStore::with_path(config.session_file.clone());
        let session = sessions.load();

        Ok(Self {
            json: config.json,
            store,
            problems: ProblemsClient::new(http_client.clone(), config.api_url.clone(), cache),
            submissions: SubmissionsClient::new(http_client.clone(), config.api_url.clone()),
            auth: AuthClient::new(http_client, config.auth_url.clone()),
            sessions,
            session,
        })
    }

    /// Runs one command and returns the text to print
    pub async fn run(&mut self, command: &Command) -> Result<String, AppError> {
        match command {
            Command::List {
                page,
                page_size,
                prefetch,
            } => {
                let listing = if *prefetch {
                    self.problems
                        .prefetch(*page, *page_size, &self.session)
                        .await
                        .map(|(listing, _)| listing)
                } else {
                    self.problems.get_list(*page, *page_size).await
                };
                let listing = listing.ok_or_else(|| AppError::Unavailable(format!("problem list page {}", page)))?;
                self.render(&listing, output::render_list)
            }
            Command::Show { slug } => {
                let detail = self
                    .problems
                    .get_detail(slug, &self.session)
                    .await
                    .ok_or_else(|| AppError::Unavailable(format!("problem '{}'", slug)))?;
                self.render(&detail, output::render_detail)
            }
            Command::Submit {
                slug,
                language,
                file,
                input,
            } => {
                let code = fs::read_to_string(file).map_err(|source| AppError::SourceFile {
                    path: file.clone(),
                    source,
                })?;
                let submission = SubmitRequest {
                    language_name: language.clone(),
                    code,
                    user_input: input.clone(),
                };
                let response = self.submissions.submit(slug, &submission, &self.session).await?;
                self.render(&response, output::render_submission)
            }
            Command::Answer { question, answer } => {
                let request = AnswerRequest {
                    question_id: *question,
                    answer_id: *answer,
                };
                let result = self.submissions.answer_question(&request, &self.session).await?;
                self.render(&result, output::render_answer)
            }
            Command::SendOtp { phone } => {
                self.auth.send_otp(phone).await?;
                Ok(format!("Code sent to {}.\n", phone))
            }
            Command::Login { otp_code } => {
                let login = self.auth.verify_otp(otp_code).await?;
                let session = Session::from(login);
                self.sessions.save(&session)?;
                self.session = session;
                info!("logged in");
                Ok(format!("Logged in as {}", output::render_user(self.session.user())))
            }
            Command::Logout => {
                self.sessions.clear()?;
                self.session = Session::anonymous();
                Ok("Logged out.\n".to_string())
            }
            Command::Whoami => match self.session.user() {
                Some(user) if self.json => Ok(format!("{}\n", serde_json::to_string_pretty(user)?)),
                user => Ok(output::render_user(user)),
            },
            Command::Cache { action } => self.run_cache(*action),
        }
    }

    fn run_cache(&self, action: CacheAction) -> Result<String, AppError> {
        match action {
            CacheAction::Stats => {
                let lists = self.store.len(Collection::ProblemList);
                let details = self.store.len(Collection::ProblemDetail);
                if self.json {
                    let stats = serde_json::json!({
                        "problems": lists,
                        "problem_details": details,
                    });
                    return Ok(format!("{}\n", serde_json::to_string_pretty(&stats)?));
                }
                Ok(format!("{} list pages, {} problem details cached.\n", lists, details))
            }
            CacheAction::Clear => {
                self.store.clear()?;
                info!("cache cleared");
                Ok("Cache cleared.\n".to_string())
            }
        }
    }

    fn render<T: Serialize>(&self, value: &T, text: fn(&T) -> String) -> Result<String, AppError> {
        if self.json {
            Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
        } else {
            Ok(text(value))
        }
    }
}
