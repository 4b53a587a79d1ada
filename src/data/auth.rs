//! OTP login and the persisted session
//!
//! `AuthClient` talks to the authentication service. `SessionStore` keeps the
//! resulting token and user record on disk until an explicit logout; the
//! loaded `Session` is then passed to every call that may need a credential.

use directories::ProjectDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::{endpoint, send_json, ApiError, LoginResponse, User};

/// Errors from reading or writing the session file
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Credential and user record of the current installation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl Session {
    /// A session with no credential
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding `token` and no user record
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    /// The bearer token, if logged in. Empty tokens count as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl From<LoginResponse> for Session {
    fn from(login: LoginResponse) -> Self {
        Self {
            token: Some(login.token),
            user: Some(login.user),
        }
    }
}

/// Persists the session as a JSON file
///
/// The file has no expiry; it is removed only by `clear` (logout).
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a SessionStore in the XDG data directory
    ///
    /// Returns `None` if the data directory cannot be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "problemdesk")?;
        Some(Self::with_path(project_dirs.data_dir().join("session.json")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session, or an anonymous one if none can be read
    pub fn load(&self) -> Session {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Session::anonymous(),
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
            Session::anonymous()
        })
    }

    /// Stores `session`, replacing any previous one
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Removes the stored session
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Client for the OTP authentication service
#[derive(Debug, Clone)]
pub struct AuthClient {
    http_client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Asks the service to send a one-time code to `phone`
    pub async fn send_otp(&self, phone: &str) -> Result<(), ApiError> {
        let request = self
            .http_client
            .post(endpoint(&self.base_url, &["api", "send-otp"])?)
            .json(&json!({ "phone": phone }));

        // The body carries nothing the client needs
        let _: serde_json::Value = send_json(request).await?;
        Ok(())
    }

    /// Exchanges a one-time code for a token and user record
    pub async fn verify_otp(&self, otp_code: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .http_client
            .post(endpoint(&self.base_url, &["api", "login"])?)
            .json(&json!({ "otp_code": otp_code }));

        send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_login() -> LoginResponse {
        LoginResponse {
            token: "tok-123".to_string(),
            user: User {
                user_id: "42".to_string(),
                user: "alice".to_string(),
                phone: "+998901234567".to_string(),
                full_name: "Alice Example".to_string(),
                last_login_time: None,
            },
        }
    }

    #[test]
    fn test_load_without_file_is_anonymous() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(temp_dir.path().join("session.json"));

        let session = store.load();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_save_then_load_restores_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(temp_dir.path().join("nested").join("session.json"));
        let session = Session::from(sample_login());

        store.save(&session).expect("Save should succeed");

        let loaded = store.load();
        assert_eq!(loaded, session);
        assert_eq!(loaded.token(), Some("tok-123"));
        assert_eq!(loaded.user().unwrap().full_name, "Alice Example");
    }

    #[test]
    fn test_clear_logs_out() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(temp_dir.path().join("session.json"));
        store.save(&Session::from(sample_login())).unwrap();

        store.clear().expect("Clear should succeed");
        assert!(!store.load().is_authenticated());

        // Logging out twice is not an error
        store.clear().expect("Second clear should succeed");
    }

    #[test]
    fn test_corrupt_session_file_is_anonymous() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(SessionStore::with_path(path).load(), Session::anonymous());
    }

    #[test]
    fn test_save_failure_is_a_session_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = SessionStore::with_path(blocker.join("session.json"));

        let err = store.save(&Session::from(sample_login())).unwrap_err();

        assert!(matches!(err, SessionError::Io(_)));
        assert!(err.to_string().starts_with("Session file"));
    }

    #[test]
    fn test_default_store_lives_under_project_dir() {
        if let Some(store) = SessionStore::new() {
            assert!(store.path().ends_with("session.json"));
            assert!(store.path().to_string_lossy().contains("problemdesk"));
        }
    }

    #[test]
    fn test_empty_token_is_not_a_credential() {
        assert!(!Session::with_token("").is_authenticated());
        assert!(Session::with_token("abc").is_authenticated());
    }
}
