//! Integration tests for the problemdesk binary
//!
//! Runs the real executable with temporary cache and session locations.

use std::path::Path;
use std::process::Command;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to run the CLI with given args and isolated storage
fn run_cli(storage: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_problemdesk"))
        .args(args)
        .env("PROBLEMDESK_CACHE_DIR", storage.join("cache"))
        .env("PROBLEMDESK_SESSION_FILE", storage.join("session.json"))
        .env_remove("PROBLEMDESK_API_URL")
        .env_remove("PROBLEMDESK_AUTH_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute problemdesk")
}

#[test]
fn test_help_flag_exits_successfully() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("problemdesk"), "Help should mention problemdesk");
    assert!(stdout.contains("list"), "Help should mention the list command");
}

#[test]
fn test_missing_command_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &[]);
    assert!(!output.status.success());
}

#[test]
fn test_whoami_without_session() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["whoami"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Not logged in.\n");
}

#[test]
fn test_answer_requires_login() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["answer", "--question", "5", "--answer", "10"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not logged in"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_invalid_api_url_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["--api-url", "nope", "list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid URL"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_fetches_then_serves_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/problems/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "page_size": 20,
            "total_pages": 1,
            "total_items": 1,
            "has_next": false,
            "has_previous": false,
            "next_page": null,
            "previous_page": null,
            "results": [{"title": "Two Sum", "slug": "two-sum", "difficulty": 1, "is_completed": false}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let uri = server.uri();

    let first = run_cli(temp_dir.path(), &["--api-url", &uri, "list"]);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(String::from_utf8_lossy(&first.stdout).contains("two-sum"));

    let second = run_cli(temp_dir.path(), &["--api-url", &uri, "list", "--json"]);
    assert!(second.status.success());
    let body: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(body["results"][0]["slug"], json!("two-sum"));

    let stats = run_cli(temp_dir.path(), &["cache", "stats"]);
    assert_eq!(
        String::from_utf8_lossy(&stats.stdout),
        "1 list pages, 0 problem details cached.\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_failure_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/problems/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let output = run_cli(temp_dir.path(), &["--api-url", &server.uri(), "show", "unknown"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not load problem 'unknown'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-abc",
            "user": {"user_id": "42", "user": "alice", "phone": "+998901234567", "full_name": "Alice Example"}
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let login = run_cli(temp_dir.path(), &["--auth-url", &server.uri(), "login", "123456"]);
    assert!(login.status.success(), "stderr: {}", String::from_utf8_lossy(&login.stderr));
    assert!(temp_dir.path().join("session.json").exists());

    let whoami = run_cli(temp_dir.path(), &["whoami"]);
    assert!(String::from_utf8_lossy(&whoami.stdout).contains("Alice Example"));

    let logout = run_cli(temp_dir.path(), &["logout"]);
    assert!(logout.status.success());
    assert!(!temp_dir.path().join("session.json").exists());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use problemdesk::cli::{CacheAction, Cli, Command};

    #[test]
    fn test_cli_parse_submit() {
        let cli = Cli::parse_from([
            "problemdesk",
            "submit",
            "two-sum",
            "--language",
            "python",
            "--file",
            "solution.py",
        ]);
        match cli.command {
            Command::Submit {
                slug, language, input, ..
            } => {
                assert_eq!(slug, "two-sum");
                assert_eq!(language, "python");
                assert_eq!(input, "");
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_cache_stats() {
        let cli = Cli::parse_from(["problemdesk", "cache", "stats"]);
        assert_eq!(cli.command, Command::Cache { action: CacheAction::Stats });
    }

    #[test]
    fn test_cli_submit_requires_language() {
        assert!(Cli::try_parse_from(["problemdesk", "submit", "two-sum", "--file", "a.py"]).is_err());
    }
}
