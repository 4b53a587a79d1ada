//! Command-line interface parsing for problemdesk
//!
//! This module handles parsing of CLI arguments using clap and turns the
//! global options into a validated `Config`. API endpoints and storage
//! locations can also come from `PROBLEMDESK_*` environment variables.

use chrono::Duration;
use clap::{ArgAction, Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::{FileStore, DEFAULT_TTL_SECS};
use crate::data::SessionStore;

/// Platform API used when neither `--api-url` nor `PROBLEMDESK_API_URL` is set
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Authentication service used when neither `--auth-url` nor `PROBLEMDESK_AUTH_URL` is set
pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:8001";

/// Default page size for `list`
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// A base URL could not be parsed
    #[error("Invalid URL for {name}: '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    /// No cache or session location could be determined
    #[error("Could not determine a {0} location; pass it explicitly")]
    NoDirectory(&'static str),
}

/// problemdesk - browse, solve and submit coding problems
#[derive(Parser, Debug)]
#[command(name = "problemdesk")]
#[command(about = "Coding-practice platform client with a local response cache")]
#[command(version)]
pub struct Cli {
    /// Base URL of the platform API
    #[arg(long, env = "PROBLEMDESK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Base URL of the authentication service
    #[arg(long, env = "PROBLEMDESK_AUTH_URL", default_value = DEFAULT_AUTH_URL, global = true)]
    pub auth_url: String,

    /// Directory for cached API responses
    #[arg(long, env = "PROBLEMDESK_CACHE_DIR", value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// File holding the login session
    #[arg(long, env = "PROBLEMDESK_SESSION_FILE", value_name = "FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// How long cached responses stay fresh
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TTL_SECS as u32, global = true)]
    pub cache_ttl: u32,

    /// HTTP request timeout
    #[arg(long, value_name = "SECONDS", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List problems, one page at a time
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Problems per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: u32,
        /// Also load every listed problem's details into the cache
        #[arg(long)]
        prefetch: bool,
    },
    /// Show one problem
    Show {
        /// Problem slug, e.g. two-sum
        slug: String,
    },
    /// Submit a solution
    Submit {
        /// Problem slug
        slug: String,
        /// Language name as listed in the problem's starter code
        #[arg(long)]
        language: String,
        /// Source file to submit
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
        /// Standard input for the run
        #[arg(long, default_value = "")]
        input: String,
    },
    /// Answer a quiz question (requires login)
    Answer {
        #[arg(long)]
        question: u32,
        #[arg(long)]
        answer: u32,
    },
    /// Request a one-time login code
    SendOtp {
        phone: String,
    },
    /// Log in with a one-time code
    Login {
        otp_code: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Inspect or wipe the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Count cached entries
    Stats,
    /// Delete every cached entry
    Clear,
}

/// Settings derived from CLI arguments and the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth_url: String,
    pub cache_dir: PathBuf,
    pub session_file: PathBuf,
    pub cache_ttl: Duration,
    pub timeout: std::time::Duration,
    pub json: bool,
}

impl Config {
    /// Builds a Config from parsed CLI arguments
    ///
    /// # Returns
    /// * `Ok(Config)` with URLs validated and directories resolved
    /// * `Err(CliError)` if a URL is malformed or no default location exists
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_url = validate_url("--api-url", &cli.api_url)?;
        let auth_url = validate_url("--auth-url", &cli.auth_url)?;

        let cache_dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => FileStore::new()
                .ok_or(CliError::NoDirectory("cache directory"))?
                .dir()
                .to_path_buf(),
        };
        let session_file = match &cli.session_file {
            Some(file) => file.clone(),
            None => SessionStore::new()
                .ok_or(CliError::NoDirectory("session file"))?
                .path()
                .to_path_buf(),
        };

        Ok(Config {
            api_url,
            auth_url,
            cache_dir,
            session_file,
            cache_ttl: Duration::seconds(i64::from(cli.cache_ttl)),
            timeout: std::time::Duration::from_secs(cli.timeout),
            json: cli.json,
        })
    }
}

/// Checks that `value` is an absolute http(s) URL and strips any trailing slash
fn validate_url(name: &'static str, value: &str) -> Result<String, CliError> {
    let invalid = || CliError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Maps the `-v` count to a default log filter
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_list_defaults() {
        let cli = Cli::parse_from(["problemdesk", "list"]);
        assert_eq!(
            cli.command,
            Command::List {
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
                prefetch: false
            }
        );
        assert_eq!(cli.cache_ttl, 300);
    }

    #[test]
    fn test_cli_parse_list_with_paging() {
        let cli = Cli::parse_from(["problemdesk", "list", "--page", "3", "--page-size", "50", "--prefetch"]);
        assert_eq!(
            cli.command,
            Command::List {
                page: 3,
                page_size: 50,
                prefetch: true
            }
        );
    }

    #[test]
    fn test_cli_rejects_page_zero() {
        assert!(Cli::try_parse_from(["problemdesk", "list", "--page", "0"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["problemdesk", "show", "two-sum", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command, Command::Show { slug: "two-sum".to_string() });
    }

    #[test]
    fn test_cli_parse_cache_clear() {
        let cli = Cli::parse_from(["problemdesk", "cache", "clear"]);
        assert_eq!(cli.command, Command::Cache { action: CacheAction::Clear });
    }

    #[test]
    fn test_config_from_cli_uses_explicit_paths() {
        let cli = Cli::parse_from([
            "problemdesk",
            "--api-url",
            "https://api.example.com/",
            "--cache-dir",
            "/tmp/pd-cache",
            "--session-file",
            "/tmp/pd-session.json",
            "--cache-ttl",
            "60",
            "whoami",
        ]);
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/pd-cache"));
        assert_eq!(config.session_file, PathBuf::from("/tmp/pd-session.json"));
        assert_eq!(config.cache_ttl, Duration::seconds(60));
    }

    #[test]
    fn test_config_from_cli_defaults_to_store_locations() {
        if std::env::var_os("PROBLEMDESK_CACHE_DIR").is_some() || std::env::var_os("PROBLEMDESK_SESSION_FILE").is_some() {
            return;
        }
        let (Some(files), Some(sessions)) = (FileStore::new(), SessionStore::new()) else {
            return;
        };

        let cli = Cli::parse_from(["problemdesk", "whoami"]);
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.cache_dir, files.dir());
        assert_eq!(config.session_file, sessions.path());
        assert!(config.session_file.ends_with("session.json"));
    }

    #[test]
    fn test_config_from_cli_rejects_bad_url() {
        let cli = Cli::parse_from(["problemdesk", "--api-url", "not a url", "whoami"]);
        let err = Config::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("--api-url"));

        let cli = Cli::parse_from(["problemdesk", "--auth-url", "ftp://example.com", "whoami"]);
        assert!(Config::from_cli(&cli).is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(9), "trace");
    }
}
