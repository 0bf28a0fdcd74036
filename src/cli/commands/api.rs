use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use directories::ProjectDirs;
use std::{path::PathBuf, time::Duration};
use tracing::warn;
use url::Url;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TOKEN_FILE: &str = "token-file";
pub const ARG_TIMEOUT: &str = "timeout";

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
}

impl Options {
    /// Parse backend and storage arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API URL is missing or not an http(s) URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("missing required argument: --{ARG_API_URL}"))?;

        let parsed = Url::parse(api_url.trim()).context("invalid ISLANDLOGGER_API_URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("--{ARG_API_URL} must be an http(s) URL");
        }

        let token_file = token_file(matches);
        let timeout = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10);

        Ok(Self {
            api_url,
            token_file,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Token file from `--token-file`, or the per-user default.
#[must_use]
pub fn token_file(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>(ARG_TOKEN_FILE)
        .filter(|v| !v.trim().is_empty())
        .map_or_else(default_token_file, PathBuf::from)
}

/// Per-user config directory, or the working directory if none is known.
#[must_use]
pub fn default_token_file() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("mv", "IslandLogger", "islandlogger") {
        dirs.config_dir().join(SESSION_FILE)
    } else {
        warn!("Failed to determine platform-specific directories, will use fallback");
        PathBuf::from(SESSION_FILE)
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("IslandLogger backend base URL, example: https://islandlogger.mv")
                .env("ISLANDLOGGER_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_FILE)
                .long(ARG_TOKEN_FILE)
                .help("File holding the session token (default: user config dir)")
                .env("ISLANDLOGGER_TOKEN_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Backend request timeout in seconds")
                .default_value("10")
                .env("ISLANDLOGGER_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
}
