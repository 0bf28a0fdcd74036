use crate::cli::commands::api;
use crate::session::{ApiClient, AuthSession, FileTokenStore, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Settings shared by every subcommand that talks to the backend.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, token_file: PathBuf) -> Self {
        Self {
            api_url,
            token_file,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the auth session backed by the token file.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built for `api_url`.
    pub fn session(&self) -> Result<Arc<AuthSession<FileTokenStore>>> {
        let client = ApiClient::new(&self.api_url, self.timeout)
            .with_context(|| format!("invalid API URL: {}", self.api_url))?;
        Ok(Arc::new(AuthSession::new(
            client,
            FileTokenStore::new(&self.token_file),
        )))
    }
}

impl From<api::Options> for GlobalArgs {
    fn from(options: api::Options) -> Self {
        Self::new(options.api_url, options.token_file).with_timeout(options.timeout)
    }
}
