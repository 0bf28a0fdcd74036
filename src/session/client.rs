//! HTTP client for the three backend endpoints the session gate consumes:
//! `POST /api/token`, `GET /api/users/me` and `POST /api/users`.
//!
//! Responses are classified rather than collapsed: a 4xx is a credential or
//! session rejection, a 5xx or a transport failure (including the request
//! timeout) is [`AuthError::Unreachable`]. Tokens and passwords are never
//! logged.

use crate::session::{
    error::AuthError,
    types::{ErrorBody, TokenResponse, UserRecord},
};
use reqwest::{header::ACCEPT, Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for the backend rooted at `base_url` (the API lives
    /// under `<base_url>/api/`).
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Unreachable(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an API endpoint, e.g. `users/me`.
    ///
    /// # Errors
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        let url = self
            .base_url
            .join(&format!("api/{}", path.trim_start_matches('/')))?;
        Ok(url)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] on a 4xx, [`AuthError::Unreachable`] on
    /// a 5xx or transport failure, [`AuthError::InvalidResponse`] if the body
    /// carries no token.
    #[instrument(skip(self, password))]
    pub async fn issue_token(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, AuthError> {
        let url = self.endpoint("token")?;

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .form(&[("username", email), ("password", password.expose_secret())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            debug!(%status, "token request rejected");

            return Err(if status.is_server_error() {
                server_error(status)
            } else {
                AuthError::InvalidCredentials { detail }
            });
        }

        let body: TokenResponse = response.json().await.map_err(transport_error)?;
        if body.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "token response without access_token".to_string(),
            ));
        }

        Ok(SecretString::from(body.access_token))
    }

    /// Ask the backend who `token` belongs to.
    ///
    /// # Errors
    /// [`AuthError::SessionRejected`] on a 4xx, [`AuthError::Unreachable`] on a
    /// 5xx or transport failure, [`AuthError::InvalidResponse`] on an
    /// undecodable body.
    #[instrument(skip_all)]
    pub async fn fetch_me(&self, token: &SecretString) -> Result<UserRecord, AuthError> {
        let url = self.endpoint("users/me")?;

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "session rejected");

            return Err(if status.is_server_error() {
                server_error(status)
            } else {
                AuthError::SessionRejected {
                    status: status.as_u16(),
                }
            });
        }

        response.json().await.map_err(transport_error)
    }

    /// Create an account. The caller logs in afterwards.
    ///
    /// # Errors
    /// [`AuthError::RegistrationRejected`] on a 4xx (e.g. email already
    /// registered), [`AuthError::Unreachable`] on a 5xx or transport failure.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<UserRecord, AuthError> {
        let url = self.endpoint("users")?;

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "name": name,
        });

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            debug!(%status, "registration rejected");

            return Err(if status.is_server_error() {
                server_error(status)
            } else {
                AuthError::RegistrationRejected { detail }
            });
        }

        response.json().await.map_err(transport_error)
    }
}

async fn error_detail(response: Response) -> Option<String> {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message())
}

fn server_error(status: StatusCode) -> AuthError {
    warn!(%status, "backend error");
    AuthError::Unreachable(format!("backend returned {status}"))
}

fn transport_error(err: reqwest::Error) -> AuthError {
    if err.is_decode() {
        AuthError::InvalidResponse(err.without_url().to_string())
    } else {
        AuthError::Unreachable(err.without_url().to_string())
    }
}
