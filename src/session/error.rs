use thiserror::Error;

pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";
pub const BACKEND_UNREACHABLE: &str = "Unable to reach IslandLogger. Please try again.";
pub const LOGIN_FAILED: &str = "Failed to login. Please try again.";
pub const REGISTER_FAILED: &str = "Failed to register. Please try again.";
pub const NOT_ADMIN: &str = "You do not have administrator privileges";
pub const ACCESS_DENIED: &str = "Access denied: administrator privileges required.";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const STORAGE_FAILED: &str = "Unable to access the saved session.";

/// Coarse classification used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad email/password or a rejected registration: inline form message.
    Credentials,
    /// Missing, expired or invalid token: silent cleanup and redirect.
    Session,
    /// Valid session without the required role.
    Authorization,
    /// The backend could not be reached or timed out.
    Transport,
    /// The local token store failed.
    Storage,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("login rejected: {}", .detail.as_deref().unwrap_or("invalid credentials"))]
    InvalidCredentials { detail: Option<String> },
    #[error("registration rejected: {}", .detail.as_deref().unwrap_or("unknown reason"))]
    RegistrationRejected { detail: Option<String> },
    #[error("no session token")]
    MissingToken,
    #[error("session rejected by backend ({status})")]
    SessionRejected { status: u16 },
    #[error("administrator privileges required")]
    NotAdmin,
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("token store: {0}")]
    Storage(#[from] std::io::Error),
}

impl AuthError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail | Self::InvalidCredentials { .. } | Self::RegistrationRejected { .. } => {
                ErrorKind::Credentials
            }
            Self::MissingToken | Self::SessionRejected { .. } | Self::InvalidResponse(_) => {
                ErrorKind::Session
            }
            Self::NotAdmin => ErrorKind::Authorization,
            Self::Unreachable(_) | Self::InvalidUrl(_) => ErrorKind::Transport,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Text suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail => INVALID_EMAIL.to_string(),
            Self::InvalidCredentials { detail } => {
                detail.clone().unwrap_or_else(|| LOGIN_FAILED.to_string())
            }
            Self::RegistrationRejected { detail } => {
                detail.clone().unwrap_or_else(|| REGISTER_FAILED.to_string())
            }
            Self::MissingToken | Self::SessionRejected { .. } | Self::InvalidResponse(_) => {
                SESSION_EXPIRED.to_string()
            }
            Self::NotAdmin => NOT_ADMIN.to_string(),
            Self::Unreachable(_) | Self::InvalidUrl(_) => BACKEND_UNREACHABLE.to_string(),
            Self::Storage(_) => STORAGE_FAILED.to_string(),
        }
    }
}
