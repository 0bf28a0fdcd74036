use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The `/api/users/me` payload as cached by the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "strict_true")]
    pub is_admin: bool,
    #[serde(default)]
    pub visited_islands: Vec<String>,
    #[serde(default)]
    pub badges: Vec<Value>,
    #[serde(default)]
    pub active_challenges: Vec<Value>,
}

impl UserRecord {
    /// Name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

// Only the JSON literal `true` grants admin; "true", 1 and null do not.
fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// FastAPI error body; `detail` is a string for `HTTPException` and a list for
/// validation errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
            _ => None,
        }
    }
}

/// Access requirement attached to a navigable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteRequirement {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteRequirement {
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
    };
    pub const AUTHENTICATED: Self = Self {
        requires_auth: true,
        requires_admin: false,
    };
    pub const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
    };

    /// Builds a requirement; admin access always implies authentication.
    #[must_use]
    pub const fn new(requires_auth: bool, requires_admin: bool) -> Self {
        Self {
            requires_auth: requires_auth || requires_admin,
            requires_admin,
        }
    }

    /// Login page for visitors turned away from this region.
    #[must_use]
    pub const fn login_path(&self) -> &'static str {
        if self.requires_admin {
            "/admin/login"
        } else {
            "/login"
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match (self.requires_auth, self.requires_admin) {
            (_, true) => "admin",
            (true, false) => "authenticated",
            (false, false) => "public",
        }
    }
}

/// Normalize an email before it is sent to the backend.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

/// Basic email format check; the backend performs the real validation.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
