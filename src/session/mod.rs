//! Session gate: token persistence, verification against the backend, the
//! auth session state machine and the route guard built on top of it.

pub mod client;
pub mod error;
pub mod guard;
pub mod routes;
pub mod state;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use error::{AuthError, ErrorKind};
pub use guard::{GuardState, Redirect, RouteGuard, View};
pub use state::{AuthSession, Authorization, SessionSnapshot, SessionState};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use types::{RouteRequirement, UserRecord};
