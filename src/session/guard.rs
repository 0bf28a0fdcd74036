//! Route guard: admits or redirects a navigation into a protected region.
//!
//! A guard starts in [`GuardState::Checking`] and asks the session's
//! authorization service in a background task. Only the most recently issued
//! check may publish; dropping the guard cancels whatever is in flight, and a
//! cancelled check never touches the session either.

use crate::session::{
    error::{ErrorKind, ACCESS_DENIED},
    state::{AuthSession, Authorization},
    token::TokenStore,
    types::RouteRequirement,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Message to show on the target page, if any.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authorized,
    Unauthenticated(Redirect),
    Unauthorized(Redirect),
}

impl GuardState {
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Checking)
    }

    fn from_authorization(requirement: RouteRequirement, outcome: Authorization) -> Self {
        match outcome {
            Authorization::Granted => Self::Authorized,
            Authorization::Unauthenticated(err) => {
                // Expired or missing sessions redirect silently.
                let notice = (err.kind() == ErrorKind::Transport).then(|| err.user_message());
                Self::Unauthenticated(Redirect {
                    to: requirement.login_path().to_string(),
                    notice,
                })
            }
            Authorization::Forbidden(user) => {
                info!(user_id = %user.id, "admin route refused");
                Self::Unauthorized(Redirect {
                    to: HOME_PATH.to_string(),
                    notice: Some(ACCESS_DENIED.to_string()),
                })
            }
        }
    }
}

/// What the navigation layer should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    Children,
    Redirect(Redirect),
}

impl From<&GuardState> for View {
    fn from(state: &GuardState) -> Self {
        match state {
            GuardState::Checking => Self::Loading,
            GuardState::Authorized => Self::Children,
            GuardState::Unauthenticated(redirect) | GuardState::Unauthorized(redirect) => {
                Self::Redirect(redirect.clone())
            }
        }
    }
}

pub struct RouteGuard<S> {
    session: Arc<AuthSession<S>>,
    requirement: RouteRequirement,
    state: Arc<watch::Sender<GuardState>>,
    generation: Arc<AtomicU64>,
    lifetime: CancellationToken,
    in_flight: CancellationToken,
}

impl<S: TokenStore + 'static> RouteGuard<S> {
    /// Mount a guard and start its first check. Must be called inside a
    /// tokio runtime.
    #[must_use]
    pub fn mount(session: Arc<AuthSession<S>>, requirement: RouteRequirement) -> Self {
        let (state, _) = watch::channel(GuardState::Checking);
        let lifetime = CancellationToken::new();
        let in_flight = lifetime.child_token();

        let mut guard = Self {
            session,
            requirement,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            lifetime,
            in_flight,
        };
        guard.check();
        guard
    }

    /// Change the requirement and re-verify. Any earlier check is cancelled.
    pub fn set_requirement(&mut self, requirement: RouteRequirement) {
        self.requirement = requirement;
        self.check();
    }

    /// Issue a new check, superseding the one in flight.
    pub fn check(&mut self) {
        self.in_flight.cancel();
        self.in_flight = self.lifetime.child_token();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(GuardState::Checking);

        let requirement = self.requirement;
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.generation);
        let cancel = self.in_flight.clone();

        debug!(generation, requirement = requirement.label(), "guard check issued");

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(generation, "guard check cancelled");
                }
                outcome = session.authorize(requirement) => {
                    let next = GuardState::from_authorization(requirement, outcome);
                    let published = state.send_if_modified(|current| {
                        if cancel.is_cancelled() || latest.load(Ordering::SeqCst) != generation {
                            return false;
                        }
                        *current = next;
                        true
                    });
                    if !published {
                        debug!(generation, "stale guard result discarded");
                    }
                }
            }
        });
    }
}

impl<S> RouteGuard<S> {
    #[must_use]
    pub const fn requirement(&self) -> RouteRequirement {
        self.requirement
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn view(&self) -> View {
        View::from(&*self.state.borrow())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Wait until the latest check has published a terminal state.
    pub async fn settled(&self) -> GuardState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(GuardState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Tear the guard down, cancelling any check in flight.
    pub fn unmount(self) {
        drop(self);
    }
}

impl<S> Drop for RouteGuard<S> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
