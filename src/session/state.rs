//! The auth session: one owned cache of "who is logged in", shared by `Arc`
//! with everything that needs it. All verification goes through
//! [`AuthSession::verify_current`], so the mount-time hydrate, `refresh` and
//! route guards agree on a single source of truth.
//!
//! Every failed verification clears the stored token (fail-closed). The
//! session publishes its snapshot through a `watch` channel; observers never
//! hold a lock across an `.await`.

use crate::session::{
    client::ApiClient,
    error::{AuthError, ErrorKind, LOGIN_FAILED},
    token::TokenStore,
    types::{normalize_email, valid_email, RouteRequirement, UserRecord},
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Not yet hydrated.
    #[default]
    Unknown,
    LoggedOut,
    LoggedIn(UserRecord),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::LoggedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// State plus the last human-readable error for the UI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub error: Option<String>,
}

/// Result of checking a route requirement against the session.
#[derive(Debug)]
pub enum Authorization {
    Granted,
    /// No valid session; carries why.
    Unauthenticated(AuthError),
    /// Valid session without the admin role.
    Forbidden(UserRecord),
}

pub struct AuthSession<S> {
    client: ApiClient,
    store: S,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl<S: TokenStore> AuthSession<S> {
    #[must_use]
    pub fn new(client: ApiClient, store: S) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        Self {
            client,
            store,
            snapshot,
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state.clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserRecord> {
        self.snapshot.borrow().state.user().cloned()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.snapshot.borrow().error.clone()
    }

    /// Receiver that observes every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Initial load: resolve `Unknown` into `LoggedIn` or `LoggedOut`.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        match self.verify_current().await {
            Ok(user) => debug!(user_id = %user.id, "session restored"),
            Err(AuthError::MissingToken) => debug!("no stored session"),
            Err(err) => {
                info!("stored session discarded: {err}");
                self.set_error(Some(err.user_message()));
            }
        }
    }

    /// Verify the stored token against the backend and update the cache.
    ///
    /// # Errors
    /// Returns the classified failure; the token store is empty afterwards.
    pub async fn verify_current(&self) -> Result<UserRecord, AuthError> {
        let Some(token) = self.store.read() else {
            self.set_state(SessionState::LoggedOut);
            return Err(AuthError::MissingToken);
        };

        let result = self.client.fetch_me(&token).await;

        if !self.holds_token(&token) {
            // A login or logout replaced the token while we were waiting.
            debug!("token changed during verification; keeping newer state");
            return self.current_user().ok_or(AuthError::MissingToken);
        }

        match result {
            Ok(user) => {
                self.set_state(SessionState::LoggedIn(user.clone()));
                Ok(user)
            }
            Err(err) => {
                debug!(kind = ?err.kind(), "verification failed: {err}");
                self.discard_token(&token);
                self.set_state(SessionState::LoggedOut);
                Err(err)
            }
        }
    }

    /// Log in with email and password. Never fails outward: on error the
    /// message is available from [`AuthSession::error`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        self.establish(email, password, false).await
    }

    /// Log in to the back-office: succeeds only for accounts whose
    /// `is_admin` is literally `true`. A refused account is never stored or
    /// published, and any previous session ends.
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, email: &str, password: &SecretString) -> bool {
        self.establish(email, password, true).await
    }

    async fn establish(&self, email: &str, password: &SecretString, require_admin: bool) -> bool {
        match self.try_login(email, password, require_admin).await {
            Ok(user) => {
                info!(user_id = %user.id, admin = user.is_admin, "logged in");
                true
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "login failed: {err}");
                if matches!(err, AuthError::NotAdmin) {
                    self.end_session();
                }
                let message = match err.kind() {
                    ErrorKind::Session => LOGIN_FAILED.to_string(),
                    _ => err.user_message(),
                };
                self.set_error(Some(message));
                false
            }
        }
    }

    // The token is stored and the user published only once the profile
    // fetch (and the admin check, when required) has succeeded.
    async fn try_login(
        &self,
        email: &str,
        password: &SecretString,
        require_admin: bool,
    ) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email);
        if !valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let token = self.client.issue_token(&email, password).await?;
        let user = self.client.fetch_me(&token).await?;

        if require_admin && !user.is_admin {
            return Err(AuthError::NotAdmin);
        }
        if !user.email.eq_ignore_ascii_case(&email) {
            warn!("backend returned a different account than requested");
        }

        self.store.save(&token)?;
        self.snapshot.send_replace(SessionSnapshot {
            state: SessionState::LoggedIn(user.clone()),
            error: None,
        });
        Ok(user)
    }

    /// Create an account and log into it. Succeeds only if the follow-up
    /// login succeeds.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &SecretString, name: &str) -> bool {
        let email = normalize_email(email);
        if !valid_email(&email) {
            self.set_error(Some(AuthError::InvalidEmail.user_message()));
            return false;
        }

        match self.client.create_user(&email, password, name.trim()).await {
            Ok(user) => debug!(user_id = %user.id, "account created"),
            Err(err) => {
                warn!(kind = ?err.kind(), "registration failed: {err}");
                self.set_error(Some(err.user_message()));
                return false;
            }
        }

        self.set_error(None);
        self.login(&email, password).await
    }

    /// Local-only logout. Idempotent.
    ///
    /// # Errors
    /// Returns an error if the token store cannot be cleared; the in-memory
    /// session is logged out regardless.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.snapshot.send_replace(SessionSnapshot {
            state: SessionState::LoggedOut,
            error: None,
        });
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Re-fetch the user after a state-changing action. Any failure ends the
    /// session, the same as a failed hydrate.
    ///
    /// # Errors
    /// Returns the classified verification failure.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<UserRecord, AuthError> {
        let result = self.verify_current().await;
        if let Err(err) = &result {
            if !matches!(err, AuthError::MissingToken) {
                self.set_error(Some(err.user_message()));
            }
        }
        result
    }

    /// Single authorization service used by route guards.
    pub async fn authorize(&self, requirement: RouteRequirement) -> Authorization {
        if !requirement.requires_auth {
            return Authorization::Granted;
        }

        match self.verify_current().await {
            Err(err) => Authorization::Unauthenticated(err),
            Ok(user) if requirement.requires_admin && !user.is_admin => {
                Authorization::Forbidden(user)
            }
            Ok(_) => Authorization::Granted,
        }
    }

    fn holds_token(&self, token: &SecretString) -> bool {
        self.store
            .read()
            .is_some_and(|current| current.expose_secret() == token.expose_secret())
    }

    fn discard_token(&self, token: &SecretString) {
        if self.holds_token(token) {
            if let Err(err) = self.store.clear() {
                error!("failed to clear stored token: {err}");
            }
        }
    }

    fn end_session(&self) {
        if let Err(err) = self.store.clear() {
            error!("failed to clear stored token: {err}");
        }
        self.set_state(SessionState::LoggedOut);
    }

    fn set_state(&self, state: SessionState) {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.state == state {
                false
            } else {
                snapshot.state = state;
                true
            }
        });
    }

    fn set_error(&self, error: Option<String>) {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.error == error {
                false
            } else {
                snapshot.error = error;
                true
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{
        error::{BACKEND_UNREACHABLE, NOT_ADMIN, SESSION_EXPIRED},
        test_support::{
            can_bind_localhost, mount_login, mount_me, secret, session, user_json,
        },
        token::MemoryTokenStore,
    };
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn hydrate_without_token_is_logged_out() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let session = session(&server, MemoryTokenStore::new())?;
        assert_eq!(session.state(), SessionState::Unknown);

        session.hydrate().await;
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.error().is_none());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn hydrate_with_valid_token_logs_in() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_me(&server, "tok-1", user_json("a@b.com", json!(false))).await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        session.hydrate().await;

        assert_eq!(session.current_user().unwrap().email, "a@b.com");
        Ok(())
    }

    #[tokio::test]
    async fn hydrate_with_rejected_token_clears_store() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::with_token("expired"))?;
        session.hydrate().await;

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.store().read().is_none());
        assert_eq!(session.error().as_deref(), Some(SESSION_EXPIRED));
        Ok(())
    }

    #[tokio::test]
    async fn hydrate_with_backend_down_reports_unreachable() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        session.hydrate().await;

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.store().read().is_none());
        assert_eq!(session.error().as_deref(), Some(BACKEND_UNREACHABLE));
        Ok(())
    }

    #[tokio::test]
    async fn every_verification_failure_empties_store() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let failures = [
            ResponseTemplate::new(401),
            ResponseTemplate::new(403),
            ResponseTemplate::new(404),
            ResponseTemplate::new(500),
            ResponseTemplate::new(200).set_body_string("not json"),
            ResponseTemplate::new(200).set_body_json(json!({ "id": "u-1" })),
        ];

        for response in failures {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/users/me"))
                .respond_with(response)
                .mount(&server)
                .await;

            let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
            assert!(session.verify_current().await.is_err());
            assert!(session.store().read().is_none());
            assert!(session.current_user().is_none());
        }
        Ok(())
    }

    #[tokio::test]
    async fn login_caches_user_and_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_login(&server, "tok-a").await;
        mount_me(&server, "tok-a", user_json("a@b.com", json!(false))).await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(session.login("a@b.com", &secret("pw")).await);

        assert_eq!(session.current_user().unwrap().email, "a@b.com");
        assert_eq!(session.store().read().unwrap().expose_secret(), "tok-a");
        assert!(session.error().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn login_with_bad_credentials_sets_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Incorrect email or password"
            })))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(!session.login("a@b.com", &secret("nope")).await);

        assert_eq!(session.error().as_deref(), Some("Incorrect email or password"));
        assert!(session.store().read().is_none());
        assert!(session.current_user().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_malformed_email_without_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let session = session(&server, MemoryTokenStore::new())?;

        assert!(!session.login("not-an-email", &secret("pw")).await);
        assert!(session.error().is_some());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_stores_nothing_when_profile_fetch_fails() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_login(&server, "tok-a").await;
        // No /users/me mock: wiremock answers 404.

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(!session.login("a@b.com", &secret("pw")).await);

        assert!(session.store().read().is_none());
        assert!(session.current_user().is_none());
        assert_eq!(session.error().as_deref(), Some(LOGIN_FAILED));
        Ok(())
    }

    /// Memory store that counts writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryTokenStore,
        saves: std::sync::atomic::AtomicUsize,
    }

    impl TokenStore for CountingStore {
        fn save(&self, token: &SecretString) -> std::io::Result<()> {
            self.saves
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.save(token)
        }

        fn read(&self) -> Option<SecretString> {
            self.inner.read()
        }

        fn clear(&self) -> std::io::Result<()> {
            self.inner.clear()
        }
    }

    #[tokio::test]
    async fn admin_login_never_stores_or_publishes_non_admin() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_login(&server, "tok-a").await;
        mount_me(&server, "tok-a", user_json("a@b.com", json!(false))).await;

        let session = session(&server, CountingStore::default())?;
        let mut rx = session.subscribe();
        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                seen.push(rx.borrow_and_update().state.clone());
            }
            seen
        });

        assert!(!session.admin_login("a@b.com", &secret("pw")).await);
        assert_eq!(
            session
                .store()
                .saves
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );

        drop(session);
        let seen = observer.await?;
        assert!(seen.iter().all(|state| state.user().is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_refuses_non_admin() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_login(&server, "tok-a").await;
        mount_me(&server, "tok-a", user_json("a@b.com", json!("true"))).await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(!session.admin_login("a@b.com", &secret("pw")).await);

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.store().read().is_none());
        assert_eq!(session.error().as_deref(), Some(NOT_ADMIN));
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_accepts_admin() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_login(&server, "tok-admin").await;
        mount_me(&server, "tok-admin", user_json("a@b.com", json!(true))).await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(session.admin_login("a@b.com", &secret("pw")).await);
        assert!(session.current_user().unwrap().is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn logout_is_idempotent() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_me(&server, "tok-1", user_json("a@b.com", json!(false))).await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        session.hydrate().await;
        assert!(session.current_user().is_some());

        session.logout()?;
        let once = session.snapshot();
        session.logout()?;

        assert_eq!(session.snapshot(), once);
        assert_eq!(once.state, SessionState::LoggedOut);
        assert!(session.store().read().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_failure_forces_logout() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(user_json("a@b.com", json!(false))),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        session.hydrate().await;
        assert!(session.current_user().is_some());

        let err = session.refresh().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Session);
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.store().read().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_picks_up_new_visits() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(user_json("a@b.com", json!(false))),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        let mut visited = user_json("a@b.com", json!(false));
        visited["visited_islands"] = json!(["maafushi"]);
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(visited))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        session.hydrate().await;
        assert!(session.current_user().unwrap().visited_islands.is_empty());

        let user = session.refresh().await?;
        assert_eq!(user.visited_islands, vec!["maafushi"]);
        assert_eq!(session.current_user().unwrap(), user);
        Ok(())
    }

    #[tokio::test]
    async fn authorize_denies_non_literal_admin_flags() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        for flag in [json!("true"), json!(1), json!(null), json!(false)] {
            let server = MockServer::start().await;
            mount_me(&server, "tok-1", user_json("a@b.com", flag.clone())).await;

            let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
            let outcome = session.authorize(RouteRequirement::ADMIN).await;
            assert!(
                matches!(outcome, Authorization::Forbidden(_)),
                "is_admin = {flag} must be forbidden"
            );
        }

        let server = MockServer::start().await;
        let mut body = user_json("a@b.com", json!(null));
        body.as_object_mut().unwrap().remove("is_admin");
        mount_me(&server, "tok-1", body).await;
        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        assert!(matches!(
            session.authorize(RouteRequirement::ADMIN).await,
            Authorization::Forbidden(_)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn authorize_public_skips_backend() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let session = session(&server, MemoryTokenStore::new())?;

        assert!(matches!(
            session.authorize(RouteRequirement::PUBLIC).await,
            Authorization::Granted
        ));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn register_then_login() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(user_json("a@b.com", json!(false))),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server, "tok-new").await;
        mount_me(&server, "tok-new", user_json("a@b.com", json!(false))).await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(session.register("a@b.com", &secret("pw"), "Name").await);
        assert_eq!(session.current_user().unwrap().email, "a@b.com");
        Ok(())
    }

    #[tokio::test]
    async fn register_fails_when_auto_login_fails() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(user_json("a@b.com", json!(false))),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::new())?;
        assert!(!session.register("a@b.com", &secret("pw"), "Name").await);
        assert_eq!(session.error().as_deref(), Some(LOGIN_FAILED));
        assert!(session.current_user().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_me(&server, "tok-1", user_json("a@b.com", json!(false))).await;

        let session = session(&server, MemoryTokenStore::with_token("tok-1"))?;
        let mut rx = session.subscribe();

        session.hydrate().await;
        assert!(rx.has_changed()?);
        assert!(rx.borrow_and_update().state.user().is_some());

        session.logout()?;
        assert!(rx.has_changed()?);
        assert_eq!(rx.borrow_and_update().state, SessionState::LoggedOut);
        Ok(())
    }
}
