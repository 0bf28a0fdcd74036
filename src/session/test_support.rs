//! Fixtures shared by the session tests.

use crate::session::{
    client::{ApiClient, DEFAULT_TIMEOUT},
    state::AuthSession,
    token::TokenStore,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sandboxed runners may forbid binding sockets; wiremock tests skip there.
pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

pub fn user_json(email: &str, is_admin: Value) -> Value {
    json!({
        "id": "u-1",
        "email": email,
        "name": "Aminath",
        "is_admin": is_admin,
        "visited_islands": [],
        "badges": [],
        "active_challenges": []
    })
}

pub fn session<S: TokenStore>(server: &MockServer, store: S) -> anyhow::Result<AuthSession<S>> {
    Ok(AuthSession::new(ApiClient::new(&server.uri(), DEFAULT_TIMEOUT)?, store))
}

/// `POST /api/token` answering `token` for any credentials.
pub async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

/// `GET /api/users/me` answering `body` for `token` only; other tokens get 404.
pub async fn mount_me(server: &MockServer, token: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
