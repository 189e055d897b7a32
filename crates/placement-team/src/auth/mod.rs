//! Sign-in gate in front of the job fair routes.
//!
//! The core only asks "who is the current user?" through [`SessionGate`];
//! everything else here is the small credential and session layer the
//! service ships with.

pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::AuthConfig;
pub use session::{session_token, SessionStore, DEFAULT_SESSION_TTL, SESSION_COOKIE};

/// An authenticated placement team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
}

/// Resolves the caller of a request, if any.
pub trait SessionGate: Send + Sync {
    fn current_user(&self, headers: &HeaderMap) -> Option<Principal>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("session store unavailable")]
    StoreUnavailable,
}

/// Single configured account. With no password set, nobody can sign in.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: Option<String>,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        let expected = self.password.as_deref()?;
        if username == self.username && password == expected {
            Some(Principal {
                username: self.username.clone(),
            })
        } else {
            None
        }
    }
}

impl From<&AuthConfig> for StaticCredentials {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

pub struct AuthService {
    credentials: StaticCredentials,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(credentials: StaticCredentials) -> Self {
        Self::with_session_ttl(credentials, DEFAULT_SESSION_TTL)
    }

    pub fn with_session_ttl(credentials: StaticCredentials, ttl: Duration) -> Self {
        Self {
            credentials,
            sessions: SessionStore::with_ttl(ttl),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    /// Check credentials and open a session, returning its token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let principal = self
            .credentials
            .verify(username.trim(), password)
            .ok_or(AuthError::InvalidCredentials)?;
        let token = self.sessions.open(principal)?;
        info!(
            username = username.trim(),
            active_sessions = self.sessions.len(),
            "user signed in"
        );
        Ok(token)
    }

    pub fn logout(&self, headers: &HeaderMap) -> bool {
        session_token(headers)
            .map(|token| self.sessions.close(token))
            .unwrap_or(false)
    }
}

impl SessionGate for AuthService {
    fn current_user(&self, headers: &HeaderMap) -> Option<Principal> {
        session_token(headers).and_then(|token| self.sessions.lookup(token))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub fn auth_router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .with_state(service)
}

pub(crate) async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Form(form): Form<LoginForm>,
) -> Response {
    match service.login(&form.username, &form.password) {
        Ok(token) => {
            let payload = json!({ "success": true, "message": "signed in" });
            let cookie = session::session_cookie(&token, service.session_ttl());
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(payload),
            )
                .into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(username = form.username.trim(), "rejected sign-in attempt");
            let payload = json!({
                "success": false,
                "message": AuthError::InvalidCredentials.to_string(),
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "success": false, "message": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    let closed = service.logout(&headers);
    let message = if closed {
        "signed out"
    } else {
        "no active session"
    };
    let payload = json!({ "success": closed, "message": message });
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session::expired_session_cookie())],
        Json(payload),
    )
        .into_response()
}

/// Response for requests that reach a gated route without a session.
pub fn unauthorized() -> Response {
    let payload = json!({ "success": false, "message": "authentication required" });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> AuthService {
        AuthService::new(StaticCredentials::new(
            "placement",
            Some("fair-2024".to_string()),
        ))
    }

    #[test]
    fn login_opens_session_visible_to_gate() {
        let auth = service();
        let token = auth.login("placement", "fair-2024").expect("valid login");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).expect("header"),
        );
        let user = auth.current_user(&headers).expect("session resolves");
        assert_eq!(user.username, "placement");

        assert!(auth.logout(&headers));
        assert!(auth.current_user(&headers).is_none());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.login("placement", "guess"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn unset_password_disables_login() {
        let auth = AuthService::new(StaticCredentials::new("placement", None));
        assert!(matches!(
            auth.login("placement", ""),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn sessions_expire_after_configured_ttl() {
        let auth = AuthService::with_session_ttl(
            StaticCredentials::new("placement", Some("fair-2024".to_string())),
            Duration::ZERO,
        );
        let token = auth.login("placement", "fair-2024").expect("valid login");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}")).expect("header"),
        );
        assert!(auth.current_user(&headers).is_none());
    }

    #[test]
    fn missing_cookie_has_no_user() {
        assert!(service().current_user(&HeaderMap::new()).is_none());
    }
}
