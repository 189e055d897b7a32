use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use super::{AuthError, Principal};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

struct Session {
    principal: Principal,
    issued_at: Instant,
}

/// In-process map of session tokens to signed-in users.
///
/// Sessions expire `ttl` after sign-in. Expired entries are dropped on lookup
/// and swept whenever a new session opens.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn open(&self, principal: Principal) -> Result<String, AuthError> {
        let token = Uuid::new_v4().to_string();
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| AuthError::StoreUnavailable)?;
        guard.retain(|_, session| session.issued_at.elapsed() < self.ttl);
        guard.insert(
            token.clone(),
            Session {
                principal,
                issued_at: Instant::now(),
            },
        );
        Ok(token)
    }

    pub fn lookup(&self, token: &str) -> Option<Principal> {
        let mut guard = self.sessions.lock().ok()?;
        let session = guard.get(token)?;
        if session.issued_at.elapsed() < self.ttl {
            return Some(session.principal.clone());
        }
        guard.remove(token);
        None
    }

    pub fn close(&self, token: &str) -> bool {
        match self.sessions.lock() {
            Ok(mut guard) => guard.remove(token).is_some(),
            Err(_) => false,
        }
    }

    /// Number of sessions held, including any not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        ttl.as_secs()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}
