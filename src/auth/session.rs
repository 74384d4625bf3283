//! Cookie sessions.
//!
//! The server keeps `token -> SessionRecord` in memory. Handlers never touch
//! the store directly for reads; they receive an immutable [`Session`] (or
//! [`AuthUser`]) built once per request by the extractors below.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{FromRequestParts, OriginalUri, Request, State};
use axum::http::{header, request::Parts, Extensions, HeaderMap, Method, Uri};
use axum::middleware::Next;
use axum::response::Response;
use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::forum::{duration_millis, Clock, Timestamp};
use crate::models::User;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "forum_session";

/// Sessions unused for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Server side state of one logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
    pub last_page: Option<String>,
    pub last_used: Timestamp,
}

impl SessionRecord {
    fn is_expired(&self, now: Timestamp, idle: Timestamp) -> bool {
        now.saturating_sub(self.last_used) > idle
    }
}

/// In-memory session store. Lost on restart, like the activity map.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user_id` and return its token.
    pub fn create(&self, user_id: &str, now: Timestamp) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.lock().insert(
            token.clone(),
            SessionRecord {
                user_id: user_id.to_string(),
                last_page: None,
                last_used: now,
            },
        );
        token
    }

    /// Look a session up and mark it used at `now`. An expired session is
    /// dropped on the spot.
    pub fn get(&self, token: &str, now: Timestamp) -> Option<SessionRecord> {
        let idle = duration_millis(SESSION_IDLE_TIMEOUT);
        let mut sessions = self.lock();
        if sessions.get(token)?.is_expired(now, idle) {
            sessions.remove(token);
            return None;
        }
        let record = sessions.get_mut(token)?;
        record.last_used = record.last_used.max(now);
        Some(record.clone())
    }

    pub fn set_last_page(&self, token: &str, page: &str) {
        if let Some(record) = self.lock().get_mut(token) {
            record.last_page = Some(page.to_string());
        }
    }

    pub fn destroy(&self, token: &str) -> Option<SessionRecord> {
        self.lock().remove(token)
    }

    /// Drop every session unused for longer than `idle`; returns how many.
    pub fn sweep(&self, now: Timestamp, idle: Duration) -> usize {
        let idle = duration_millis(idle);
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now, idle));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sweep idle sessions every `period` until the runtime shuts down.
pub fn spawn_session_sweeper(
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = store.sweep(clock.now(), SESSION_IDLE_TIMEOUT);
            if evicted > 0 {
                tracing::debug!(
                    "Session sweep dropped {} idle sessions, {} left",
                    evicted,
                    store.len()
                );
            }
        }
    })
}

/// `Set-Cookie` value opening a session.
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Find the session token among the request's `Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Per-request view of the caller's session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub last_page: Option<String>,
}

impl Session {
    fn from_parts(parts: &Parts, store: &SessionStore, now: Timestamp) -> Self {
        let Some(token) = session_token(&parts.headers) else {
            return Self::default();
        };

        match store.get(&token, now) {
            Some(record) => Self {
                token: Some(token),
                user_id: Some(record.user_id),
                last_page: record.last_page,
            },
            // Unknown or expired token: treat as anonymous.
            None => Self::default(),
        }
    }

    pub fn is_logged(&self) -> bool {
        self.user_id.is_some()
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::from_parts(parts, &state.sessions, state.clock.now()))
    }
}

/// A logged-in caller whose user record was found.
///
/// Extracting it counts as activity for the activity tracker.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_parts(parts, &state.sessions, state.clock.now());
        let path = request_path(&parts.uri, &parts.extensions);

        let (Some(token), Some(user_id)) = (session.token.as_deref(), session.user_id.as_deref())
        else {
            return Err(AppError::Unauthorized {
                message: "Login required".to_string(),
                redirect: Some(format!("/login?redirect={}", path)),
            });
        };

        let Some(user) = state.repo.get_user(user_id).await? else {
            tracing::error!("Session {} points at missing user {}", token, user_id);
            return Err(AppError::Internal("Internal error!".to_string()));
        };

        state.activity.record(&user.id);

        Ok(AuthUser { user, session })
    }
}

/// Path as the client sent it, before `Router::nest` stripped any prefix.
fn request_path(uri: &Uri, extensions: &Extensions) -> String {
    extensions
        .get::<OriginalUri>()
        .map(|original| original.0.path().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Middleware remembering the last page a logged-in client viewed.
pub async fn track_last_page(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::GET {
        if let Some(token) = session_token(request.headers()) {
            let path = request_path(request.uri(), request.extensions());
            state.sessions.set_last_page(&token, &path);
        }
    }
    next.run(request).await
}

/// Where to send the client after login: the caller's `redirect` when it
/// looks like a route, otherwise `default_route`.
pub fn turn_around(redirect: Option<&str>, default_route: &str) -> String {
    match redirect {
        Some(target) if target.chars().count() > 2 => target.to_string(),
        _ => default_route.to_string(),
    }
}
