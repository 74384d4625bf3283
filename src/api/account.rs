//! Registration, login and logout endpoints.

use axum::{
    extract::{Query, State},
    http::{header, HeaderName},
    Json,
};

use super::{success, user_profile, ApiResponse, ApiResult};
use crate::auth::{
    clear_session_cookie, hash_password, session_cookie, turn_around, validate_password,
    validate_username, verify_password, verify_unknown_user, AuthUser, Session,
};
use crate::errors::AppError;
use crate::models::{CredentialsRequest, LoginResponse, RedirectQuery, SessionInfo, User};
use crate::AppState;

/// Route the client lands on after logging in when no redirect is given.
const DEFAULT_ROUTE: &str = "/";

type WithCookie<T> = ([(HeaderName, String); 1], ApiResponse<T>);

/// POST /api/register - Create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RedirectQuery>,
    Json(request): Json<CredentialsRequest>,
) -> Result<WithCookie<LoginResponse>, AppError> {
    let username = request.username.trim();
    validate_username(username)?;
    validate_password(&request.password)?;

    let hash = hash_password(&request.password, &state.config.hash_salt)?;
    let user = state.repo.create_user(username, &hash).await?;
    tracing::info!("Registered user {} ({})", user.username, user.id);

    open_session(&state, &session, &user, query.redirect.as_deref())
}

/// POST /api/login - Verify credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RedirectQuery>,
    Json(request): Json<CredentialsRequest>,
) -> Result<WithCookie<LoginResponse>, AppError> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let invalid = || AppError::unauthorized("Invalid username or password");
    let Some(user) = state.repo.get_user_by_username(username).await? else {
        verify_unknown_user(&request.password, &state.config.hash_salt)?;
        tracing::debug!("Rejected login for unknown user {}", username);
        return Err(invalid());
    };
    if !verify_password(&request.password, &user.hash)? {
        tracing::debug!("Rejected login for {}", username);
        return Err(invalid());
    }

    open_session(&state, &session, &user, query.redirect.as_deref())
}

fn open_session(
    state: &AppState,
    previous: &Session,
    user: &User,
    redirect: Option<&str>,
) -> Result<WithCookie<LoginResponse>, AppError> {
    if let Some(token) = previous.token.as_deref() {
        state.sessions.destroy(token);
    }

    let token = state.sessions.create(&user.id, state.clock.now());
    state.activity.record(&user.id);

    let body = LoginResponse {
        user: user_profile(state, user),
        redirect: turn_around(redirect, DEFAULT_ROUTE),
    };
    Ok(([(header::SET_COOKIE, session_cookie(&token))], ApiResponse::new(body)))
}

/// POST /api/logout - Forget the caller's activity and destroy the session.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<WithCookie<SessionInfo>, AppError> {
    state.activity.remove(&auth.user.id);
    if let Some(token) = auth.session.token.as_deref() {
        state.sessions.destroy(token);
    }

    let body = SessionInfo {
        logged: false,
        user_id: None,
        last_page: None,
    };
    Ok(([(header::SET_COOKIE, clear_session_cookie())], ApiResponse::new(body)))
}

/// GET /api/session - Describe the caller's session.
pub async fn get_session(session: Session) -> ApiResult<SessionInfo> {
    success(SessionInfo {
        logged: session.is_logged(),
        user_id: session.user_id,
        last_page: session.last_page,
    })
}
