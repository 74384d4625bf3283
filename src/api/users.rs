//! User profile endpoints.

use axum::extract::{Path, Query, State};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::forum::paginate;
use crate::models::{OnlineCount, Page, PageQuery, Post, User, UserProfile};
use crate::AppState;

/// Public view of `user`, including whether the activity tracker sees it live.
pub fn user_profile(state: &AppState, user: &User) -> UserProfile {
    let last_seen = state.activity.last_seen(&user.id);
    UserProfile {
        id: user.id.clone(),
        username: user.username.clone(),
        created_at: user.created_at.clone(),
        admin: state.config.is_administrator(&user.username),
        online: last_seen.is_some(),
        last_seen,
    }
}

/// GET /api/users/:id - Get a user's public profile.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<UserProfile> {
    match state.repo.get_user(&id).await? {
        Some(user) => success(user_profile(&state, &user)),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

/// GET /api/users/:id/posts - A user's posts, newest first.
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Post>> {
    if state.repo.get_user(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    let posts = state.repo.list_posts_by_author(&id).await?;
    success(paginate(&posts, query.index()).into())
}

/// GET /api/online - Number of identities active within the TTL.
pub async fn online_count(State(state): State<AppState>) -> ApiResult<OnlineCount> {
    success(OnlineCount {
        online: state.activity.len(),
    })
}
