//! Post and reply endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{required_text, success, ApiResult};
use crate::auth::AuthUser;
use crate::db::NewPost;
use crate::errors::AppError;
use crate::forum::recency;
use crate::models::{CreateReplyRequest, Post, PostThread, ReplyView};
use crate::AppState;

/// GET /api/posts/:id - A post with every reply below it, in reading order.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PostThread> {
    let forest = state.repo.load_forest().await?;
    let not_found = || AppError::NotFound(format!("Post {} not found", id));

    let node = forest.get(&id).ok_or_else(not_found)?;
    let root = forest.root_of(&id).ok_or_else(not_found)?;
    let base_depth = forest.depth(&id);

    let replies = forest
        .descendants(&id)
        .into_iter()
        .map(|reply| ReplyView {
            post: reply.data().clone(),
            depth: forest.depth(reply.id()) - base_depth,
        })
        .collect();

    success(PostThread {
        post: node.data().clone(),
        thread_id: root.id().to_string(),
        last_activity: recency(&forest, root),
        replies,
    })
}

/// POST /api/posts/:id/replies - Reply to a post.
pub async fn create_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CreateReplyRequest>,
) -> ApiResult<Post> {
    let content = required_text(&request.content, "Content")?;

    if state.repo.get_post(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    }

    let post = state
        .repo
        .create_post(NewPost {
            parent_id: Some(id.as_str()),
            author_id: &auth.user.id,
            title: None,
            content: &content,
            date: state.clock.now(),
        })
        .await?;

    tracing::info!("User {} replied to {} with {}", auth.user.username, id, post.id);
    success(post)
}
