//! Thread list endpoints.

use axum::{
    extract::{Query, State},
    Json,
};

use super::{required_text, success, ApiResult};
use crate::auth::AuthUser;
use crate::db::NewPost;
use crate::errors::AppError;
use crate::forum::{paginate, rank_by_recency};
use crate::models::{CreateThreadRequest, Page, PageQuery, Post, ThreadSummary};
use crate::AppState;

/// Longest accepted thread title, in chars.
pub const MAX_TITLE_LENGTH: usize = 200;

/// GET /api/threads - Threads ordered by latest activity, one page at a time.
pub async fn list_threads(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<ThreadSummary>> {
    let forest = state.repo.load_forest().await?;

    let summaries: Vec<ThreadSummary> = rank_by_recency(&forest, forest.roots())
        .into_iter()
        .map(|ranked| {
            let post = ranked.node.data();
            ThreadSummary {
                id: post.id.clone(),
                title: post.title.clone().unwrap_or_default(),
                author_id: post.author_id.clone(),
                date: post.date,
                last_activity: ranked.recency,
                replies: forest.descendants(ranked.node.id()).len(),
            }
        })
        .collect();

    success(paginate(&summaries, query.index()).into())
}

/// POST /api/threads - Start a new thread.
pub async fn create_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateThreadRequest>,
) -> ApiResult<Post> {
    let title = required_text(&request.title, "Title")?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title is too long ({} chars max)",
            MAX_TITLE_LENGTH
        )));
    }
    let content = required_text(&request.content, "Content")?;

    let post = state
        .repo
        .create_post(NewPost {
            parent_id: None,
            author_id: &auth.user.id,
            title: Some(title.as_str()),
            content: &content,
            date: state.clock.now(),
        })
        .await?;

    tracing::info!("User {} started thread {}", auth.user.username, post.id);
    success(post)
}
