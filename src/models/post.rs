//! Post, thread and page models.

use serde::{Deserialize, Serialize};

use crate::forum::Pagination;

/// A post as stored in the database. Threads are posts without a parent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub date: i64,
}

/// Request body for creating a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Request body for replying to a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplyRequest {
    #[serde(default)]
    pub content: String,
}

/// Thread list entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub date: i64,
    /// Latest date anywhere in the thread
    pub last_activity: i64,
    pub replies: usize,
}

/// A reply with its nesting level below the viewed post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    #[serde(flatten)]
    pub post: Post,
    pub depth: usize,
}

/// A post with all of its replies in reading order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostThread {
    pub post: Post,
    /// Id of the thread this post belongs to
    pub thread_id: String,
    pub last_activity: i64,
    pub replies: Vec<ReplyView>,
}

/// Query string for paginated lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Zero-based; anything unparsable is treated as the first page.
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn index(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// One page of a list plus navigation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub index: i64,
    pub last_index: i64,
    pub next: bool,
    pub prev: bool,
    pub active: bool,
    pub page_count: usize,
    pub total: usize,
}

impl<T: Serialize + Clone> From<Pagination<'_, T>> for Page<T> {
    fn from(p: Pagination<'_, T>) -> Self {
        Self {
            items: p.page.to_vec(),
            index: p.index,
            last_index: p.last_index,
            next: p.next,
            prev: p.prev,
            active: p.active,
            page_count: p.page_count(),
            total: p.items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::paginate;

    #[test]
    fn test_page_query_index() {
        let query = |page: Option<&str>| PageQuery {
            page: page.map(str::to_string),
        };
        assert_eq!(query(None).index(), 0);
        assert_eq!(query(Some("2")).index(), 2);
        assert_eq!(query(Some(" 3 ")).index(), 3);
        assert_eq!(query(Some("-1")).index(), -1);
        assert_eq!(query(Some("abc")).index(), 0);
    }

    #[test]
    fn test_page_from_pagination() {
        let items: Vec<u32> = (0..8).collect();
        let page: Page<u32> = paginate(&items, 1).into();

        assert_eq!(page.items, vec![6, 7]);
        assert_eq!(page.total, 8);
        assert_eq!(page.page_count, 2);
        assert_eq!(page.last_index, 1);
        assert!(page.prev);
        assert!(!page.next);
        assert!(page.active);
    }
}
