//! Database repository for users and posts.
//!
//! Uses prepared statements; every write is a single statement.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::forum::{Forest, Timestamp};
use crate::models::{Post, User};

const POST_COLUMNS: &str = "id, parent_id, author_id, title, content, date";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

/// Fields needed to insert a post.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub parent_id: Option<&'a str>,
    pub author_id: &'a str,
    pub title: Option<&'a str>,
    pub content: &'a str,
    pub date: Timestamp,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a user. A taken username surfaces as `AppError::Conflict`.
    pub async fn create_user(&self, username: &str, hash: &str) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (id, username, hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(username)
            .bind(hash)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict(format!("Username {} is already taken", username))
                }
                other => other,
            })?;

        Ok(User {
            id,
            username: username.to_string(),
            hash: hash.to_string(),
            created_at: now,
        })
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, username, hash, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row =
            sqlx::query("SELECT id, username, hash, created_at FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    // ==================== POST OPERATIONS ====================

    /// Insert a post. The caller checks that the parent exists.
    pub async fn create_post(&self, new_post: NewPost<'_>) -> Result<Post, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO posts (id, parent_id, author_id, title, content, date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(new_post.parent_id)
        .bind(new_post.author_id)
        .bind(new_post.title)
        .bind(new_post.content)
        .bind(new_post.date)
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id,
            parent_id: new_post.parent_id.map(str::to_string),
            author_id: new_post.author_id.to_string(),
            title: new_post.title.map(str::to_string),
            content: new_post.content.to_string(),
            date: new_post.date,
        })
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// List all posts in insertion order.
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM posts ORDER BY rowid", POST_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// List a user's posts, newest first.
    pub async fn list_posts_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE author_id = ? ORDER BY date DESC, rowid DESC",
            POST_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// Load every post into a forest.
    pub async fn load_forest(&self) -> Result<Forest<Post>, AppError> {
        let posts = self.list_posts().await?;
        let forest = build_forest(posts);
        tracing::debug!("Loaded {} posts into the forest", forest.len());
        Ok(forest)
    }
}

/// Build a forest from posts listed parents-first. Rows that cannot be
/// attached are logged and skipped.
pub fn build_forest(posts: Vec<Post>) -> Forest<Post> {
    let mut forest = Forest::new();
    for post in posts {
        let id = post.id.clone();
        let parent = post.parent_id.clone();
        let date = post.date;
        if let Err(e) = forest.insert(id, parent.as_deref(), date, post) {
            tracing::warn!("Skipping post while building forest: {}", e);
        }
    }
    forest
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        hash: row.get("hash"),
        created_at: row.get("created_at"),
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        date: row.get("date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    fn post(id: &str, parent: Option<&str>, date: i64) -> Post {
        Post {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            author_id: "u".to_string(),
            title: None,
            content: String::new(),
            date,
        }
    }

    #[test]
    fn test_build_forest_skips_orphans() {
        let forest = build_forest(vec![
            post("a", None, 1),
            post("orphan", Some("gone"), 2),
            post("a1", Some("a"), 3),
            post("under-orphan", Some("orphan"), 4),
        ]);

        assert_eq!(forest.len(), 2);
        assert!(forest.get("orphan").is_none());
        let below_a: Vec<&str> = forest.descendants("a").iter().map(|n| n.id()).collect();
        assert_eq!(below_a, vec!["a1"]);
    }

    #[tokio::test]
    async fn test_repository_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let user = repo.create_user("alice", "hash").await.unwrap();
        assert!(matches!(
            repo.create_user("alice", "other").await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            repo.get_user_by_username("alice").await.unwrap().unwrap().id,
            user.id
        );

        let thread = repo
            .create_post(NewPost {
                parent_id: None,
                author_id: &user.id,
                title: Some("Hello"),
                content: "first",
                date: 10,
            })
            .await
            .unwrap();
        let reply = repo
            .create_post(NewPost {
                parent_id: Some(thread.id.as_str()),
                author_id: &user.id,
                title: None,
                content: "second",
                date: 20,
            })
            .await
            .unwrap();

        let forest = repo.load_forest().await.unwrap();
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.descendants(&thread.id)[0].id(), reply.id);

        let mine = repo.list_posts_by_author(&user.id).await.unwrap();
        assert_eq!(mine[0].id, reply.id);
        assert_eq!(mine[1].title.as_deref(), Some("Hello"));
    }
}
