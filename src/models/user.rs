//! Forum user model.

use serde::{Deserialize, Serialize};

/// A registered user as stored in the database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string
    pub hash: String,
    pub created_at: String,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub created_at: String,
    pub admin: bool,
    pub online: bool,
    /// Last activity in ms, while online
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
}

/// Request body for registration and login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Query string carrying an optional post-login target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectQuery {
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Response body after a successful login or registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub redirect: String,
}

/// State of the caller's session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub logged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<String>,
}

/// One live identity as seen by the activity tracker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub user_id: String,
    pub last_seen: i64,
}

/// Live identity count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineCount {
    pub online: usize,
}

/// Result of a manual sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub evicted: usize,
    pub remaining: usize,
}
