//! Configuration module for the forum backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Salt used when `FORUM_HASH_SALT` is not set. Fine for development only.
pub const DEFAULT_HASH_SALT: &str = "forum-development-salt";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for the admin API (admin routes refuse all calls without it)
    pub admin_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Salt fed to Argon2 for every password hash
    pub hash_salt: String,
    /// Usernames flagged as administrators
    pub administrators: Vec<String>,
    /// Display name of the board
    pub site_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_psk = env::var("FORUM_ADMIN_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("FORUM_DB_PATH")
            .unwrap_or_else(|_| "./data/forum.sqlite".to_string())
            .into();

        let bind_addr = env::var("FORUM_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:2834".to_string())
            .parse()
            .expect("Invalid FORUM_BIND_ADDR format");

        let log_level = env::var("FORUM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let hash_salt =
            env::var("FORUM_HASH_SALT").unwrap_or_else(|_| DEFAULT_HASH_SALT.to_string());

        let administrators = parse_administrators(
            &env::var("FORUM_ADMINISTRATORS").unwrap_or_default(),
        );

        let site_name = env::var("FORUM_SITE_NAME").unwrap_or_else(|_| "Forॐ".to_string());

        Self {
            admin_psk,
            db_path,
            bind_addr,
            log_level,
            hash_salt,
            administrators,
            site_name,
        }
    }

    pub fn is_administrator(&self, username: &str) -> bool {
        self.administrators.iter().any(|name| name == username)
    }
}

/// Split a comma separated list, dropping blanks and duplicates.
fn parse_administrators(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
