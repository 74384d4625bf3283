//! Forum Backend
//!
//! A threaded discussion board served as a JSON API over SQLite, with
//! in-memory sessions and activity tracking.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod forum;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{spawn_session_sweeper, SessionStore};
use config::Config;
use db::Repository;
use forum::{spawn_sweeper, ActivityTracker, Clock, SystemClock, SESSION_TTL};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub activity: Arc<ActivityTracker>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Fresh state: no sessions, no activity.
    pub fn new(repo: Repository, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            activity: Arc::new(ActivityTracker::new(clock.clone())),
            clock,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting {} backend", config.site_name);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Administrators: {:?}", config.administrators);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (FORUM_ADMIN_PSK). Admin API is disabled!");
    }
    if config.hash_salt == crate::config::DEFAULT_HASH_SALT {
        tracing::warn!("Using the default password salt. Set FORUM_HASH_SALT in production!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(repo, config.clone(), clock);

    // Evict stale activity records and idle sessions every TTL
    let sweeper = spawn_sweeper(state.activity.clone(), SESSION_TTL);
    let session_sweeper =
        spawn_session_sweeper(state.sessions.clone(), state.clock.clone(), SESSION_TTL);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    session_sweeper.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the admin layer
    let psk = state.config.admin_psk.clone();

    let admin_routes = Router::new()
        .route("/activity", get(api::list_activity))
        .route("/activity/sweep", post(api::sweep_activity))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_psk_layer(psk.clone(), req, next)
        }));

    // Browsable pages; GETs here update the session's last page
    let page_routes = Router::new()
        // Threads and posts
        .route("/threads", get(api::list_threads).post(api::create_thread))
        .route("/posts/{id}", get(api::get_post))
        .route("/posts/{id}/replies", post(api::create_reply))
        // Users
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}/posts", get(api::list_user_posts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::track_last_page,
        ));

    // API routes
    let api_routes = Router::new()
        // Account
        .route("/register", post(api::register))
        .route("/login", post(api::login))
        .route("/logout", post(api::logout))
        .route("/session", get(api::get_session))
        .route("/online", get(api::online_count))
        .merge(page_routes)
        .nest("/admin", admin_routes);

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
