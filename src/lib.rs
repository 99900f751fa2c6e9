use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;

use store::Store;

/// Shared application state. The storage backend is the only per-process
/// dependency; the acting user travels through extractors, never globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(account_routes())
        .merge(post_routes())
        .merge(group_routes())
        .merge(comment_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn account_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::{register, token};

    Router::new()
        .route("/register/", post(register::register))
        .route("/api/v1/api-token-auth/", post(token::obtain))
}

fn post_routes() -> Router<AppState> {
    use handlers::posts;

    Router::new()
        .route("/posts/", get(posts::list).post(posts::create))
        .route(
            "/posts/:post_id/",
            get(posts::retrieve)
                .put(posts::update)
                .patch(posts::partial_update)
                .delete(posts::destroy),
        )
}

fn group_routes() -> Router<AppState> {
    use handlers::groups;

    Router::new()
        // Collection POST is a deliberate 405
        .route("/groups/", get(groups::list).post(groups::create_not_allowed))
        .route(
            "/groups/:id/",
            get(groups::retrieve)
                .put(groups::update)
                .patch(groups::partial_update)
                .delete(groups::destroy),
        )
}

fn comment_routes() -> Router<AppState> {
    use handlers::comments;

    Router::new()
        .route(
            "/posts/:post_id/comments/",
            get(comments::list).post(comments::create),
        )
        .route(
            "/posts/:post_id/comments/:id/",
            get(comments::retrieve)
                .put(comments::update)
                .patch(comments::partial_update)
                .delete(comments::destroy),
        )
}
