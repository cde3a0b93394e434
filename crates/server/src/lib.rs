// Library crate: the bookmark service router, shared by the binary and by
// client tests that need a live server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod routes;
pub mod storage;

pub use storage::BookmarkDb;

/// All bookmark service routes over `db`
pub fn router(db: BookmarkDb) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/bookmarks",
            post(routes::add_bookmark).delete(routes::remove_bookmark),
        )
        .route("/api/bookmarks/get", get(routes::list_bookmarks))
        .layer(CorsLayer::permissive())
        .with_state(db)
}

/// Serve the bookmark routes on `listener` until the server fails
pub async fn serve(listener: tokio::net::TcpListener, db: BookmarkDb) -> std::io::Result<()> {
    axum::serve(listener, router(db)).await
}
