use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::storage::BookmarkDb;
use shared::{BookmarkListResponse, BookmarkRequest, MessageResponse};

type ApiError = (StatusCode, Json<MessageResponse>);

fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
}

fn validate(request: &BookmarkRequest) -> Result<(), ApiError> {
    if request.email.trim().is_empty() || request.book_id.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Missing email or bookId"));
    }
    Ok(())
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Add a bookmark (set semantics)
pub async fn add_bookmark(
    State(db): State<BookmarkDb>,
    Json(request): Json<BookmarkRequest>,
) -> Result<Json<BookmarkListResponse>, ApiError> {
    validate(&request)?;
    let bookmarks = db.add(&request.email, &request.book_id).await;
    tracing::info!("Bookmark added for {}: {}", request.email, request.book_id);
    Ok(Json(BookmarkListResponse {
        message: Some("Bookmark added".to_string()),
        bookmarks,
    }))
}

/// Remove a bookmark
pub async fn remove_bookmark(
    State(db): State<BookmarkDb>,
    Json(request): Json<BookmarkRequest>,
) -> Result<Json<BookmarkListResponse>, ApiError> {
    validate(&request)?;
    let bookmarks = db
        .remove(&request.email, &request.book_id)
        .await
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))?;
    tracing::info!("Bookmark removed for {}: {}", request.email, request.book_id);
    Ok(Json(BookmarkListResponse {
        message: Some("Bookmark removed".to_string()),
        bookmarks,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    email: Option<String>,
}

/// Bookmarks of one account
pub async fn list_bookmarks(
    State(db): State<BookmarkDb>,
    Query(query): Query<ListQuery>,
) -> Result<Json<BookmarkListResponse>, ApiError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Email required"))?;
    let bookmarks = db
        .list(&email)
        .await
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(BookmarkListResponse {
        message: None,
        bookmarks,
    }))
}
