//! Comment endpoints
//!
//! - `POST /comments` (auth) — top-level comment or reply
//! - `PUT /comments/:id` (auth)
//! - `DELETE /comments/:id` (auth) — removes the whole reply subtree
//! - `POST /comments/:id/like` (auth) — toggle

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::content::{CreateComment, UpdateComment};
use crate::routes::{
    authenticate, error_response, json_response, parse_json_body, parse_path_id, result_response,
    BoxBody,
};
use crate::server::AppState;
use crate::types::PinboardError;

/// Route any request under `/comments`
pub async fn handle_comment_request(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    path: &str,
) -> Response<BoxBody> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (req.method().clone(), segments.as_slice()) {
        (Method::POST, ["comments"]) => create_comment(state, req).await,
        (Method::PUT, ["comments", id]) => update_comment(state, req, id).await,
        (Method::DELETE, ["comments", id]) => delete_comment(state, req, id).await,
        (Method::POST, ["comments", id, "like"]) => toggle_like(state, req, id).await,
        _ => error_response(&PinboardError::not_found("Route")),
    }
}

async fn create_comment(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let body: CreateComment = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state.comments.create(user.id, body).await {
        Ok(view) => json_response(StatusCode::CREATED, &view),
        Err(e) => error_response(&e),
    }
}

async fn update_comment(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let id = match parse_path_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    let body: UpdateComment = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    result_response(state.comments.update(user.id, id, body).await)
}

async fn delete_comment(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let id = match parse_path_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.comments.delete(user.id, id).await {
        Ok(deleted) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "message": "Comment deleted successfully",
                "deletedCount": deleted,
            }),
        ),
        Err(e) => error_response(&e),
    }
}

async fn toggle_like(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let id = match parse_path_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    result_response(state.comments.toggle_like(user.id, id).await)
}
