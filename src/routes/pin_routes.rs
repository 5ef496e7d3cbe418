//! Pin endpoints
//!
//! - `POST /pins` (auth)
//! - `GET /pins?owner&board&page&limit`
//! - `GET /pins/:id`
//! - `PUT /pins/:id` (auth)
//! - `DELETE /pins/:id` (auth)
//! - `GET /pins/:id/likes`
//! - `GET /pins/:id/comments?page&limit`

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::content::{CreatePin, UpdatePin};
use crate::routes::{
    authenticate, engagement_routes, error_response, json_response, parse_json_body,
    parse_list_query, parse_path_id, result_response, BoxBody,
};
use crate::server::AppState;
use crate::types::PinboardError;

/// Route any request under `/pins`
pub async fn handle_pin_request(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    path: &str,
) -> Response<BoxBody> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (req.method().clone(), segments.as_slice()) {
        (Method::POST, ["pins"]) => create_pin(state, req).await,
        (Method::GET, ["pins"]) => list_pins(state, req).await,
        (Method::GET, ["pins", id]) => get_pin(state, req, id).await,
        (Method::PUT, ["pins", id]) => update_pin(state, req, id).await,
        (Method::DELETE, ["pins", id]) => delete_pin(state, req, id).await,
        (Method::GET, ["pins", id, "likes"]) => {
            engagement_routes::handle_likes_list(state, id).await
        }
        (Method::GET, ["pins", id, "comments"]) => list_pin_comments(state, req, id).await,
        _ => error_response(&PinboardError::not_found("Route")),
    }
}

async fn create_pin(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let body: CreatePin = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state.pins.create(user.id, body).await {
        Ok(view) => json_response(StatusCode::CREATED, &view),
        Err(e) => error_response(&e),
    }
}

async fn list_pins(state: Arc<AppState>, req: Request<hyper::body::Incoming>) -> Response<BoxBody> {
    let query = parse_list_query(req.uri().query());
    let limit = state.args.clamp_limit(query.limit);
    let page = query.page.unwrap_or(1);

    let owner = match query.owner.as_deref().map(parse_path_id).transpose() {
        Ok(o) => o,
        Err(e) => return error_response(&e),
    };
    let board = match query.board.as_deref().map(parse_path_id).transpose() {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    result_response(state.pins.list(owner, board, page, limit).await)
}

async fn get_pin(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let viewer = maybe_authenticate(&state, &req).map(|u| u.id);

    match parse_path_id(raw_id) {
        Ok(id) => result_response(state.pins.get(id, viewer).await),
        Err(e) => error_response(&e),
    }
}

async fn update_pin(
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

    let body: UpdatePin = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    result_response(state.pins.update(user.id, id, body).await)
}

async fn delete_pin(
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

    match state.pins.delete(user.id, id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "message": "Pin deleted successfully" }),
        ),
        Err(e) => error_response(&e),
    }
}

async fn list_pin_comments(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let query = parse_list_query(req.uri().query());
    let limit = state.args.clamp_limit(query.limit);
    let page = query.page.unwrap_or(1);

    match parse_path_id(raw_id) {
        Ok(id) => result_response(state.comments.list_for_pin(id, page, limit).await),
        Err(e) => error_response(&e),
    }
}

/// Authentication for routes where identity is optional: a missing or bad
/// token degrades to an anonymous viewer instead of a 401.
pub fn maybe_authenticate<B>(state: &Arc<AppState>, req: &Request<B>) -> Option<AuthUser> {
    authenticate(state, req).ok()
}
