//! Board endpoints
//!
//! - `POST /boards` (auth)
//! - `GET /boards?page&limit` — caller's own boards (auth)
//! - `GET /boards/:id`
//! - `PUT /boards/:id` (auth)
//! - `DELETE /boards/:id` (auth)
//! - `POST /boards/:id/pins/:pinId` (auth)
//! - `DELETE /boards/:id/pins/:pinId` (auth)

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::content::{CreateBoard, UpdateBoard};
use crate::routes::pin_routes::maybe_authenticate;
use crate::routes::{
    authenticate, error_response, json_response, parse_json_body, parse_list_query, parse_path_id,
    result_response, BoxBody,
};
use crate::server::AppState;
use crate::types::PinboardError;

/// Route any request under `/boards`
pub async fn handle_board_request(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    path: &str,
) -> Response<BoxBody> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (req.method().clone(), segments.as_slice()) {
        (Method::POST, ["boards"]) => create_board(state, req).await,
        (Method::GET, ["boards"]) => list_boards(state, req).await,
        (Method::GET, ["boards", id]) => get_board(state, req, id).await,
        (Method::PUT, ["boards", id]) => update_board(state, req, id).await,
        (Method::DELETE, ["boards", id]) => delete_board(state, req, id).await,
        (Method::POST, ["boards", id, "pins", pin_id]) => {
            board_pin(state, req, id, pin_id, true).await
        }
        (Method::DELETE, ["boards", id, "pins", pin_id]) => {
            board_pin(state, req, id, pin_id, false).await
        }
        _ => error_response(&PinboardError::not_found("Route")),
    }
}

async fn create_board(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let body: CreateBoard = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state.boards.create(user.id, body).await {
        Ok(view) => json_response(StatusCode::CREATED, &view),
        Err(e) => error_response(&e),
    }
}

async fn list_boards(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let query = parse_list_query(req.uri().query());
    let limit = state.args.clamp_limit(query.limit);
    let page = query.page.unwrap_or(1);

    result_response(state.boards.list_for_owner(user.id, page, limit).await)
}

async fn get_board(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let viewer = maybe_authenticate(&state, &req).map(|u| u.id);

    match parse_path_id(raw_id) {
        Ok(id) => result_response(state.boards.get(id, viewer).await),
        Err(e) => error_response(&e),
    }
}

async fn update_board(
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

    let body: UpdateBoard = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    result_response(state.boards.update(user.id, id, body).await)
}

async fn delete_board(
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

    match state.boards.delete(user.id, id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "message": "Board deleted successfully" }),
        ),
        Err(e) => error_response(&e),
    }
}

async fn board_pin(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_board: &str,
    raw_pin: &str,
    add: bool,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let board = match parse_path_id(raw_board) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };
    let pin = match parse_path_id(raw_pin) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    let result = if add {
        state.boards.add_pin(user.id, board, pin).await
    } else {
        state.boards.remove_pin(user.id, board, pin).await
    };

    result_response(result)
}
