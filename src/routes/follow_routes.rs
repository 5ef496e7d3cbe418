//! Follow endpoints
//!
//! - `POST /follow/:id` — toggle follow (auth)
//! - `GET /follow/:id/followers` — public
//! - `GET /follow/:id/following` — public

use hyper::{Request, Response};
use std::sync::Arc;

use crate::routes::{authenticate, error_response, parse_path_id, result_response, BoxBody};
use crate::server::AppState;

/// POST /follow/:id
pub async fn handle_follow_toggle(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let target = match parse_path_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    result_response(state.follows.toggle(user.id, target).await)
}

/// GET /follow/:id/followers
pub async fn handle_followers(state: Arc<AppState>, raw_id: &str) -> Response<BoxBody> {
    match parse_path_id(raw_id) {
        Ok(id) => result_response(state.follows.followers(id).await),
        Err(e) => error_response(&e),
    }
}

/// GET /follow/:id/following
pub async fn handle_following(state: Arc<AppState>, raw_id: &str) -> Response<BoxBody> {
    match parse_path_id(raw_id) {
        Ok(id) => result_response(state.follows.following(id).await),
        Err(e) => error_response(&e),
    }
}
