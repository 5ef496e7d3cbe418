//! Like and save endpoints
//!
//! - `POST /like/:id`, `POST /unlike/:id` (auth, strict contract)
//! - `POST /save/:id`, `POST /unsave/:id` (auth, strict contract)
//! - `GET /pins/:id/likes` — public

use bson::oid::ObjectId;
use hyper::{Request, Response};
use std::sync::Arc;

use crate::routes::{authenticate, error_response, parse_path_id, result_response, BoxBody};
use crate::server::AppState;

fn auth_and_id(
    state: &Arc<AppState>,
    req: &Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Result<(ObjectId, ObjectId), Response<BoxBody>> {
    let user = authenticate(state, req).map_err(|e| error_response(&e))?;
    let pin = parse_path_id(raw_id).map_err(|e| error_response(&e))?;
    Ok((user.id, pin))
}

/// POST /like/:id
pub async fn handle_like(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    match auth_and_id(&state, &req, raw_id) {
        Ok((user, pin)) => result_response(state.engagement.like(user, pin).await),
        Err(resp) => resp,
    }
}

/// POST /unlike/:id
pub async fn handle_unlike(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    match auth_and_id(&state, &req, raw_id) {
        Ok((user, pin)) => result_response(state.engagement.unlike(user, pin).await),
        Err(resp) => resp,
    }
}

/// POST /save/:id
pub async fn handle_save(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    match auth_and_id(&state, &req, raw_id) {
        Ok((user, pin)) => result_response(state.engagement.save(user, pin).await),
        Err(resp) => resp,
    }
}

/// POST /unsave/:id
pub async fn handle_unsave(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
    raw_id: &str,
) -> Response<BoxBody> {
    match auth_and_id(&state, &req, raw_id) {
        Ok((user, pin)) => result_response(state.engagement.unsave(user, pin).await),
        Err(resp) => resp,
    }
}

/// GET /pins/:id/likes
pub async fn handle_likes_list(state: Arc<AppState>, raw_id: &str) -> Response<BoxBody> {
    match parse_path_id(raw_id) {
        Ok(pin) => result_response(state.engagement.likes(pin).await),
        Err(e) => error_response(&e),
    }
}
