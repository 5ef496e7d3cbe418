//! HTTP routes for pinboard
//!
//! Thin hyper handlers: parse, authenticate, call the service, shape the
//! JSON. Business decisions live in the service modules.

pub mod board_routes;
pub mod comment_routes;
pub mod engagement_routes;
pub mod follow_routes;
pub mod health;
pub mod notification_routes;
pub mod pin_routes;
pub mod user_routes;

pub use board_routes::handle_board_request;
pub use comment_routes::handle_comment_request;
pub use engagement_routes::{
    handle_like, handle_likes_list, handle_save, handle_unlike, handle_unsave,
};
pub use follow_routes::{handle_follow_toggle, handle_followers, handle_following};
pub use health::{health_check, version_info};
pub use notification_routes::{
    handle_notification_count, handle_notification_delete, handle_notification_list,
    handle_notifications_read,
};
pub use pin_routes::handle_pin_request;
pub use user_routes::handle_user_profile;

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::auth::{extract_token_from_header, AuthUser};
use crate::server::AppState;
use crate::types::{PinboardError, Result};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

// =============================================================================
// Response helpers
// =============================================================================

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// Map a service error to its HTTP response; 5xx detail goes to the log only
pub fn error_response(err: &PinboardError) -> Response<BoxBody> {
    if matches!(err, PinboardError::Database(_) | PinboardError::Http(_)) {
        error!("Internal error: {}", err);
    }
    json_response(err.status(), &err.body())
}

/// Fold a service result into a 200 response
pub fn result_response<T: Serialize>(result: Result<T>) -> Response<BoxBody> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => error_response(&e),
    }
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

// =============================================================================
// Request helpers
// =============================================================================

/// Read and parse a JSON request body, capped at 64 KiB
pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T> {
    let body = req
        .collect()
        .await
        .map_err(|e| PinboardError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 65536 {
        return Err(PinboardError::validation("body", "Request body too large"));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| PinboardError::validation("body", format!("Invalid JSON: {}", e)))
}

/// Resolve the authenticated user from the Authorization header
pub fn authenticate<B>(state: &Arc<AppState>, req: &Request<B>) -> Result<AuthUser> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PinboardError::Auth("Missing Authorization header".into()))?;

    let token = extract_token_from_header(header)
        .ok_or_else(|| PinboardError::Auth("Invalid Authorization header".into()))?;

    state.jwt.verify(token)
}

/// Parse an ObjectId path segment
pub fn parse_path_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| PinboardError::validation("id", "Invalid id format"))
}

/// Pagination and filter query parameters
#[derive(Debug, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub unread_only: bool,
    pub owner: Option<String>,
    pub board: Option<String>,
}

/// Parse the query string of a list endpoint
pub fn parse_list_query(query: Option<&str>) -> ListQuery {
    let mut out = ListQuery::default();

    let Some(query) = query else {
        return out;
    };

    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");

        match key {
            "page" => out.page = value.parse().ok(),
            "limit" => out.limit = value.parse().ok(),
            "unreadOnly" => out.unread_only = value == "true" || value == "1",
            "owner" => out.owner = Some(value.to_string()),
            "board" => out.board = Some(value.to_string()),
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        assert_eq!(parse_list_query(None), ListQuery::default());
        assert_eq!(parse_list_query(Some("")), ListQuery::default());
    }

    #[test]
    fn list_query_parses_fields() {
        let q = parse_list_query(Some("page=3&limit=10&unreadOnly=true"));
        assert_eq!(q.page, Some(3));
        assert_eq!(q.limit, Some(10));
        assert!(q.unread_only);
    }

    #[test]
    fn list_query_ignores_garbage() {
        let q = parse_list_query(Some("page=abc&unknown=1&unreadOnly=false"));
        assert_eq!(q.page, None);
        assert!(!q.unread_only);
    }

    #[test]
    fn path_id_parsing() {
        let id = ObjectId::new();
        assert_eq!(parse_path_id(&id.to_hex()).unwrap(), id);
        assert!(parse_path_id("nope").is_err());
    }
}
