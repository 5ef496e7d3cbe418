//! Notification endpoints
//!
//! - `GET /notifications?page&limit&unreadOnly` (auth)
//! - `PUT /notifications/read` with optional `{"notificationIds": [...]}` (auth)
//! - `GET /notifications/count` (auth)
//! - `DELETE /notifications/:id` (auth)

use bson::oid::ObjectId;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::routes::{
    authenticate, error_response, json_response, parse_list_query, parse_path_id, result_response,
    BoxBody,
};
use crate::server::AppState;
use crate::types::PinboardError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadRequest {
    #[serde(default)]
    notification_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadResponse {
    updated_count: u64,
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountResponse {
    unread_count: u64,
}

/// GET /notifications
pub async fn handle_notification_list(
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

    result_response(
        state
            .notifications
            .list_for_recipient(user.id, page, limit, query.unread_only)
            .await,
    )
}

/// PUT /notifications/read
///
/// Empty body or missing id list marks everything; an explicit list marks
/// only those ids, scoped to the requesting recipient.
pub async fn handle_notifications_read(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let body: MarkReadRequest = match parse_json_body_or_default(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let ids = match body.notification_ids {
        Some(raw_ids) if !raw_ids.is_empty() => {
            let mut ids = Vec::with_capacity(raw_ids.len());
            for raw in &raw_ids {
                match ObjectId::parse_str(raw) {
                    Ok(id) => ids.push(id),
                    Err(_) => {
                        return error_response(&PinboardError::validation(
                            "notificationIds",
                            "Invalid id format",
                        ))
                    }
                }
            }
            Some(ids)
        }
        _ => None,
    };

    match state.notifications.mark_read(user.id, ids).await {
        Ok(updated_count) => json_response(
            StatusCode::OK,
            &MarkReadResponse {
                updated_count,
                message: "Notifications marked as read",
            },
        ),
        Err(e) => error_response(&e),
    }
}

/// GET /notifications/count
pub async fn handle_notification_count(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Response<BoxBody> {
    let user = match authenticate(&state, &req) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    match state.notifications.count_unread(user.id).await {
        Ok(unread_count) => json_response(StatusCode::OK, &CountResponse { unread_count }),
        Err(e) => error_response(&e),
    }
}

/// DELETE /notifications/:id
pub async fn handle_notification_delete(
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

    match state.notifications.delete(id, user.id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "message": "Notification deleted successfully" }),
        ),
        Err(e) => error_response(&e),
    }
}

/// An absent or empty body is a valid "mark all" request
async fn parse_json_body_or_default(
    req: Request<hyper::body::Incoming>,
) -> crate::types::Result<MarkReadRequest> {
    use http_body_util::BodyExt;

    let body = req
        .collect()
        .await
        .map_err(|e| PinboardError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.is_empty() {
        return Ok(MarkReadRequest::default());
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| PinboardError::validation("body", format!("Invalid JSON: {}", e)))
}
