//! Real-time notification delivery
//!
//! Clients open a WebSocket at `GET /notifications/stream` and receive a push
//! for every notification created for them while connected. The connection is
//! long-lived and independent of the request/response cycle; a user with no
//! connection simply misses the push and reads the notification later via the
//! list endpoint.
//!
//! Messages (server -> client):
//! - `{"event": "notification", "payload": {"type": "new_notification", "data": {...}}}`
//!
//! Messages (client -> server): anything but Close/Ping is ignored.

pub mod hub;

pub use hub::NotificationHub;

use bson::oid::ObjectId;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::auth::{extract_token_from_header, JwtValidator};

/// WebSocket type after upgrade
type HyperWebSocket =
    hyper_tungstenite::WebSocketStream<hyper_util::rt::TokioIo<hyper::upgrade::Upgraded>>;

/// Handle WebSocket upgrade for the notification stream.
///
/// The token comes from the Authorization header or, for browser WebSocket
/// clients that cannot set headers, a `?token=` query parameter.
pub async fn handle_stream_upgrade(
    hub: Arc<NotificationHub>,
    jwt: &JwtValidator,
    req: Request<hyper::body::Incoming>,
) -> Response<Full<Bytes>> {
    let token = bearer_or_query_token(&req);

    let user = match token.as_deref().map(|t| jwt.verify(t)) {
        Some(Ok(user)) => user,
        _ => {
            return error_response(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        }
    };

    if !hyper_tungstenite::is_upgrade_request(&req) {
        return error_response(StatusCode::BAD_REQUEST, "WebSocket upgrade required");
    }

    if hub.is_at_capacity() {
        warn!("Notification stream at capacity, rejecting {}", user.id);
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Server at capacity");
    }

    let (response, websocket) = match hyper_tungstenite::upgrade(req, None) {
        Ok(upgrade) => upgrade,
        Err(e) => {
            warn!("Notification stream upgrade failed: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "WebSocket upgrade failed");
        }
    };

    let user_id = user.id;
    tokio::spawn(async move {
        match websocket.await {
            Ok(ws) => handle_stream_connection(hub, ws, user_id).await,
            Err(e) => warn!("Notification stream connection failed: {}", e),
        }
    });

    response.map(|_| Full::new(Bytes::new()))
}

/// Pump hub pushes into an established stream connection until it closes
async fn handle_stream_connection(hub: Arc<NotificationHub>, ws: HyperWebSocket, user: ObjectId) {
    let (mut sender, mut receiver) = ws.split();
    let (session_id, mut pushes) = hub.join(user);

    info!(user = %user, session = session_id, "notification stream connected");

    loop {
        tokio::select! {
            push = pushes.recv() => {
                match push {
                    Some(text) => {
                        if sender.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Hub dropped the session (pruned on failed publish)
                    None => break,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = sender.send(WsMessage::Pong(data)).await;
                    }
                    Some(Ok(_)) => {
                        // Client-to-server payloads carry no meaning here
                        debug!(user = %user, "ignoring client message on notification stream");
                    }
                    Some(Err(e)) => {
                        warn!(user = %user, "notification stream error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    hub.leave(&user, session_id);
    let _ = sender.close().await;
    info!(user = %user, session = session_id, "notification stream disconnected");
}

/// Token from the Authorization header, falling back to `?token=`
fn bearer_or_query_token<B>(req: &Request<B>) -> Option<String> {
    if let Some(header) = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = extract_token_from_header(header) {
            return Some(token.to_string());
        }
    }

    req.uri().query().and_then(|q| {
        q.split('&')
            .find_map(|pair| pair.strip_prefix("token="))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
    })
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "message": message });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(uri: &str, auth: Option<&str>) -> Request<String> {
        let mut builder = Request::builder().uri(uri);
        if let Some(a) = auth {
            builder = builder.header(hyper::header::AUTHORIZATION, a);
        }
        builder.body(String::new()).unwrap()
    }

    #[test]
    fn token_query_parameter_is_found() {
        let req = request_with("/notifications/stream?foo=1&token=abc", None);
        assert_eq!(bearer_or_query_token(&req).as_deref(), Some("abc"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let req = request_with("/notifications/stream?token=", None);
        assert_eq!(bearer_or_query_token(&req), None);
    }

    #[test]
    fn header_token_wins_over_query() {
        let req = request_with("/notifications/stream?token=fromquery", Some("Bearer fromheader"));
        assert_eq!(bearer_or_query_token(&req).as_deref(), Some("fromheader"));
    }
}
