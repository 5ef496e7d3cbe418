//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one spawned task per connection, manual
//! match-based routing.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::content::{BoardService, CommentService, PinService};
use crate::db::schemas::UserDoc;
use crate::db::{MongoCollection, Stores};
use crate::notify::NotificationGateway;
use crate::realtime::{self, NotificationHub};
use crate::routes;
use crate::social::{EngagementService, FollowService};
use crate::types::PinboardError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub jwt: JwtValidator,
    /// Realtime delivery hub, injected into the notification gateway
    pub hub: Arc<NotificationHub>,
    pub users: MongoCollection<UserDoc>,
    /// Notification persistence gateway
    pub notifications: Arc<NotificationGateway>,
    pub follows: FollowService,
    pub engagement: EngagementService,
    pub pins: PinService,
    pub boards: BoardService,
    pub comments: CommentService,
}

impl AppState {
    /// Wire up services over the opened collections.
    ///
    /// The hub handle flows from here into the gateway and from the gateway
    /// to every trigger site; nothing reaches for a process-wide global.
    pub fn new(args: Args, stores: Stores) -> Self {
        let jwt = JwtValidator::new(&args.jwt_secret(), args.jwt_expiry_seconds);
        let hub = Arc::new(NotificationHub::new(args.stream_max_clients));

        let notifications = Arc::new(NotificationGateway::new(
            stores.notifications.clone(),
            stores.users.clone(),
            Arc::clone(&hub),
        ));

        let follows = FollowService::new(
            stores.follows.clone(),
            stores.users.clone(),
            Arc::clone(&notifications),
        );
        let engagement = EngagementService::new(
            stores.pins.clone(),
            stores.users.clone(),
            Arc::clone(&notifications),
        );
        let pins = PinService::new(
            stores.pins.clone(),
            stores.boards.clone(),
            stores.users.clone(),
        );
        let boards = BoardService::new(stores.boards.clone(), stores.pins.clone());
        let comments = CommentService::new(
            stores.comments.clone(),
            stores.pins.clone(),
            stores.users.clone(),
            Arc::clone(&notifications),
        );

        Self {
            args,
            jwt,
            hub,
            users: stores.users,
            notifications,
            follows,
            engagement,
            pins,
            boards,
            comments,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), PinboardError> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| PinboardError::Http(format!("Failed to bind {}: {}", state.args.listen, e)))?;

    info!(
        "pinboard listening on {} as node {}",
        state.args.listen, state.args.node_id
    );
    info!(
        "Notification stream enabled at /notifications/stream (max {} clients)",
        state.args.stream_max_clients
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .with_upgrades()
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    // Notification stream WebSocket upgrade consumes the request early
    if method == Method::GET && path == "/notifications/stream" {
        let hub = Arc::clone(&state.hub);
        return Ok(to_boxed(
            realtime::handle_stream_upgrade(hub, &state.jwt, req).await,
        ));
    }

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // ====================================================================
        // Follow graph
        // ====================================================================
        (Method::GET, p) if p.starts_with("/follow/") && p.ends_with("/followers") => {
            let id = p
                .strip_prefix("/follow/")
                .and_then(|s| s.strip_suffix("/followers"))
                .unwrap_or("");
            routes::handle_followers(Arc::clone(&state), id).await
        }
        (Method::GET, p) if p.starts_with("/follow/") && p.ends_with("/following") => {
            let id = p
                .strip_prefix("/follow/")
                .and_then(|s| s.strip_suffix("/following"))
                .unwrap_or("");
            routes::handle_following(Arc::clone(&state), id).await
        }
        (Method::POST, p) if p.starts_with("/follow/") => {
            let id = p.strip_prefix("/follow/").unwrap_or("");
            if id.is_empty() || id.contains('/') {
                not_found_response(p)
            } else {
                let id = id.to_string();
                routes::handle_follow_toggle(Arc::clone(&state), req, &id).await
            }
        }

        // ====================================================================
        // Likes and saves
        // ====================================================================
        (Method::POST, p) if p.starts_with("/like/") => {
            let id = p.strip_prefix("/like/").unwrap_or("").to_string();
            routes::handle_like(Arc::clone(&state), req, &id).await
        }
        (Method::POST, p) if p.starts_with("/unlike/") => {
            let id = p.strip_prefix("/unlike/").unwrap_or("").to_string();
            routes::handle_unlike(Arc::clone(&state), req, &id).await
        }
        (Method::POST, p) if p.starts_with("/save/") => {
            let id = p.strip_prefix("/save/").unwrap_or("").to_string();
            routes::handle_save(Arc::clone(&state), req, &id).await
        }
        (Method::POST, p) if p.starts_with("/unsave/") => {
            let id = p.strip_prefix("/unsave/").unwrap_or("").to_string();
            routes::handle_unsave(Arc::clone(&state), req, &id).await
        }

        // ====================================================================
        // Notifications
        // ====================================================================
        (Method::GET, "/notifications") => {
            routes::handle_notification_list(Arc::clone(&state), req).await
        }
        (Method::PUT, "/notifications/read") => {
            routes::handle_notifications_read(Arc::clone(&state), req).await
        }
        (Method::GET, "/notifications/count") => {
            routes::handle_notification_count(Arc::clone(&state), req).await
        }
        (Method::DELETE, p) if p.starts_with("/notifications/") => {
            let id = p.strip_prefix("/notifications/").unwrap_or("").to_string();
            routes::handle_notification_delete(Arc::clone(&state), req, &id).await
        }

        // ====================================================================
        // Content
        // ====================================================================
        (_, p) if p == "/pins" || p.starts_with("/pins/") => {
            let p = p.to_string();
            routes::handle_pin_request(Arc::clone(&state), req, &p).await
        }
        (_, p) if p == "/boards" || p.starts_with("/boards/") => {
            let p = p.to_string();
            routes::handle_board_request(Arc::clone(&state), req, &p).await
        }
        (_, p) if p == "/comments" || p.starts_with("/comments/") => {
            let p = p.to_string();
            routes::handle_comment_request(Arc::clone(&state), req, &p).await
        }

        // Public user profile
        (Method::GET, p) if p.starts_with("/users/") => {
            let id = p.strip_prefix("/users/").unwrap_or("");
            routes::handle_user_profile(Arc::clone(&state), id).await
        }

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Max-Age", "86400")
        .body(routes::empty_body())
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<BoxBody> {
    let body = serde_json::json!({
        "message": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(routes::full_body(body.to_string()))
        .unwrap()
}
