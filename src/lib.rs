//! pinboard - social content-sharing backend
//!
//! Users publish pins onto boards, follow each other, comment, like, and
//! receive notifications, backed by MongoDB and fronted by a REST API with a
//! WebSocket side-channel for real-time notification delivery.
//!
//! ## Services
//!
//! - **Social**: follow/like/save toggles over dual-document relationships
//! - **Notify**: domain-event translation, persistence, and fan-out
//! - **Realtime**: per-user notification stream over WebSocket
//! - **Content**: pin, board, and comment-thread CRUD

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod notify;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod social;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{PinboardError, Result};
