//! Notification production and persistence
//!
//! `event` is the pure domain-event to notification translation; `gateway`
//! persists the results, serves the read side, and hands fresh notifications
//! to the realtime hub.

pub mod event;
pub mod gateway;

pub use event::{translate, CreateNotification, NotificationEvent, NotificationKind};
pub use gateway::{NotificationGateway, NotificationPage, NotificationView, Pagination};
