//! Database schemas for pinboard
//!
//! One MongoDB document structure per collection.

mod board;
mod comment;
mod follow;
mod metadata;
mod notification;
mod pin;
mod user;

pub use board::{BoardDoc, BOARD_COLLECTION, PRIVACY_PRIVATE, PRIVACY_PUBLIC};
pub use comment::{CommentDoc, COMMENT_COLLECTION};
pub use follow::{FollowDoc, FOLLOW_COLLECTION};
pub use metadata::Metadata;
pub use notification::{NotificationDoc, NOTIFICATION_COLLECTION};
pub use pin::{PinDoc, PinMedia, PIN_COLLECTION};
pub use user::{UserDoc, UserSummary, USER_COLLECTION};
