//! Notification document schema
//!
//! Immutable once created except for the `is_read` flip.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::notify::NotificationKind;

/// Collection name for notifications
pub const NOTIFICATION_COLLECTION: &str = "notifications";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NotificationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Who the notification is for
    pub recipient: ObjectId,

    /// Who triggered it. Never equal to recipient.
    pub sender: ObjectId,

    pub kind: NotificationKind,

    /// Fixed per-kind message from the translator table
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_pin: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_board: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_comment: Option<ObjectId>,

    #[serde(default)]
    pub is_read: bool,
}

impl IntoIndexes for NotificationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Newest-first listing per recipient
            (
                doc! { "recipient": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("recipient_created_index".to_string())
                        .build(),
                ),
            ),
            // Unread badge counts
            (
                doc! { "recipient": 1, "is_read": 1 },
                Some(
                    IndexOptions::builder()
                        .name("recipient_read_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for NotificationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
