//! Notification persistence gateway
//!
//! Creates and reads notification documents and pushes fresh ones over the
//! delivery hub. Creation and delivery are side effects of a primary action
//! (a like, a follow): failures on this path are logged and swallowed so the
//! primary action never rolls back because of them.

use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::schemas::{NotificationDoc, UserDoc, UserSummary};
use crate::db::MongoCollection;
use crate::notify::event::{translate, CreateNotification, NotificationEvent, NotificationKind};
use crate::realtime::NotificationHub;
use crate::types::{PinboardError, Result};

/// Notification as returned to clients and pushed over the stream
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    /// Sender display fields, populated at read/delivery time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_pin: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_board: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_comment: Option<ObjectId>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NotificationView {
    fn from_doc(doc: &NotificationDoc, sender: Option<UserSummary>) -> Self {
        Self {
            id: doc._id.unwrap_or_default(),
            kind: doc.kind,
            message: doc.message.clone(),
            sender,
            related_pin: doc.related_pin,
            related_board: doc.related_board,
            related_comment: doc.related_comment,
            is_read: doc.is_read,
            created_at: doc.metadata.created_at.map(|d| d.to_chrono()),
        }
    }
}

/// Paginated listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<NotificationView>,
    pub pagination: Pagination,
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

pub struct NotificationGateway {
    notifications: MongoCollection<NotificationDoc>,
    users: MongoCollection<UserDoc>,
    hub: Arc<NotificationHub>,
}

impl NotificationGateway {
    pub fn new(
        notifications: MongoCollection<NotificationDoc>,
        users: MongoCollection<UserDoc>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            notifications,
            users,
            hub,
        }
    }

    /// Translate a domain event, persist the result, and push it to the
    /// recipient's channel. Every failure is absorbed here.
    pub async fn dispatch(&self, event: NotificationEvent) {
        let Some(request) = translate(&event) else {
            return;
        };

        let recipient = request.recipient;
        let Some(view) = self.create(request).await else {
            return;
        };

        let payload = serde_json::json!({
            "type": "new_notification",
            "data": view,
        });
        let reached = self.hub.publish(&recipient, "notification", payload);
        debug!(recipient = %recipient, sessions = reached, "notification pushed");
    }

    /// Persist a notification and populate sender display fields for
    /// immediate delivery. Logs and returns None on failure instead of
    /// propagating: the triggering business action must still succeed.
    pub async fn create(&self, request: CreateNotification) -> Option<NotificationView> {
        let mut doc = NotificationDoc {
            _id: None,
            metadata: Default::default(),
            recipient: request.recipient,
            sender: request.sender,
            kind: request.kind,
            message: request.message.to_string(),
            related_pin: request.related_pin,
            related_board: request.related_board,
            related_comment: request.related_comment,
            is_read: false,
        };

        let id = match self.notifications.insert_one(doc.clone()).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to persist notification: {}", e);
                return None;
            }
        };
        doc._id = Some(id);
        doc.metadata.created_at = Some(bson::DateTime::now());

        let sender = match self.users.find_by_id(request.sender).await {
            Ok(Some(user)) => Some(UserSummary::from(&user)),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to populate notification sender: {}", e);
                None
            }
        };

        Some(NotificationView::from_doc(&doc, sender))
    }

    /// Newest-first page of a recipient's notifications
    pub async fn list_for_recipient(
        &self,
        recipient: ObjectId,
        page: u64,
        limit: i64,
        unread_only: bool,
    ) -> Result<NotificationPage> {
        let page = page.max(1);

        let mut filter = doc! { "recipient": recipient };
        if unread_only {
            filter.insert("is_read", false);
        }

        let docs = self
            .notifications
            .find_page(
                filter.clone(),
                doc! { "metadata.created_at": -1 },
                (page - 1) * limit as u64,
                limit,
            )
            .await?;

        let total = self.notifications.count(filter).await?;
        let unread_count = self.count_unread(recipient).await?;

        let senders = self.populate_senders(&docs).await?;
        let notifications = docs
            .iter()
            .map(|d| NotificationView::from_doc(d, senders.get(&d.sender).cloned()))
            .collect();

        Ok(NotificationPage {
            notifications,
            pagination: Pagination {
                current: page,
                pages: total.div_ceil(limit as u64),
                total,
            },
            unread_count,
        })
    }

    /// Mark notifications read. With `ids`, only the matching subset owned by
    /// the recipient is touched; without, all of the recipient's
    /// notifications. Another user's ids never match the recipient filter.
    pub async fn mark_read(
        &self,
        recipient: ObjectId,
        ids: Option<Vec<ObjectId>>,
    ) -> Result<u64> {
        let mut filter = doc! { "recipient": recipient };
        if let Some(ids) = ids {
            filter.insert("_id", doc! { "$in": ids });
        }

        let result = self
            .notifications
            .update_many(filter, doc! { "$set": { "is_read": true } })
            .await?;

        Ok(result.modified_count)
    }

    /// Unread badge count, consistent with mark_read
    pub async fn count_unread(&self, recipient: ObjectId) -> Result<u64> {
        self.notifications
            .count(doc! { "recipient": recipient, "is_read": false })
            .await
    }

    /// Delete one notification, scoped to its recipient
    pub async fn delete(&self, id: ObjectId, recipient: ObjectId) -> Result<()> {
        let result = self
            .notifications
            .delete_one(doc! { "_id": id, "recipient": recipient })
            .await?;

        if result.deleted_count == 0 {
            return Err(PinboardError::not_found("Notification"));
        }
        Ok(())
    }

    /// Batch sender lookup, the document-store rendition of `populate`
    async fn populate_senders(
        &self,
        docs: &[NotificationDoc],
    ) -> Result<HashMap<ObjectId, UserSummary>> {
        let mut ids: Vec<ObjectId> = docs.iter().map(|d| d.sender).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.users.find_many(doc! { "_id": { "$in": ids } }).await?;
        Ok(users
            .iter()
            .filter_map(|u| u._id.map(|id| (id, UserSummary::from(u))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    // Gateway persistence paths require a running MongoDB; the pure pieces it
    // builds on (translator table, hub broadcast, error mapping) are covered
    // in their own modules.
}
