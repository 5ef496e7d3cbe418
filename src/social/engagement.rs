//! Like and save dual-write coordinators
//!
//! Both relationships mirror a set across two documents: `pin.likers` with
//! `user.liked_pins`, and `pin.saved_by` with `user.saved_pins`. The two
//! writes are separate; the pin side is authoritative and goes first, so a
//! failure after it leaves a divergence the next toggle of the pair repairs.
//!
//! Contract: the strict variant. Liking an already-liked pin (or unliking a
//! not-liked one) is a 400, not a toggle. `$addToSet`/`$pull` keep the sets
//! duplicate-free regardless of what races reach the store.

use bson::doc;
use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{PinDoc, UserDoc, UserSummary};
use crate::db::MongoCollection;
use crate::notify::{NotificationEvent, NotificationGateway, NotificationKind};
use crate::types::{PinboardError, Result};

/// Outcome of a like/save mutation
#[derive(Debug, Serialize)]
pub struct EngagementOutcome {
    pub message: &'static str,
}

/// Likers listing for a pin
#[derive(Debug, Serialize)]
pub struct LikeList {
    pub count: usize,
    pub likers: Vec<UserSummary>,
}

pub struct EngagementService {
    pins: MongoCollection<PinDoc>,
    users: MongoCollection<UserDoc>,
    gateway: Arc<NotificationGateway>,
}

impl EngagementService {
    pub fn new(
        pins: MongoCollection<PinDoc>,
        users: MongoCollection<UserDoc>,
        gateway: Arc<NotificationGateway>,
    ) -> Self {
        Self {
            pins,
            users,
            gateway,
        }
    }

    pub async fn like(&self, actor: ObjectId, pin_id: ObjectId) -> Result<EngagementOutcome> {
        let pin = self.require_pin(pin_id).await?;

        if pin.liked_by(&actor) {
            return Err(PinboardError::validation("id", "Pin already liked"));
        }

        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$addToSet": { "likers": actor } })
            .await?;
        self.mirror_user_set(actor, "liked_pins", pin_id, true).await;

        self.gateway
            .dispatch(
                NotificationEvent::new(NotificationKind::LikePin, actor, pin.owner)
                    .with_pin(pin_id),
            )
            .await;

        Ok(EngagementOutcome {
            message: "Liked successfully",
        })
    }

    pub async fn unlike(&self, actor: ObjectId, pin_id: ObjectId) -> Result<EngagementOutcome> {
        let pin = self.require_pin(pin_id).await?;

        if !pin.liked_by(&actor) {
            return Err(PinboardError::validation("id", "Pin not liked"));
        }

        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$pull": { "likers": actor } })
            .await?;
        self.mirror_user_set(actor, "liked_pins", pin_id, false).await;

        self.gateway
            .dispatch(
                NotificationEvent::new(NotificationKind::UnlikePin, actor, pin.owner)
                    .with_pin(pin_id),
            )
            .await;

        Ok(EngagementOutcome {
            message: "Unliked successfully",
        })
    }

    pub async fn save(&self, actor: ObjectId, pin_id: ObjectId) -> Result<EngagementOutcome> {
        let pin = self.require_pin(pin_id).await?;

        if pin.saved_by_user(&actor) {
            return Err(PinboardError::validation("id", "Pin already saved"));
        }

        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$addToSet": { "saved_by": actor } })
            .await?;
        self.mirror_user_set(actor, "saved_pins", pin_id, true).await;

        self.gateway
            .dispatch(
                NotificationEvent::new(NotificationKind::SavePin, actor, pin.owner)
                    .with_pin(pin_id),
            )
            .await;

        Ok(EngagementOutcome {
            message: "Saved successfully",
        })
    }

    pub async fn unsave(&self, actor: ObjectId, pin_id: ObjectId) -> Result<EngagementOutcome> {
        let pin = self.require_pin(pin_id).await?;

        if !pin.saved_by_user(&actor) {
            return Err(PinboardError::validation("id", "Pin not saved"));
        }

        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$pull": { "saved_by": actor } })
            .await?;
        self.mirror_user_set(actor, "saved_pins", pin_id, false).await;

        self.gateway
            .dispatch(
                NotificationEvent::new(NotificationKind::UnsavePin, actor, pin.owner)
                    .with_pin(pin_id),
            )
            .await;

        Ok(EngagementOutcome {
            message: "Unsaved successfully",
        })
    }

    /// Populated likers of a pin
    pub async fn likes(&self, pin_id: ObjectId) -> Result<LikeList> {
        let pin = self.require_pin(pin_id).await?;

        let likers = if pin.likers.is_empty() {
            Vec::new()
        } else {
            self.users
                .find_many(doc! { "_id": { "$in": pin.likers.clone() } })
                .await?
                .iter()
                .map(UserSummary::from)
                .collect()
        };

        Ok(LikeList {
            count: likers.len(),
            likers,
        })
    }

    async fn require_pin(&self, pin_id: ObjectId) -> Result<PinDoc> {
        self.pins
            .find_by_id(pin_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Pin"))
    }

    /// Second half of the dual write: the user-side mirror. Logged, never
    /// propagated; the pin side already committed the action.
    async fn mirror_user_set(&self, user: ObjectId, field: &str, pin: ObjectId, add: bool) {
        let mut members = bson::Document::new();
        members.insert(field, pin);

        let update = if add {
            doc! { "$addToSet": members }
        } else {
            doc! { "$pull": members }
        };

        if let Err(e) = self.users.update_one(doc! { "_id": user }, update).await {
            warn!(user = %user, field, "user mirror update failed: {}", e);
        }
    }
}
