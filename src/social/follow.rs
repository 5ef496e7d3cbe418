//! Follow toggle coordinator
//!
//! A follow relationship is one logical fact represented by two documents:
//! the edge in `follows` and the denormalized counters on both users. The
//! writes are sequential and independent; a crash between them leaves a
//! stale counter that the reconciliation job repairs. The edge is the source
//! of truth, so counter write failures degrade the count, never the action.

use bson::doc;
use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{FollowDoc, UserDoc, UserSummary};
use crate::db::MongoCollection;
use crate::notify::{NotificationEvent, NotificationGateway, NotificationKind};
use crate::types::{PinboardError, Result};

/// Outcome of a follow toggle
#[derive(Debug, Serialize)]
pub struct FollowToggle {
    /// True when the toggle ended in the following state
    pub following: bool,
    pub message: &'static str,
}

/// Follower or following listing
#[derive(Debug, Serialize)]
pub struct FollowList {
    pub count: usize,
    pub users: Vec<UserSummary>,
}

pub struct FollowService {
    follows: MongoCollection<FollowDoc>,
    users: MongoCollection<UserDoc>,
    gateway: Arc<NotificationGateway>,
}

impl FollowService {
    pub fn new(
        follows: MongoCollection<FollowDoc>,
        users: MongoCollection<UserDoc>,
        gateway: Arc<NotificationGateway>,
    ) -> Self {
        Self {
            follows,
            users,
            gateway,
        }
    }

    /// Toggle the follow edge from `follower` to `target`.
    ///
    /// Present -> remove, absent -> create; repeating the identical request
    /// flips the state back. A duplicate-key failure on insert means another
    /// request won the race for the same pair; it surfaces as a retry-safe
    /// Conflict rather than a duplicate edge.
    pub async fn toggle(&self, follower: ObjectId, target: ObjectId) -> Result<FollowToggle> {
        if follower == target {
            return Err(PinboardError::validation("id", "You cannot follow yourself"));
        }

        if self.users.find_by_id(target).await?.is_none() {
            return Err(PinboardError::not_found("User"));
        }

        let existing = self
            .follows
            .find_one(doc! { "follower": follower, "following": target })
            .await?;

        match existing {
            Some(edge) => {
                self.follows.delete_one(doc! { "_id": edge._id }).await?;
                self.bump_counters(follower, target, -1).await;

                self.gateway
                    .dispatch(NotificationEvent::new(
                        NotificationKind::UnfollowUser,
                        follower,
                        target,
                    ))
                    .await;

                Ok(FollowToggle {
                    following: false,
                    message: "Unfollowed successfully",
                })
            }
            None => {
                match self.follows.insert_one(FollowDoc::new(follower, target)).await {
                    Ok(_) => {}
                    Err(PinboardError::Conflict(_)) => {
                        // Lost the race to a concurrent identical request; the
                        // unique index kept the pair unique.
                        return Err(PinboardError::Conflict(
                            "Follow state changed concurrently, retry".into(),
                        ));
                    }
                    Err(e) => return Err(e),
                }
                self.bump_counters(follower, target, 1).await;

                self.gateway
                    .dispatch(NotificationEvent::new(
                        NotificationKind::FollowUser,
                        follower,
                        target,
                    ))
                    .await;

                Ok(FollowToggle {
                    following: true,
                    message: "Followed successfully",
                })
            }
        }
    }

    /// Users following `user`
    pub async fn followers(&self, user: ObjectId) -> Result<FollowList> {
        let edges = self.follows.find_many(doc! { "following": user }).await?;
        let ids: Vec<ObjectId> = edges.iter().map(|e| e.follower).collect();
        let users = self.summaries(ids).await?;
        Ok(FollowList {
            count: users.len(),
            users,
        })
    }

    /// Users `user` is following
    pub async fn following(&self, user: ObjectId) -> Result<FollowList> {
        let edges = self.follows.find_many(doc! { "follower": user }).await?;
        let ids: Vec<ObjectId> = edges.iter().map(|e| e.following).collect();
        let users = self.summaries(ids).await?;
        Ok(FollowList {
            count: users.len(),
            users,
        })
    }

    /// Atomic counter bumps on both sides of the edge. Failures are logged,
    /// not propagated; the reconciliation job converges the counters.
    async fn bump_counters(&self, follower: ObjectId, target: ObjectId, delta: i64) {
        if let Err(e) = self
            .users
            .inc_one(doc! { "_id": target }, "follower_count", delta)
            .await
        {
            warn!(user = %target, "follower_count update failed: {}", e);
        }

        if let Err(e) = self
            .users
            .inc_one(doc! { "_id": follower }, "following_count", delta)
            .await
        {
            warn!(user = %follower, "following_count update failed: {}", e);
        }
    }

    async fn summaries(&self, ids: Vec<ObjectId>) -> Result<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.users.find_many(doc! { "_id": { "$in": ids } }).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}
