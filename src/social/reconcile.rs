//! Follower counter reconciliation
//!
//! The denormalized counters on users drift whenever a crash lands between
//! the edge write and the counter write. This job recomputes both counters
//! from the `follows` edge collection, which is the source of truth, and
//! overwrites any divergent value. No locking: a correction racing a live
//! toggle can itself be briefly stale and is fixed on the next pass.

use bson::doc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db::schemas::{FollowDoc, UserDoc};
use crate::db::MongoCollection;
use crate::types::Result;

/// Summary of one reconciliation pass
#[derive(Debug, Default, PartialEq)]
pub struct ReconcileReport {
    pub checked: u64,
    pub corrected: u64,
}

/// Recompute follower/following counters for every user from the edges.
pub async fn reconcile_counters(
    users: &MongoCollection<UserDoc>,
    follows: &MongoCollection<FollowDoc>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    let all_users = users.find_many(doc! {}).await?;

    for user in all_users {
        let Some(id) = user._id else { continue };
        report.checked += 1;

        let follower_count = follows.count(doc! { "following": id }).await? as i64;
        let following_count = follows.count(doc! { "follower": id }).await? as i64;

        if user.follower_count != follower_count || user.following_count != following_count {
            debug!(
                user = %id,
                stored_followers = user.follower_count,
                actual_followers = follower_count,
                stored_following = user.following_count,
                actual_following = following_count,
                "correcting drifted counters"
            );

            users
                .update_one(
                    doc! { "_id": id },
                    doc! { "$set": {
                        "follower_count": follower_count,
                        "following_count": following_count,
                    }},
                )
                .await?;
            report.corrected += 1;
        }
    }

    Ok(report)
}

/// Spawn the periodic reconciliation task. `interval_secs == 0` disables it.
pub fn spawn_reconcile_task(
    users: MongoCollection<UserDoc>,
    follows: MongoCollection<FollowDoc>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!("Counter reconciliation disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; skip it so startup stays quiet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match reconcile_counters(&users, &follows).await {
                Ok(report) if report.corrected > 0 => {
                    info!(
                        checked = report.checked,
                        corrected = report.corrected,
                        "reconciled follower counters"
                    );
                }
                Ok(report) => {
                    debug!(checked = report.checked, "counters consistent");
                }
                Err(e) => {
                    error!("Counter reconciliation failed: {}", e);
                }
            }
        }
    }))
}
