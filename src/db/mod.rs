//! MongoDB access layer

pub mod mongo;
pub mod schemas;

pub use mongo::{MongoClient, MongoCollection};

use crate::types::Result;

/// Typed handles to every collection, with indexes applied at startup.
#[derive(Clone)]
pub struct Stores {
    pub users: MongoCollection<schemas::UserDoc>,
    pub follows: MongoCollection<schemas::FollowDoc>,
    pub pins: MongoCollection<schemas::PinDoc>,
    pub boards: MongoCollection<schemas::BoardDoc>,
    pub comments: MongoCollection<schemas::CommentDoc>,
    pub notifications: MongoCollection<schemas::NotificationDoc>,
}

impl Stores {
    /// Open every collection and apply schema-declared indexes.
    /// The unique index on `follows` is load-bearing: it is the storage-layer
    /// uniqueness constraint for the edge pair.
    pub async fn init(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: mongo.collection(schemas::USER_COLLECTION).await?,
            follows: mongo.collection(schemas::FOLLOW_COLLECTION).await?,
            pins: mongo.collection(schemas::PIN_COLLECTION).await?,
            boards: mongo.collection(schemas::BOARD_COLLECTION).await?,
            comments: mongo.collection(schemas::COMMENT_COLLECTION).await?,
            notifications: mongo.collection(schemas::NOTIFICATION_COLLECTION).await?,
        })
    }
}
