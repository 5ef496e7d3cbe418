//! User document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
///
/// Relationship counters are denormalized from the `follows` edge collection
/// and converge via the reconciliation job. `liked_pins`/`saved_pins` mirror
/// the corresponding sets on pins.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Unique handle
    pub username: String,

    /// Display name shown alongside content
    #[serde(default)]
    pub display_name: String,

    /// Avatar URL
    #[serde(default = "default_avatar")]
    pub avatar: String,

    #[serde(default)]
    pub bio: String,

    /// Count of follow edges pointing at this user
    #[serde(default)]
    pub follower_count: i64,

    /// Count of follow edges originating from this user
    #[serde(default)]
    pub following_count: i64,

    /// Pins this user has liked (mirror of pin.likers)
    #[serde(default)]
    pub liked_pins: Vec<ObjectId>,

    /// Pins this user has saved (mirror of pin.saved_by)
    #[serde(default)]
    pub saved_pins: Vec<ObjectId>,

    #[serde(default = "default_role")]
    pub role: String,
}

fn default_avatar() -> String {
    "https://www.gravatar.com/avatar/?d=mp".to_string()
}

fn default_role() -> String {
    "user".to_string()
}

impl UserDoc {
    pub fn new(username: String, display_name: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            username,
            display_name,
            avatar: default_avatar(),
            bio: String::new(),
            follower_count: 0,
            following_count: 0,
            liked_pins: Vec::new(),
            saved_pins: Vec::new(),
            role: default_role(),
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "username": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Public projection of a user, embedded in list responses and notifications
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: ObjectId,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
}

impl From<&UserDoc> for UserSummary {
    fn from(user: &UserDoc) -> Self {
        Self {
            id: user._id.unwrap_or_default(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}
