//! Follow edge schema
//!
//! One document per directed follower -> following relationship. The unique
//! compound index is the storage-layer guard against concurrent duplicate
//! inserts for the same pair.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for follow edges
pub const FOLLOW_COLLECTION: &str = "follows";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FollowDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// The user doing the following
    pub follower: ObjectId,

    /// The user being followed
    pub following: ObjectId,
}

impl FollowDoc {
    pub fn new(follower: ObjectId, following: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            follower,
            following,
        }
    }
}

impl IntoIndexes for FollowDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Uniqueness on the pair; mandatory, not an optimization
            (
                doc! { "follower": 1, "following": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("follower_following_unique".to_string())
                        .build(),
                ),
            ),
            // Reverse lookups: "who follows X"
            (
                doc! { "following": 1 },
                Some(IndexOptions::builder().name("following_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for FollowDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_pair_index_is_unique() {
        // Storage-layer uniqueness on (follower, following) is what keeps
        // two racing follow requests from inserting the edge twice.
        let indices = FollowDoc::into_indices();
        let (keys, opts) = &indices[0];

        assert_eq!(keys.get_i32("follower").unwrap(), 1);
        assert_eq!(keys.get_i32("following").unwrap(), 1);
        assert_eq!(opts.as_ref().unwrap().unique, Some(true));
    }
}
