//! Comment document schema
//!
//! Comments form a tree per pin: replies reference their parent, and each
//! comment caches its direct child ids in `replies`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for comments
pub const COMMENT_COLLECTION: &str = "comments";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CommentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub content: String,

    pub author: ObjectId,

    pub pin: ObjectId,

    /// Parent comment when this is a reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<ObjectId>,

    /// Users who liked this comment
    #[serde(default)]
    pub likes: Vec<ObjectId>,

    /// Direct reply ids (materialized child cache)
    #[serde(default)]
    pub replies: Vec<ObjectId>,

    #[serde(default)]
    pub is_edited: bool,
}

impl CommentDoc {
    pub fn new(content: String, author: ObjectId, pin: ObjectId, parent: Option<ObjectId>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            content,
            author,
            pin,
            parent_comment: parent,
            likes: Vec::new(),
            replies: Vec::new(),
            is_edited: false,
        }
    }
}

impl IntoIndexes for CommentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "pin": 1, "parent_comment": 1, "metadata.created_at": -1 },
                Some(IndexOptions::builder().name("pin_thread_index".to_string()).build()),
            ),
            (
                doc! { "parent_comment": 1 },
                Some(IndexOptions::builder().name("parent_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for CommentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
