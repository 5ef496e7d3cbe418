//! Board document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for boards
pub const BOARD_COLLECTION: &str = "boards";

pub const PRIVACY_PUBLIC: &str = "public";
pub const PRIVACY_PRIVATE: &str = "private";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BoardDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub owner: ObjectId,

    /// Member pins. Mirrored by pin.board.
    #[serde(default)]
    pub pins: Vec<ObjectId>,

    #[serde(default = "default_privacy")]
    pub privacy: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_privacy() -> String {
    PRIVACY_PUBLIC.to_string()
}

impl BoardDoc {
    pub fn new(name: String, owner: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            description: String::new(),
            owner,
            pins: Vec::new(),
            privacy: default_privacy(),
            keywords: Vec::new(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.privacy == PRIVACY_PRIVATE
    }
}

impl IntoIndexes for BoardDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "owner": 1 },
            Some(IndexOptions::builder().name("owner_index".to_string()).build()),
        )]
    }
}

impl MutMetadata for BoardDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
