//! Pin document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for pins
pub const PIN_COLLECTION: &str = "pins";

/// Media attachment descriptor. Upload and storage layout belong to the
/// media collaborator; pins only carry the reference.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PinMedia {
    pub uri: String,

    #[serde(default = "default_media_kind")]
    pub kind: String,
}

fn default_media_kind() -> String {
    "image".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PinDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub media: PinMedia,

    pub owner: ObjectId,

    /// Board this pin is filed on. Mirrored by board.pins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<ObjectId>,

    /// Users who liked this pin (mirror of user.liked_pins)
    #[serde(default)]
    pub likers: Vec<ObjectId>,

    /// Users who saved this pin (mirror of user.saved_pins)
    #[serde(default)]
    pub saved_by: Vec<ObjectId>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PinDoc {
    pub fn new(title: String, owner: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            description: String::new(),
            link: String::new(),
            media: PinMedia::default(),
            owner,
            board: None,
            likers: Vec::new(),
            saved_by: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn liked_by(&self, user: &ObjectId) -> bool {
        self.likers.contains(user)
    }

    pub fn saved_by_user(&self, user: &ObjectId) -> bool {
        self.saved_by.contains(user)
    }
}

impl IntoIndexes for PinDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "owner": 1, "metadata.created_at": -1 },
                Some(IndexOptions::builder().name("owner_created_index".to_string()).build()),
            ),
            (
                doc! { "board": 1 },
                Some(IndexOptions::builder().name("board_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for PinDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_predicates_cover_both_states() {
        let user = ObjectId::new();
        let mut pin = PinDoc::new("sunset".into(), ObjectId::new());

        assert!(!pin.liked_by(&user));
        assert!(!pin.saved_by_user(&user));

        pin.likers.push(user);
        pin.saved_by.push(user);
        assert!(pin.liked_by(&user));
        assert!(pin.saved_by_user(&user));
    }
}
