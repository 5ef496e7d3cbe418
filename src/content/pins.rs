//! Pin CRUD and board membership maintenance
//!
//! A pin's `board` back-reference and the board's `pins` list describe the
//! same fact; every operation that touches one touches the other.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::schemas::{BoardDoc, PinDoc, PinMedia, UserDoc, UserSummary};
use crate::db::MongoCollection;
use crate::types::{PinboardError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePin {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub media: Option<PinMedia>,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePin {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Move the pin to another owned board
    pub board: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Pin as returned to clients, with the owner populated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinView {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub link: String,
    pub media: PinMedia,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<ObjectId>,
    pub like_count: usize,
    pub save_count: usize,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PinView {
    fn from_doc(pin: &PinDoc, owner: Option<UserSummary>) -> Self {
        Self {
            id: pin._id.unwrap_or_default(),
            title: pin.title.clone(),
            description: pin.description.clone(),
            link: pin.link.clone(),
            media: pin.media.clone(),
            owner,
            board: pin.board,
            like_count: pin.likers.len(),
            save_count: pin.saved_by.len(),
            keywords: pin.keywords.clone(),
            created_at: pin.metadata.created_at.map(|d| d.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinPage {
    pub pins: Vec<PinView>,
    pub pagination: crate::notify::Pagination,
}

pub struct PinService {
    pins: MongoCollection<PinDoc>,
    boards: MongoCollection<BoardDoc>,
    users: MongoCollection<UserDoc>,
}

impl PinService {
    pub fn new(
        pins: MongoCollection<PinDoc>,
        boards: MongoCollection<BoardDoc>,
        users: MongoCollection<UserDoc>,
    ) -> Self {
        Self {
            pins,
            boards,
            users,
        }
    }

    pub async fn create(&self, owner: ObjectId, req: CreatePin) -> Result<PinView> {
        if req.title.trim().is_empty() {
            return Err(PinboardError::validation("title", "Title is required"));
        }

        let board_id = match req.board.as_deref() {
            Some(raw) => Some(self.require_owned_board(raw, owner, "add pins to").await?),
            None => None,
        };

        let mut pin = PinDoc::new(req.title, owner);
        pin.description = req.description;
        pin.link = req.link;
        pin.media = req.media.unwrap_or_default();
        pin.board = board_id;
        pin.keywords = req.keywords;

        let id = self.pins.insert_one(pin.clone()).await?;
        pin._id = Some(id);

        if let Some(board) = board_id {
            self.boards
                .update_one(doc! { "_id": board }, doc! { "$addToSet": { "pins": id } })
                .await?;
        }

        let owner_summary = self.owner_summary(owner).await?;
        Ok(PinView::from_doc(&pin, owner_summary))
    }

    /// Fetch one pin; pins on a private board are visible to the board owner
    /// only.
    pub async fn get(&self, pin_id: ObjectId, viewer: Option<ObjectId>) -> Result<PinView> {
        let pin = self.require_pin(pin_id).await?;

        if let Some(board_id) = pin.board {
            if let Some(board) = self.boards.find_by_id(board_id).await? {
                if board.is_private() && viewer != Some(board.owner) {
                    return Err(PinboardError::Forbidden(
                        "Access denied to private board pin".into(),
                    ));
                }
            }
        }

        let owner = self.owner_summary(pin.owner).await?;
        Ok(PinView::from_doc(&pin, owner))
    }

    /// Filtered, newest-first page of pins
    pub async fn list(
        &self,
        owner: Option<ObjectId>,
        board: Option<ObjectId>,
        page: u64,
        limit: i64,
    ) -> Result<PinPage> {
        let page = page.max(1);

        let mut filter = Document::new();
        if let Some(owner) = owner {
            filter.insert("owner", owner);
        }
        if let Some(board) = board {
            filter.insert("board", board);
        }

        let docs = self
            .pins
            .find_page(
                filter.clone(),
                doc! { "metadata.created_at": -1 },
                (page - 1) * limit as u64,
                limit,
            )
            .await?;
        let total = self.pins.count(filter).await?;

        let mut pins = Vec::with_capacity(docs.len());
        for d in &docs {
            let owner = self.owner_summary(d.owner).await?;
            pins.push(PinView::from_doc(d, owner));
        }

        Ok(PinPage {
            pins,
            pagination: crate::notify::Pagination {
                current: page,
                pages: total.div_ceil(limit as u64),
                total,
            },
        })
    }

    pub async fn update(&self, actor: ObjectId, pin_id: ObjectId, req: UpdatePin) -> Result<PinView> {
        let pin = self.require_pin(pin_id).await?;

        if pin.owner != actor {
            return Err(PinboardError::Forbidden("You can only update your own pins".into()));
        }

        // Board move maintains the membership list on both boards
        if let Some(raw) = req.board.as_deref() {
            let new_board = self.require_owned_board(raw, actor, "move pins to").await?;

            if pin.board != Some(new_board) {
                if let Some(old) = pin.board {
                    self.boards
                        .update_one(doc! { "_id": old }, doc! { "$pull": { "pins": pin_id } })
                        .await?;
                }
                self.boards
                    .update_one(doc! { "_id": new_board }, doc! { "$addToSet": { "pins": pin_id } })
                    .await?;
            }
        }

        let mut set = Document::new();
        if let Some(title) = req.title {
            if title.trim().is_empty() {
                return Err(PinboardError::validation("title", "Title is required"));
            }
            set.insert("title", title);
        }
        if let Some(description) = req.description {
            set.insert("description", description);
        }
        if let Some(link) = req.link {
            set.insert("link", link);
        }
        if let Some(keywords) = req.keywords {
            set.insert("keywords", keywords);
        }
        if let Some(raw) = req.board.as_deref() {
            set.insert("board", parse_board_id(raw)?);
        }
        set.insert("metadata.updated_at", bson::DateTime::now());

        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$set": set })
            .await?;

        let updated = self.require_pin(pin_id).await?;
        let owner = self.owner_summary(updated.owner).await?;
        Ok(PinView::from_doc(&updated, owner))
    }

    /// Delete a pin and every reference to it: board membership, user
    /// liked/saved mirrors.
    pub async fn delete(&self, actor: ObjectId, pin_id: ObjectId) -> Result<()> {
        let pin = self.require_pin(pin_id).await?;

        if pin.owner != actor {
            return Err(PinboardError::Forbidden("You can only delete your own pins".into()));
        }

        if let Some(board) = pin.board {
            self.boards
                .update_one(doc! { "_id": board }, doc! { "$pull": { "pins": pin_id } })
                .await?;
        }

        self.users
            .update_many(
                doc! { "liked_pins": pin_id },
                doc! { "$pull": { "liked_pins": pin_id } },
            )
            .await?;
        self.users
            .update_many(
                doc! { "saved_pins": pin_id },
                doc! { "$pull": { "saved_pins": pin_id } },
            )
            .await?;

        self.pins.delete_one(doc! { "_id": pin_id }).await?;
        Ok(())
    }

    async fn require_pin(&self, pin_id: ObjectId) -> Result<PinDoc> {
        self.pins
            .find_by_id(pin_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Pin"))
    }

    /// Parse, fetch, and ownership-check a board id from a request body
    async fn require_owned_board(
        &self,
        raw: &str,
        owner: ObjectId,
        action: &str,
    ) -> Result<ObjectId> {
        let board_id = parse_board_id(raw)?;
        let board = self
            .boards
            .find_by_id(board_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Board"))?;

        if board.owner != owner {
            return Err(PinboardError::Forbidden(format!(
                "You can only {} your own boards",
                action
            )));
        }

        Ok(board_id)
    }

    async fn owner_summary(&self, owner: ObjectId) -> Result<Option<UserSummary>> {
        Ok(self
            .users
            .find_by_id(owner)
            .await?
            .as_ref()
            .map(UserSummary::from))
    }
}

/// Parse an ObjectId out of client input
pub fn parse_board_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| PinboardError::validation("board", "Invalid id format"))
}
