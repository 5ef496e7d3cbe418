//! Board CRUD and pin membership
//!
//! Membership lives in two places: `board.pins` and the pin's `board`
//! back-reference. Every mutation here updates both.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::schemas::{BoardDoc, PinDoc, PRIVACY_PRIVATE, PRIVACY_PUBLIC};
use crate::db::MongoCollection;
use crate::types::{PinboardError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<String>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub owner: ObjectId,
    pub pins: Vec<ObjectId>,
    pub pin_count: usize,
    pub privacy: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&BoardDoc> for BoardView {
    fn from(board: &BoardDoc) -> Self {
        Self {
            id: board._id.unwrap_or_default(),
            name: board.name.clone(),
            description: board.description.clone(),
            owner: board.owner,
            pin_count: board.pins.len(),
            pins: board.pins.clone(),
            privacy: board.privacy.clone(),
            keywords: board.keywords.clone(),
            created_at: board.metadata.created_at.map(|d| d.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPage {
    pub boards: Vec<BoardView>,
    pub pagination: crate::notify::Pagination,
}

pub struct BoardService {
    boards: MongoCollection<BoardDoc>,
    pins: MongoCollection<PinDoc>,
}

impl BoardService {
    pub fn new(boards: MongoCollection<BoardDoc>, pins: MongoCollection<PinDoc>) -> Self {
        Self { boards, pins }
    }

    pub async fn create(&self, owner: ObjectId, req: CreateBoard) -> Result<BoardView> {
        if req.name.trim().is_empty() {
            return Err(PinboardError::validation("name", "Name is required"));
        }

        let privacy = match req.privacy.as_deref() {
            None => PRIVACY_PUBLIC.to_string(),
            Some(p) if p == PRIVACY_PUBLIC || p == PRIVACY_PRIVATE => p.to_string(),
            Some(_) => {
                return Err(PinboardError::validation(
                    "privacy",
                    "Privacy must be 'public' or 'private'",
                ))
            }
        };

        let mut board = BoardDoc::new(req.name, owner);
        board.description = req.description;
        board.privacy = privacy;
        board.keywords = req.keywords;

        let id = self.boards.insert_one(board.clone()).await?;
        board._id = Some(id);

        Ok(BoardView::from(&board))
    }

    /// Newest-first page of a user's boards
    pub async fn list_for_owner(&self, owner: ObjectId, page: u64, limit: i64) -> Result<BoardPage> {
        let page = page.max(1);
        let filter = doc! { "owner": owner };

        let docs = self
            .boards
            .find_page(
                filter.clone(),
                doc! { "metadata.created_at": -1 },
                (page - 1) * limit as u64,
                limit,
            )
            .await?;
        let total = self.boards.count(filter).await?;

        Ok(BoardPage {
            boards: docs.iter().map(BoardView::from).collect(),
            pagination: crate::notify::Pagination {
                current: page,
                pages: total.div_ceil(limit as u64),
                total,
            },
        })
    }

    /// Fetch one board; private boards are visible to their owner only
    pub async fn get(&self, board_id: ObjectId, viewer: Option<ObjectId>) -> Result<BoardView> {
        let board = self.require_board(board_id).await?;

        if board.is_private() && viewer != Some(board.owner) {
            return Err(PinboardError::Forbidden("Access denied to private board".into()));
        }

        Ok(BoardView::from(&board))
    }

    pub async fn update(
        &self,
        actor: ObjectId,
        board_id: ObjectId,
        req: UpdateBoard,
    ) -> Result<BoardView> {
        let board = self.require_board(board_id).await?;

        if board.owner != actor {
            return Err(PinboardError::Forbidden(
                "You can only update your own boards".into(),
            ));
        }

        let mut set = Document::new();
        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(PinboardError::validation("name", "Name is required"));
            }
            set.insert("name", name);
        }
        if let Some(description) = req.description {
            set.insert("description", description);
        }
        if let Some(privacy) = req.privacy {
            if privacy != PRIVACY_PUBLIC && privacy != PRIVACY_PRIVATE {
                return Err(PinboardError::validation(
                    "privacy",
                    "Privacy must be 'public' or 'private'",
                ));
            }
            set.insert("privacy", privacy);
        }
        if let Some(keywords) = req.keywords {
            set.insert("keywords", keywords);
        }
        set.insert("metadata.updated_at", bson::DateTime::now());

        self.boards
            .update_one(doc! { "_id": board_id }, doc! { "$set": set })
            .await?;

        let updated = self.require_board(board_id).await?;
        Ok(BoardView::from(&updated))
    }

    /// Delete a board and clear the back-reference on its member pins
    pub async fn delete(&self, actor: ObjectId, board_id: ObjectId) -> Result<()> {
        let board = self.require_board(board_id).await?;

        if board.owner != actor {
            return Err(PinboardError::Forbidden(
                "You can only delete your own boards".into(),
            ));
        }

        self.pins
            .update_many(doc! { "board": board_id }, doc! { "$unset": { "board": "" } })
            .await?;

        self.boards.delete_one(doc! { "_id": board_id }).await?;
        Ok(())
    }

    /// File a pin on a board. If the pin sits on another board it is moved,
    /// keeping the membership lists of both boards true.
    pub async fn add_pin(
        &self,
        actor: ObjectId,
        board_id: ObjectId,
        pin_id: ObjectId,
    ) -> Result<BoardView> {
        let board = self.require_board(board_id).await?;

        if board.owner != actor {
            return Err(PinboardError::Forbidden(
                "You can only add pins to your own boards".into(),
            ));
        }

        let pin = self
            .pins
            .find_by_id(pin_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Pin"))?;

        if board.pins.contains(&pin_id) {
            return Err(PinboardError::validation(
                "pinId",
                "Pin already exists in this board",
            ));
        }

        if let Some(old) = pin.board {
            self.boards
                .update_one(doc! { "_id": old }, doc! { "$pull": { "pins": pin_id } })
                .await?;
        }

        self.boards
            .update_one(doc! { "_id": board_id }, doc! { "$addToSet": { "pins": pin_id } })
            .await?;
        self.pins
            .update_one(doc! { "_id": pin_id }, doc! { "$set": { "board": board_id } })
            .await?;

        let updated = self.require_board(board_id).await?;
        Ok(BoardView::from(&updated))
    }

    /// Remove a pin from a board and clear its back-reference
    pub async fn remove_pin(
        &self,
        actor: ObjectId,
        board_id: ObjectId,
        pin_id: ObjectId,
    ) -> Result<BoardView> {
        let board = self.require_board(board_id).await?;

        if board.owner != actor {
            return Err(PinboardError::Forbidden(
                "You can only remove pins from your own boards".into(),
            ));
        }

        self.boards
            .update_one(doc! { "_id": board_id }, doc! { "$pull": { "pins": pin_id } })
            .await?;
        self.pins
            .update_one(
                doc! { "_id": pin_id, "board": board_id },
                doc! { "$unset": { "board": "" } },
            )
            .await?;

        let updated = self.require_board(board_id).await?;
        Ok(BoardView::from(&updated))
    }

    async fn require_board(&self, board_id: ObjectId) -> Result<BoardDoc> {
        self.boards
            .find_by_id(board_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Board"))
    }
}
