//! Comment threads on pins
//!
//! Comments nest one level at a time under `parent_comment`, with each
//! comment caching its direct child ids in `replies`. Deleting a comment
//! removes its whole subtree with an explicit worklist so thread depth never
//! touches the call stack.

use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::schemas::{CommentDoc, PinDoc, UserDoc, UserSummary};
use crate::db::MongoCollection;
use crate::notify::{NotificationEvent, NotificationGateway, NotificationKind};
use crate::types::{PinboardError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub pin_id: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComment {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: ObjectId,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserSummary>,
    pub pin: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<ObjectId>,
    pub like_count: usize,
    pub is_edited: bool,
    /// Direct replies, populated one level deep
    pub replies: Vec<CommentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CommentView {
    fn from_doc(doc: &CommentDoc, author: Option<UserSummary>, replies: Vec<CommentView>) -> Self {
        Self {
            id: doc._id.unwrap_or_default(),
            content: doc.content.clone(),
            author,
            pin: doc.pin,
            parent_comment: doc.parent_comment,
            like_count: doc.likes.len(),
            is_edited: doc.is_edited,
            replies,
            created_at: doc.metadata.created_at.map(|d| d.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub pagination: crate::notify::Pagination,
}

/// Outcome of a comment like toggle
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeOutcome {
    pub id: ObjectId,
    pub like_count: usize,
    pub is_liked: bool,
}

pub struct CommentService {
    comments: MongoCollection<CommentDoc>,
    pins: MongoCollection<PinDoc>,
    users: MongoCollection<UserDoc>,
    gateway: Arc<NotificationGateway>,
}

impl CommentService {
    pub fn new(
        comments: MongoCollection<CommentDoc>,
        pins: MongoCollection<PinDoc>,
        users: MongoCollection<UserDoc>,
        gateway: Arc<NotificationGateway>,
    ) -> Self {
        Self {
            comments,
            pins,
            users,
            gateway,
        }
    }

    /// Create a top-level comment or a reply.
    ///
    /// Replies notify the parent comment's author; top-level comments notify
    /// the pin owner.
    pub async fn create(&self, author: ObjectId, req: CreateComment) -> Result<CommentView> {
        if req.content.trim().is_empty() {
            return Err(PinboardError::validation("content", "Content is required"));
        }

        let pin_id = parse_id(&req.pin_id, "pinId")?;
        let pin = self
            .pins
            .find_by_id(pin_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Pin"))?;

        let parent = match req.parent_comment_id.as_deref() {
            Some(raw) => {
                let parent_id = parse_id(raw, "parentCommentId")?;
                let parent = self
                    .comments
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| PinboardError::not_found("Parent comment"))?;
                if parent.pin != pin_id {
                    return Err(PinboardError::validation(
                        "parentCommentId",
                        "Parent comment belongs to another pin",
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let mut comment =
            CommentDoc::new(req.content, author, pin_id, parent.as_ref().and_then(|p| p._id));
        let id = self.comments.insert_one(comment.clone()).await?;
        comment._id = Some(id);

        match parent {
            Some(parent) => {
                self.comments
                    .update_one(
                        doc! { "_id": parent._id },
                        doc! { "$addToSet": { "replies": id } },
                    )
                    .await?;

                self.gateway
                    .dispatch(
                        NotificationEvent::new(NotificationKind::ReplyComment, author, parent.author)
                            .with_pin(pin_id)
                            .with_comment(id),
                    )
                    .await;
            }
            None => {
                self.gateway
                    .dispatch(
                        NotificationEvent::new(NotificationKind::CommentPin, author, pin.owner)
                            .with_pin(pin_id)
                            .with_comment(id),
                    )
                    .await;
            }
        }

        let author_summary = self.author_summary(author).await?;
        Ok(CommentView::from_doc(&comment, author_summary, Vec::new()))
    }

    /// Top-level comments of a pin, newest first, replies populated one level
    pub async fn list_for_pin(&self, pin_id: ObjectId, page: u64, limit: i64) -> Result<CommentPage> {
        if self.pins.find_by_id(pin_id).await?.is_none() {
            return Err(PinboardError::not_found("Pin"));
        }

        let page = page.max(1);
        let filter = doc! { "pin": pin_id, "parent_comment": null };

        let top_level = self
            .comments
            .find_page(
                filter.clone(),
                doc! { "metadata.created_at": -1 },
                (page - 1) * limit as u64,
                limit,
            )
            .await?;
        let total = self.comments.count(filter).await?;

        let top_ids: Vec<ObjectId> = top_level.iter().filter_map(|c| c._id).collect();
        let replies = if top_ids.is_empty() {
            Vec::new()
        } else {
            self.comments
                .find_many(doc! { "parent_comment": { "$in": top_ids } })
                .await?
        };

        let authors = self.author_map(top_level.iter().chain(replies.iter())).await?;

        let mut replies_by_parent: HashMap<ObjectId, Vec<CommentView>> = HashMap::new();
        for reply in &replies {
            let Some(parent) = reply.parent_comment else { continue };
            let view =
                CommentView::from_doc(reply, authors.get(&reply.author).cloned(), Vec::new());
            replies_by_parent.entry(parent).or_default().push(view);
        }

        let comments = top_level
            .iter()
            .map(|c| {
                let replies = c
                    ._id
                    .and_then(|id| replies_by_parent.remove(&id))
                    .unwrap_or_default();
                CommentView::from_doc(c, authors.get(&c.author).cloned(), replies)
            })
            .collect();

        Ok(CommentPage {
            comments,
            pagination: crate::notify::Pagination {
                current: page,
                pages: total.div_ceil(limit as u64),
                total,
            },
        })
    }

    pub async fn update(
        &self,
        actor: ObjectId,
        comment_id: ObjectId,
        req: UpdateComment,
    ) -> Result<CommentView> {
        if req.content.trim().is_empty() {
            return Err(PinboardError::validation("content", "Content is required"));
        }

        let comment = self.require_comment(comment_id).await?;
        if comment.author != actor {
            return Err(PinboardError::Forbidden(
                "You can only edit your own comments".into(),
            ));
        }

        self.comments
            .update_one(
                doc! { "_id": comment_id },
                doc! { "$set": {
                    "content": &req.content,
                    "is_edited": true,
                    "metadata.updated_at": bson::DateTime::now(),
                }},
            )
            .await?;

        let updated = self.require_comment(comment_id).await?;
        let author = self.author_summary(updated.author).await?;
        Ok(CommentView::from_doc(&updated, author, Vec::new()))
    }

    /// Delete a comment and its entire reply subtree.
    ///
    /// Returns the number of removed documents (the comment plus all its
    /// descendants). The traversal loads the pin's thread once and walks it
    /// with an explicit stack.
    pub async fn delete(&self, actor: ObjectId, comment_id: ObjectId) -> Result<u64> {
        let comment = self.require_comment(comment_id).await?;
        if comment.author != actor {
            return Err(PinboardError::Forbidden(
                "You can only delete your own comments".into(),
            ));
        }

        // Detach from the parent's reply cache first so no dangling id
        // survives even if the deletes below fail midway
        if let Some(parent) = comment.parent_comment {
            self.comments
                .update_one(
                    doc! { "_id": parent },
                    doc! { "$pull": { "replies": comment_id } },
                )
                .await?;
        }

        let thread = self.comments.find_many(doc! { "pin": comment.pin }).await?;
        let doomed = collect_subtree(comment_id, &thread);

        self.comments
            .delete_many(doc! { "_id": { "$in": doomed.clone() } })
            .await?;

        Ok(doomed.len() as u64)
    }

    /// Toggle the actor's like on a comment
    pub async fn toggle_like(&self, actor: ObjectId, comment_id: ObjectId) -> Result<CommentLikeOutcome> {
        let comment = self.require_comment(comment_id).await?;
        let already_liked = comment.likes.contains(&actor);

        let update = if already_liked {
            doc! { "$pull": { "likes": actor } }
        } else {
            doc! { "$addToSet": { "likes": actor } }
        };
        self.comments
            .update_one(doc! { "_id": comment_id }, update)
            .await?;

        let like_count = if already_liked {
            comment.likes.len().saturating_sub(1)
        } else {
            comment.likes.len() + 1
        };

        Ok(CommentLikeOutcome {
            id: comment_id,
            like_count,
            is_liked: !already_liked,
        })
    }

    async fn require_comment(&self, comment_id: ObjectId) -> Result<CommentDoc> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| PinboardError::not_found("Comment"))
    }

    async fn author_summary(&self, author: ObjectId) -> Result<Option<UserSummary>> {
        Ok(self
            .users
            .find_by_id(author)
            .await?
            .as_ref()
            .map(UserSummary::from))
    }

    async fn author_map<'a>(
        &self,
        comments: impl Iterator<Item = &'a CommentDoc>,
    ) -> Result<HashMap<ObjectId, UserSummary>> {
        let mut ids: Vec<ObjectId> = comments.map(|c| c.author).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.users.find_many(doc! { "_id": { "$in": ids } }).await?;
        Ok(users
            .iter()
            .filter_map(|u| u._id.map(|id| (id, UserSummary::from(u))))
            .collect())
    }
}

/// Collect a comment and all of its descendants from a loaded thread.
///
/// Explicit stack, depth-first; thread depth never recurses.
fn collect_subtree(root: ObjectId, thread: &[CommentDoc]) -> Vec<ObjectId> {
    let mut children: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for comment in thread {
        if let (Some(id), Some(parent)) = (comment._id, comment.parent_comment) {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut doomed = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        doomed.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }

    doomed
}

fn parse_id(raw: &str, field: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| PinboardError::validation(field, "Invalid id format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: ObjectId, pin: ObjectId, parent: Option<ObjectId>) -> CommentDoc {
        let mut doc = CommentDoc::new("text".into(), ObjectId::new(), pin, parent);
        doc._id = Some(id);
        doc
    }

    #[test]
    fn subtree_includes_root_and_all_descendants() {
        let pin = ObjectId::new();
        let root = ObjectId::new();
        let child_a = ObjectId::new();
        let child_b = ObjectId::new();
        let grandchild = ObjectId::new();
        let unrelated = ObjectId::new();

        let thread = vec![
            comment(root, pin, None),
            comment(child_a, pin, Some(root)),
            comment(child_b, pin, Some(root)),
            comment(grandchild, pin, Some(child_a)),
            comment(unrelated, pin, None),
        ];

        let doomed = collect_subtree(root, &thread);
        assert_eq!(doomed.len(), 4);
        assert!(doomed.contains(&root));
        assert!(doomed.contains(&child_a));
        assert!(doomed.contains(&child_b));
        assert!(doomed.contains(&grandchild));
        assert!(!doomed.contains(&unrelated));
    }

    #[test]
    fn subtree_of_leaf_is_just_the_leaf() {
        let pin = ObjectId::new();
        let root = ObjectId::new();
        let leaf = ObjectId::new();

        let thread = vec![comment(root, pin, None), comment(leaf, pin, Some(root))];

        assert_eq!(collect_subtree(leaf, &thread), vec![leaf]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        // A pathological 10_000-deep reply chain walks fine on the heap stack
        let pin = ObjectId::new();
        let mut thread = Vec::new();
        let mut parent = None;
        let mut first = None;

        for _ in 0..10_000 {
            let id = ObjectId::new();
            thread.push(comment(id, pin, parent));
            if first.is_none() {
                first = Some(id);
            }
            parent = Some(id);
        }

        let doomed = collect_subtree(first.unwrap(), &thread);
        assert_eq!(doomed.len(), 10_000);
    }
}
