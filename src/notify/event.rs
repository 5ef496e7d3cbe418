//! Domain event to notification translation
//!
//! Pure mapping from a domain action to a notification-creation request.
//! Every trigger site (like, unlike, save, unsave, comment, reply, follow,
//! unfollow) goes through this table; nothing else decides messages.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Closed set of notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    LikePin,
    UnlikePin,
    CommentPin,
    ReplyComment,
    FollowUser,
    UnfollowUser,
    SavePin,
    UnsavePin,
}

impl NotificationKind {
    /// Fixed human-readable message per kind
    pub fn message(&self) -> &'static str {
        match self {
            Self::LikePin => "liked your pin",
            Self::UnlikePin => "unliked your pin",
            Self::CommentPin => "commented on your pin",
            Self::ReplyComment => "replied to your comment",
            Self::FollowUser => "started following you",
            Self::UnfollowUser => "unfollowed you",
            Self::SavePin => "saved your pin",
            Self::UnsavePin => "unsaved your pin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LikePin => "like_pin",
            Self::UnlikePin => "unlike_pin",
            Self::CommentPin => "comment_pin",
            Self::ReplyComment => "reply_comment",
            Self::FollowUser => "follow_user",
            Self::UnfollowUser => "unfollow_user",
            Self::SavePin => "save_pin",
            Self::UnsavePin => "unsave_pin",
        }
    }
}

/// A domain action that may warrant a notification
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    /// Who performed the action
    pub actor: ObjectId,
    /// Owner of the acted-on resource (the would-be recipient)
    pub owner: ObjectId,
    pub pin: Option<ObjectId>,
    pub board: Option<ObjectId>,
    pub comment: Option<ObjectId>,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, actor: ObjectId, owner: ObjectId) -> Self {
        Self {
            kind,
            actor,
            owner,
            pin: None,
            board: None,
            comment: None,
        }
    }

    pub fn with_pin(mut self, pin: ObjectId) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn with_board(mut self, board: ObjectId) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_comment(mut self, comment: ObjectId) -> Self {
        self.comment = Some(comment);
        self
    }
}

/// Creation request produced by the translator
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotification {
    pub recipient: ObjectId,
    pub sender: ObjectId,
    pub kind: NotificationKind,
    pub message: &'static str,
    pub related_pin: Option<ObjectId>,
    pub related_board: Option<ObjectId>,
    pub related_comment: Option<ObjectId>,
}

/// Translate a domain event into a creation request, or nothing.
///
/// Self-actions never notify: acting on your own content is suppressed for
/// every kind. Pure and side-effect free; the caller decides persistence.
pub fn translate(event: &NotificationEvent) -> Option<CreateNotification> {
    if event.actor == event.owner {
        return None;
    }

    Some(CreateNotification {
        recipient: event.owner,
        sender: event.actor,
        kind: event.kind,
        message: event.kind.message(),
        related_pin: event.pin,
        related_board: event.board,
        related_comment: event.comment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_action_is_suppressed_for_every_kind() {
        let me = ObjectId::new();
        for kind in [
            NotificationKind::LikePin,
            NotificationKind::UnlikePin,
            NotificationKind::CommentPin,
            NotificationKind::ReplyComment,
            NotificationKind::FollowUser,
            NotificationKind::UnfollowUser,
            NotificationKind::SavePin,
            NotificationKind::UnsavePin,
        ] {
            let event = NotificationEvent::new(kind, me, me);
            assert!(translate(&event).is_none(), "{:?} notified on self-action", kind);
        }
    }

    #[test]
    fn follow_event_translates() {
        let follower = ObjectId::new();
        let followed = ObjectId::new();
        let req = translate(&NotificationEvent::new(
            NotificationKind::FollowUser,
            follower,
            followed,
        ))
        .unwrap();

        assert_eq!(req.recipient, followed);
        assert_eq!(req.sender, follower);
        assert_eq!(req.kind, NotificationKind::FollowUser);
        assert_eq!(req.message, "started following you");
        assert!(req.related_pin.is_none());
    }

    #[test]
    fn related_ids_pass_through() {
        let actor = ObjectId::new();
        let owner = ObjectId::new();
        let pin = ObjectId::new();
        let comment = ObjectId::new();

        let req = translate(
            &NotificationEvent::new(NotificationKind::ReplyComment, actor, owner)
                .with_pin(pin)
                .with_comment(comment),
        )
        .unwrap();

        assert_eq!(req.related_pin, Some(pin));
        assert_eq!(req.related_comment, Some(comment));
        assert_eq!(req.related_board, None);
        assert_eq!(req.message, "replied to your comment");
    }

    #[test]
    fn message_table_is_exhaustive() {
        assert_eq!(NotificationKind::LikePin.message(), "liked your pin");
        assert_eq!(NotificationKind::UnlikePin.message(), "unliked your pin");
        assert_eq!(NotificationKind::CommentPin.message(), "commented on your pin");
        assert_eq!(NotificationKind::SavePin.message(), "saved your pin");
        assert_eq!(NotificationKind::UnsavePin.message(), "unsaved your pin");
        assert_eq!(NotificationKind::UnfollowUser.message(), "unfollowed you");
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(NotificationKind::LikePin.as_str(), "like_pin");
        assert_eq!(
            serde_json::to_string(&NotificationKind::ReplyComment).unwrap(),
            "\"reply_comment\""
        );
    }
}
