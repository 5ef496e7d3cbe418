//! Content entities: pins, boards, comment threads

pub mod boards;
pub mod comments;
pub mod pins;

pub use boards::{BoardPage, BoardService, BoardView, CreateBoard, UpdateBoard};
pub use comments::{
    CommentLikeOutcome, CommentPage, CommentService, CommentView, CreateComment, UpdateComment,
};
pub use pins::{CreatePin, PinPage, PinService, PinView, UpdatePin};
