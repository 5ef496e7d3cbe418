//! Relationship coordination
//!
//! The operations here update two documents to represent one logical
//! relationship, without multi-document transactions. Each module documents
//! its accepted inconsistency window and how it converges.

pub mod engagement;
pub mod follow;
pub mod reconcile;

pub use engagement::{EngagementOutcome, EngagementService, LikeList};
pub use follow::{FollowList, FollowService, FollowToggle};
pub use reconcile::{reconcile_counters, spawn_reconcile_task, ReconcileReport};
