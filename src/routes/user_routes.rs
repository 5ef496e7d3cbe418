//! User profile endpoint
//!
//! - `GET /users/:id` — public profile with relationship counts

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use hyper::Response;
use serde::Serialize;
use std::sync::Arc;

use crate::routes::{error_response, parse_path_id, result_response, BoxBody};
use crate::server::AppState;
use crate::types::{PinboardError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: ObjectId,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub bio: String,
    pub follower_count: i64,
    pub following_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// GET /users/:id
pub async fn handle_user_profile(state: Arc<AppState>, raw_id: &str) -> Response<BoxBody> {
    match parse_path_id(raw_id) {
        Ok(id) => result_response(load_profile(&state, id).await),
        Err(e) => error_response(&e),
    }
}

async fn load_profile(state: &Arc<AppState>, id: ObjectId) -> Result<UserProfile> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| PinboardError::not_found("User"))?;

    Ok(UserProfile {
        id,
        username: user.username,
        display_name: user.display_name,
        avatar: user.avatar,
        bio: user.bio,
        follower_count: user.follower_count,
        following_count: user.following_count,
        created_at: user.metadata.created_at.map(|d| d.to_chrono()),
    })
}
