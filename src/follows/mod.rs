use serde::Serialize;
use uuid::Uuid;

use crate::{pagination::Page, posts::PostResponse};

pub mod handler;

/// Result of a follow/unfollow action. `following` reflects the edge state
/// after the call, so a self-follow no-op reports `false`.
#[derive(Debug, Serialize)]
pub struct FollowActionResponse {
    pub following: bool,
}

/// Author profile: identity, post stats, follow state for the caller, and one
/// page of the author's posts.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub post_count: i64,
    pub is_following: bool,
    pub posts: Page<PostResponse>,
}
