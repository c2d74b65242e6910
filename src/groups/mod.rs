use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{pagination::Page, posts::PostResponse};

pub mod handler;

/// Database model for a group. Posts optionally belong to one group.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
}

/// Request payload for creating a group. The slug is derived from the title.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroup {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Group page: the group itself plus one page of its posts.
#[derive(Debug, Serialize)]
pub struct GroupPostsResponse {
    pub group: Group,
    pub posts: Page<PostResponse>,
}
