use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::posts::AuthorResponse;

pub mod handler;

/// Database model for a comment.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Request payload for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment text cannot be empty"))]
    pub text: String,
}

/// Comment with joined author info.
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: AuthorResponse,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CommentRow> for CommentResponse {
    fn from(c: CommentRow) -> Self {
        CommentResponse {
            id: c.id,
            post_id: c.post_id,
            author: AuthorResponse {
                id: c.author_id,
                username: c.username,
            },
            text: c.text,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn empty_comment_fails_validation() {
        let payload = CreateComment {
            text: String::new(),
        };
        assert!(payload.validate().is_err());
    }
}
