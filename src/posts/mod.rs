use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub mod handler;

/// Database model for a post.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Request payload for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(min = 1, message = "Post text cannot be empty"))]
    pub text: String,
    pub group_id: Option<Uuid>,
    /// Opaque reference to an uploaded image, stored verbatim.
    pub image: Option<String>,
}

/// Request payload for editing a post. The edit form replaces all mutable
/// fields; the author is never part of the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(length(min = 1, message = "Post text cannot be empty"))]
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Post with joined author and group info, as every feed query reads it.
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub text: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    // author fields
    pub author_id: Uuid,
    pub username: String,
    // group fields (null when the post has no group)
    pub group_id: Option<Uuid>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub group: Option<GroupSummary>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

impl From<PostRow> for PostResponse {
    fn from(p: PostRow) -> Self {
        let group = match (p.group_id, p.group_slug, p.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupSummary { id, slug, title }),
            _ => None,
        };
        PostResponse {
            id: p.id,
            author: AuthorResponse {
                id: p.author_id,
                username: p.username,
            },
            group,
            text: p.text,
            image: p.image,
            created_at: p.created_at,
        }
    }
}

/// Post detail: the post plus its comments, newest first.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<crate::comments::CommentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn empty_post_text_fails_validation() {
        let payload = CreatePost {
            text: String::new(),
            group_id: None,
            image: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn post_text_alone_is_enough() {
        let payload = CreatePost {
            text: "a thought".to_string(),
            group_id: None,
            image: None,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn row_without_group_maps_to_none() {
        let row = PostRow {
            id: Uuid::new_v4(),
            text: "no group here".to_string(),
            image: None,
            created_at: chrono::Utc::now(),
            author_id: Uuid::new_v4(),
            username: "test-user".to_string(),
            group_id: None,
            group_slug: None,
            group_title: None,
        };
        assert!(PostResponse::from(row).group.is_none());
    }
}
