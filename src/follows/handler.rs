use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    error::AppError,
    follows::{FollowActionResponse, ProfileResponse},
    identity::jwt,
    pagination::{Page, PageQuery, PAGE_SIZE},
    posts::{PostResponse, PostRow},
    response::ApiResponse,
};

/// Author profile with a page of their posts, newest first. Works without a
/// token; `is_following` is only meaningful for authenticated callers.
/// GET /api/profile/:username?page=N
pub async fn get_profile(
    State(pool): State<PgPool>,
    claims: Option<jwt::Claims>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let author = sqlx::query("SELECT id, username FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let author_id: Uuid = author.get("id");

    let post_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT
            p.id, p.text, p.image, p.created_at, p.author_id,
            u.username,
            g.id AS group_id, g.slug AS group_slug, g.title AS group_title
        FROM posts p
        JOIN users u ON p.author_id = u.id
        LEFT JOIN groups g ON p.group_id = g.id
        WHERE p.author_id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(author_id)
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Profile feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let is_following = match claims {
        Some(claims) => is_following(&pool, claims.sub, author_id).await?,
        None => false,
    };

    let posts: Vec<PostResponse> = rows.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::success(ProfileResponse {
        id: author_id,
        username: author.get("username"),
        post_count,
        is_following,
        posts: Page::new(posts, page, post_count),
    }))
}

/// Follow an author. Self-follows and repeat follows are silent no-ops; the
/// unique constraint on the edge absorbs concurrent duplicates.
/// POST /api/profile/:username/follow
pub async fn follow_author(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author_id = resolve_author(&pool, &username).await?;

    if follow_action(claims.sub, author_id) == FollowAction::Ignore {
        return Ok(ApiResponse::success(FollowActionResponse {
            following: false,
        }));
    }

    sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(claims.sub)
    .bind(author_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create follow: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(ApiResponse::success(FollowActionResponse { following: true }))
}

/// Unfollow an author. Unlike follow, the delete path is strict: removing an
/// edge that does not exist is a NotFound.
/// DELETE /api/profile/:username/follow
pub async fn unfollow_author(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author_id = resolve_author(&pool, &username).await?;

    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(claims.sub)
        .bind(author_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Not following this user".to_string()));
    }

    Ok(ApiResponse::success(FollowActionResponse {
        following: false,
    }))
}

/// Posts by authors the caller follows, newest first. Empty page when they
/// follow nobody.
/// GET /api/feed/following?page=N
pub async fn get_following_feed(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM posts p
        JOIN follows f ON f.author_id = p.author_id
        WHERE f.user_id = $1
        "#,
    )
    .bind(claims.sub)
    .fetch_one(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT
            p.id, p.text, p.image, p.created_at, p.author_id,
            u.username,
            g.id AS group_id, g.slug AS group_slug, g.title AS group_title
        FROM posts p
        JOIN users u ON p.author_id = u.id
        LEFT JOIN groups g ON p.group_id = g.id
        JOIN follows f ON f.author_id = p.author_id AND f.user_id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(claims.sub)
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Following feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let posts: Vec<PostResponse> = rows.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::success(Page::new(posts, page, total)))
}

async fn resolve_author(pool: &PgPool, username: &str) -> Result<Uuid, AppError> {
    let row = sqlx::query("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(row.get("id"))
}

async fn is_following(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool, AppError> {
    let row = sqlx::query("SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(row.is_some())
}

/// What a follow request does: nothing for self-follows, otherwise an edge
/// insert that the unique pair constraint makes idempotent.
#[derive(Debug, PartialEq)]
pub(crate) enum FollowAction {
    Ignore,
    CreateEdge,
}

pub(crate) fn follow_action(follower: Uuid, author: Uuid) -> FollowAction {
    if follower == author {
        FollowAction::Ignore
    } else {
        FollowAction::CreateEdge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_follow_is_a_no_op() {
        let user = Uuid::new_v4();
        assert_eq!(follow_action(user, user), FollowAction::Ignore);
    }

    #[test]
    fn distinct_users_create_an_edge() {
        assert_eq!(
            follow_action(Uuid::new_v4(), Uuid::new_v4()),
            FollowAction::CreateEdge
        );
    }
}
