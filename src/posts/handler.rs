use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    identity::jwt,
    pagination::{Page, PageQuery, PAGE_SIZE},
    posts::{CreatePost, PostDetailResponse, PostResponse, PostRow, UpdatePost},
    response::ApiResponse,
};

/// Main page feed: every post, newest first.
/// GET /api/posts?page=N
pub async fn get_posts(
    State(pool): State<PgPool>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
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
        ORDER BY p.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let posts: Vec<PostResponse> = rows.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::success(Page::new(posts, page, total)))
}

/// Create a post as the authenticated caller. The author comes from the
/// token, never from the payload.
/// POST /api/posts
pub async fn create_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Json(payload): Json<CreatePost>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    if let Some(group_id) = payload.group_id {
        sqlx::query("SELECT id FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?
            .ok_or(AppError::NotFound("Group not found".to_string()))?;
    }

    let post = sqlx::query_as::<_, crate::posts::Post>(
        r#"
        INSERT INTO posts (id, author_id, group_id, text, image, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(claims.sub)
    .bind(payload.group_id)
    .bind(&payload.text)
    .bind(&payload.image)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::InternalServerError
    })?;

    let post = fetch_post(&pool, post.id).await?;

    Ok(ApiResponse::success(post).created())
}

/// Post detail with its comments, newest first.
/// GET /api/posts/:id
pub async fn get_post(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    get_post_detail(&pool, id).await.map(ApiResponse::success)
}

/// Edit a post. Only the author's edits are applied; anyone else gets the
/// unchanged detail view back, exactly as if they had been redirected to it.
/// PUT /api/posts/:id
pub async fn update_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePost>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT author_id FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let post_author_id: Uuid = row.get("author_id");

    if edit_access(post_author_id, claims.sub) == EditAccess::RedirectToDetail {
        return get_post_detail(&pool, id).await.map(ApiResponse::success);
    }

    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    if let Some(group_id) = payload.group_id {
        sqlx::query("SELECT id FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?
            .ok_or(AppError::NotFound("Group not found".to_string()))?;
    }

    sqlx::query("UPDATE posts SET text = $1, group_id = $2, image = $3 WHERE id = $4")
        .bind(&payload.text)
        .bind(payload.group_id)
        .bind(&payload.image)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::InternalServerError
        })?;

    get_post_detail(&pool, id).await.map(ApiResponse::success)
}

/// Delete a post (author only). Comments go with it.
/// DELETE /api/posts/:id
pub async fn delete_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT author_id FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let post_author_id: Uuid = row.get("author_id");

    if post_author_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::ok("Post deleted".to_string()))
}

/// Fetch a single post with author and group info.
pub(crate) async fn fetch_post(pool: &PgPool, post_id: Uuid) -> Result<PostResponse, AppError> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT
            p.id, p.text, p.image, p.created_at, p.author_id,
            u.username,
            g.id AS group_id, g.slug AS group_slug, g.title AS group_title
        FROM posts p
        JOIN users u ON p.author_id = u.id
        LEFT JOIN groups g ON p.group_id = g.id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Fetch post error: {:?}", e);
        AppError::InternalServerError
    })?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(PostResponse::from(row))
}

async fn get_post_detail(pool: &PgPool, post_id: Uuid) -> Result<PostDetailResponse, AppError> {
    let post = fetch_post(pool, post_id).await?;
    let comments = crate::comments::handler::fetch_post_comments(pool, post_id).await?;

    Ok(PostDetailResponse { post, comments })
}

/// Whether an edit request mutates the post or falls through to the
/// unchanged detail view.
#[derive(Debug, PartialEq)]
pub(crate) enum EditAccess {
    Author,
    RedirectToDetail,
}

pub(crate) fn edit_access(post_author: Uuid, editor: Uuid) -> EditAccess {
    if post_author == editor {
        EditAccess::Author
    } else {
        EditAccess::RedirectToDetail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_edits_are_applied() {
        let author = Uuid::new_v4();
        assert_eq!(edit_access(author, author), EditAccess::Author);
    }

    #[test]
    fn non_author_edits_fall_back_to_the_detail_view() {
        assert_eq!(
            edit_access(Uuid::new_v4(), Uuid::new_v4()),
            EditAccess::RedirectToDetail
        );
    }
}
