use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    comments::{CommentResponse, CommentRow, CreateComment},
    error::AppError,
    identity::jwt,
    response::ApiResponse,
};

/// Comment on a post as the authenticated caller.
/// POST /api/posts/:id/comments
pub async fn add_comment(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateComment>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    sqlx::query("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let comment = sqlx::query_as::<_, crate::comments::Comment>(
        r#"
        INSERT INTO comments (id, post_id, author_id, text, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(claims.sub)
    .bind(&payload.text)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::InternalServerError
    })?;

    // Re-read with the author joined in
    let comment = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, c.text, c.created_at, c.author_id, u.username
        FROM comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.id = $1
        "#,
    )
    .bind(comment.id)
    .fetch_one(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(CommentResponse::from(comment)).created())
}

/// All comments on a post, newest first.
pub(crate) async fn fetch_post_comments(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Vec<CommentResponse>, AppError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, c.text, c.created_at, c.author_id, u.username
        FROM comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch comments: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(rows.into_iter().map(CommentResponse::from).collect())
}
