use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use slug::slugify;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    groups::{CreateGroup, Group, GroupPostsResponse},
    identity::jwt,
    pagination::{Page, PageQuery, PAGE_SIZE},
    posts::{PostResponse, PostRow},
    response::ApiResponse,
};

/// List every group, alphabetically.
/// GET /api/groups
pub async fn get_groups(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let groups = sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY title ASC")
        .fetch_all(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(groups))
}

/// Create a group. The slug is derived from the title; a colliding slug is a
/// conflict rather than a silent rename.
/// POST /api/groups
pub async fn create_group(
    State(pool): State<PgPool>,
    _claims: jwt::Claims,
    Json(payload): Json<CreateGroup>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let slug = slugify(&payload.title);

    let group = sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO groups (id, slug, title, description)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&slug)
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e: sqlx::Error| {
        if e.to_string().contains("duplicate key value") {
            AppError::Conflict("A group with this slug already exists".to_string())
        } else {
            tracing::error!("Failed to create group: {:?}", e);
            AppError::InternalServerError
        }
    })?;

    Ok(ApiResponse::success(group).created())
}

/// Posts in a group, newest first.
/// GET /api/groups/:slug/posts?page=N
pub async fn get_group_posts(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Group not found".to_string()))?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
        .bind(group.id)
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
        JOIN groups g ON p.group_id = g.id
        WHERE g.id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(group.id)
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Group feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let posts: Vec<PostResponse> = rows.into_iter().map(PostResponse::from).collect();

    Ok(ApiResponse::success(GroupPostsResponse {
        group,
        posts: Page::new(posts, page, total),
    }))
}
