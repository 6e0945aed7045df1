//! 文章相关的 HTTP 处理器

use crate::{
    auth::guards::Identity,
    error::AppError,
    middleware::AppState,
    models::post::{CreatePostRequest, ListPostsQuery, UpdatePostRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 发表文章（需要登录）
///
/// POST /api/posts
/// { "title": "제목", "body": "내용", "tags": ["태그1", "태그2"] }
pub async fn write(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let post = state.post_service.create(&identity, &req).await?;

    Ok(Json(post))
}

/// 列出文章
///
/// GET /api/posts?username=&tag=&page=
/// 总页数通过 Last-Page 响应头返回
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (posts, last_page) = state.post_service.list(&query).await?;

    Ok(([("last-page", last_page.to_string())], Json(posts)))
}

/// 读取单篇文章
///
/// GET /api/posts/{id}
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.read(&id).await?;

    Ok(Json(post))
}

/// 修改文章（需要登录且为属主）
///
/// PATCH /api/posts/{id}
/// { "title": "수정", "body": "수정 내용", "tags": ["수정"] }
pub async fn update(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let post = state.post_service.update(&identity, &id, &req).await?;

    Ok(Json(post))
}

/// 删除文章（需要登录且为属主）
///
/// DELETE /api/posts/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.post_service.remove(&identity, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
