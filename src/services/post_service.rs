//! 文章服务：CRUD、分页、属主检查、正文净化

use crate::{
    auth::guards::{require_ownership, Identity},
    error::AppError,
    models::post::{CreatePostRequest, ListPostsQuery, PostResponse, UpdatePostRequest},
    repository::PostRepository,
    sanitize::{default_sanitizer, HtmlSanitizer},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// 每页文章数
const PAGE_SIZE: i64 = 10;

pub struct PostService {
    db: PgPool,
    sanitizer: Arc<HtmlSanitizer>,
}

impl PostService {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            sanitizer: default_sanitizer(),
        }
    }

    /// 创建文章，作者 = 当前身份
    pub async fn create(
        &self,
        identity: &Identity,
        req: &CreatePostRequest,
    ) -> Result<PostResponse, AppError> {
        let body = self.sanitizer.sanitize(&req.body);

        let post = PostRepository::new(self.db.clone())
            .create(
                &req.title,
                &body,
                &req.tags,
                identity.user_id,
                &identity.username,
            )
            .await?;

        Ok(PostResponse::from(post))
    }

    /// 读取单篇文章
    pub async fn read(&self, id: &Uuid) -> Result<PostResponse, AppError> {
        let post = PostRepository::new(self.db.clone())
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(PostResponse::from(post))
    }

    /// 分页列出文章，返回 (文章, 总页数)
    pub async fn list(
        &self,
        query: &ListPostsQuery,
    ) -> Result<(Vec<PostResponse>, i64), AppError> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest("page must be >= 1".to_string()));
        }

        let repo = PostRepository::new(self.db.clone());
        let username = query.username.as_deref();
        let tag = query.tag.as_deref();

        let posts = repo
            .list(username, tag, PAGE_SIZE, (page - 1) * PAGE_SIZE)
            .await?;
        let count = repo.count(username, tag).await?;

        let last_page = (count + PAGE_SIZE - 1) / PAGE_SIZE;

        Ok((posts.into_iter().map(PostResponse::from).collect(), last_page))
    }

    /// 部分更新文章（属主检查在更新前执行）
    pub async fn update(
        &self,
        identity: &Identity,
        id: &Uuid,
        req: &UpdatePostRequest,
    ) -> Result<PostResponse, AppError> {
        let repo = PostRepository::new(self.db.clone());

        let post = repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        require_ownership(Some(identity), &post.author_id)?;

        let body = req.body.as_deref().map(|b| self.sanitizer.sanitize(b));

        let updated = repo
            .update(*id, req.title.as_deref(), body.as_deref(), req.tags.as_deref())
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(PostResponse::from(updated))
    }

    /// 删除文章（属主检查在删除前执行）
    pub async fn remove(&self, identity: &Identity, id: &Uuid) -> Result<(), AppError> {
        let repo = PostRepository::new(self.db.clone());

        let post = repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        require_ownership(Some(identity), &post.author_id)?;

        repo.delete(*id).await?;

        Ok(())
    }
}
