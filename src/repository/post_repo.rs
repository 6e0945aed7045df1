//! Post repository (数据库访问层)

use crate::{error::AppError, models::post::Post};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PostRepository {
    db: PgPool,
}

impl PostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建文章（作者标识在创建时内嵌）
    pub async fn create(
        &self,
        title: &str,
        body: &str,
        tags: &[String],
        author_id: Uuid,
        author_username: &str,
    ) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, body, tags, author_id, author_username)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(title)
        .bind(body)
        .bind(tags)
        .bind(author_id)
        .bind(author_username)
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    /// 根据 ID 查找文章
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    /// 分页列出文章，最新在前
    /// 作者名/标签过滤条件与 count 查询保持一致
    pub async fn list(
        &self,
        username: Option<&str>,
        tag: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE ($1::text IS NULL OR author_username = $1)
              AND ($2::text IS NULL OR $2 = ANY(tags))
            ORDER BY published_date DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(username)
        .bind(tag)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(posts)
    }

    /// 统计文章数量（与 list 同样的过滤条件）
    pub async fn count(&self, username: Option<&str>, tag: Option<&str>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE ($1::text IS NULL OR author_username = $1)
              AND ($2::text IS NULL OR $2 = ANY(tags))
            "#
        )
        .bind(username)
        .bind(tag)
        .fetch_one(&self.db)
        .await?
        .get(0);

        Ok(count)
    }

    /// 部分更新文章
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                tags = COALESCE($4, tags)
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(tags)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    /// 删除文章
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
