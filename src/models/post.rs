//! Post domain models
//! 文章在创建时内嵌作者标识，属主检查只比较该标识

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published_date: DateTime<Utc>,

    // 创建时内嵌的作者快照
    pub author_id: Uuid,
    pub author_username: String,
}

/// Create post request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub tags: Vec<String>,
}

/// Update post request（部分更新，缺省字段保持不变）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub username: Option<String>,
    pub tag: Option<String>,
    pub page: Option<i64>,
}

/// 文章作者（响应内嵌）
#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub username: String,
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published_date: DateTime<Utc>,
    pub user: PostAuthor,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            tags: post.tags,
            published_date: post.published_date,
            user: PostAuthor {
                id: post.author_id,
                username: post.author_username,
            },
        }
    }
}
