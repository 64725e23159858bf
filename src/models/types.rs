use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 作者（外部身份实体），文章与评论只引用不拥有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

/// 博客文章
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    /// 文章标题
    pub title: String,
    /// 正文
    pub text: String,
    /// URL 别名，不保证唯一
    pub slug: String,
    /// 图片引用，相对于 media_url
    pub image: Option<String>,
    /// 发布时间
    pub published_at: DateTime<Utc>,
    pub author_id: i64,
}

/// 标签，标题始终以小写存储
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub title: String,
}

/// 评论
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// 查询层返回的文章，带有预先计算好的聚合字段
///
/// `total_likes`、`total_comments` 和 `tags` 只有在查询时显式要求才会被填充，
/// 序列化层只读取这些字段，不会再发起查询。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostEntry {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    /// 作者用户名
    pub author: String,
    pub total_likes: Option<i64>,
    pub total_comments: Option<i64>,
    #[sqlx(skip)]
    pub tags: Option<Vec<TagEntry>>,
}

/// 查询层返回的标签，`total_posts` 为带有该标签的不同文章数
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagEntry {
    pub id: i64,
    pub title: String,
    pub total_posts: Option<i64>,
}

/// 评论及其作者用户名
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentEntry {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}
