//! 写入路径：只供 fixture 加载和测试使用，页面查询从不写库。

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqliteConnection};
use tracing::{debug, info};

use crate::error::{BlogError, EntityKind, Result};
use crate::models::{Author, Comment, Post, Tag};
use crate::store::Store;
use crate::utils::slugify;

/// 新文章
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    /// 为空时由标题生成
    pub slug: Option<String>,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub author_id: i64,
    /// 标签标题，不存在的标签会被创建
    pub tags: Vec<String>,
}

/// 新评论
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// 标签标题最长字符数
pub const TAG_TITLE_MAX: usize = 20;
/// 文章标题和 slug 最长字符数
pub const POST_TITLE_MAX: usize = 200;

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(BlogError::TooLong { field, max });
    }
    Ok(())
}

// 以下函数接受任意执行器，既可以直接用连接池，也可以放进同一个事务里

/// 标签标题统一转为小写；同名标签已存在时直接返回它
pub(crate) async fn upsert_tag<'e, E>(executor: E, title: &str) -> Result<Tag>
where
    E: Executor<'e, Database = Sqlite>,
{
    let title = title.trim().to_lowercase();
    check_length("tag title", &title, TAG_TITLE_MAX)?;

    let tag = sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (title) VALUES (?)
        ON CONFLICT (title) DO UPDATE SET title = excluded.title
        RETURNING id, title
        "#,
    )
    .bind(title)
    .fetch_one(executor)
    .await?;

    Ok(tag)
}

pub(crate) async fn insert_author<'e, E>(executor: E, username: &str, is_staff: bool) -> Result<Author>
where
    E: Executor<'e, Database = Sqlite>,
{
    let author = sqlx::query_as::<_, Author>(
        "INSERT INTO authors (username, is_staff) VALUES (?, ?) RETURNING id, username, is_staff",
    )
    .bind(username)
    .bind(is_staff)
    .fetch_one(executor)
    .await?;

    debug!("created author {}", author.username);
    Ok(author)
}

pub(crate) async fn author_by_id<'e, E>(executor: E, author_id: i64) -> Result<Author>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Author>("SELECT id, username, is_staff FROM authors WHERE id = ?")
        .bind(author_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| BlogError::not_found(EntityKind::Author, author_id.to_string()))
}

pub(crate) async fn author_by_username<'e, E>(executor: E, username: &str) -> Result<Author>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Author>("SELECT id, username, is_staff FROM authors WHERE username = ?")
        .bind(username)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| BlogError::not_found(EntityKind::Author, username))
}

/// 写入文章及其标签关联，调用方负责事务
pub(crate) async fn insert_post(conn: &mut SqliteConnection, new_post: NewPost) -> Result<Post> {
    let author = author_by_id(&mut *conn, new_post.author_id).await?;
    if !author.is_staff {
        return Err(BlogError::NotStaff {
            username: author.username,
        });
    }

    let slug = new_post
        .slug
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| slugify(&new_post.title));
    check_length("post title", &new_post.title, POST_TITLE_MAX)?;
    check_length("post slug", &slug, POST_TITLE_MAX)?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, text, slug, image, published_at, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, text, slug, image, published_at, author_id
        "#,
    )
    .bind(&new_post.title)
    .bind(&new_post.text)
    .bind(&slug)
    .bind(&new_post.image)
    .bind(new_post.published_at)
    .bind(author.id)
    .fetch_one(&mut *conn)
    .await?;

    for title in &new_post.tags {
        let tag = upsert_tag(&mut *conn, title).await?;
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post.id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }

    info!("发布文章 '{}' ({}), 作者 {}", post.title, post.slug, author.username);
    Ok(post)
}

/// 返回是否新增了点赞
pub(crate) async fn insert_like<'e, E>(executor: E, post_id: i64, author_id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, author_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(author_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn insert_comment<'e, E>(executor: E, new_comment: NewComment) -> Result<Comment>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text, published_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, post_id, author_id, text, published_at
        "#,
    )
    .bind(new_comment.post_id)
    .bind(new_comment.author_id)
    .bind(&new_comment.text)
    .bind(new_comment.published_at)
    .fetch_one(executor)
    .await?;

    Ok(comment)
}

impl Store {
    pub async fn create_author(&self, username: &str, is_staff: bool) -> Result<Author> {
        insert_author(self.pool(), username, is_staff).await
    }

    pub async fn find_author(&self, author_id: i64) -> Result<Author> {
        author_by_id(self.pool(), author_id).await
    }

    pub async fn find_author_by_username(&self, username: &str) -> Result<Author> {
        author_by_username(self.pool(), username).await
    }

    /// 创建标签（或返回已存在的同名标签），标题以小写存储
    pub async fn create_tag(&self, title: &str) -> Result<Tag> {
        upsert_tag(self.pool(), title).await
    }

    /// 发布文章，作者必须是 staff；文章和标签在同一个事务里写入
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let mut tx = self.pool().begin().await?;
        let post = insert_post(&mut *tx, new_post).await?;
        tx.commit().await?;
        Ok(post)
    }

    /// 点赞；同一账号重复点赞不产生新记录。返回是否新增了点赞
    pub async fn like_post(&self, post_id: i64, author_id: i64) -> Result<bool> {
        insert_like(self.pool(), post_id, author_id).await
    }

    pub async fn add_comment(&self, new_comment: NewComment) -> Result<Comment> {
        insert_comment(self.pool(), new_comment).await
    }

    /// 删除文章，其评论、点赞和标签关联一并删除
    pub async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 删除作者，其文章和评论一并删除
    pub async fn delete_author(&self, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(author_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
