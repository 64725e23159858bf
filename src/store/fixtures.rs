use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::{BlogError, Result};
use sqlx::SqliteConnection;

use crate::store::authoring::{
    author_by_username, insert_author, insert_comment, insert_like, insert_post, upsert_tag,
};
use crate::store::{NewComment, NewPost, Store};

/// YAML fixture 文件，用于初始化站点数据
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub authors: Vec<AuthorFixture>,
    /// 没有文章也要存在的标签
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub posts: Vec<PostFixture>,
    #[serde(default)]
    pub comments: Vec<CommentFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorFixture {
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostFixture {
    pub title: String,
    pub text: String,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    /// 作者用户名
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 点赞用户名
    #[serde(default)]
    pub likes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentFixture {
    /// 文章 slug
    pub post: String,
    pub author: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// 加载结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSummary {
    pub authors: usize,
    pub tags: usize,
    pub posts: usize,
    pub likes: usize,
    pub comments: usize,
}

/// 先在本 fixture 创建的作者中查找，再查数据库中已有的作者
async fn resolve_author(
    conn: &mut SqliteConnection,
    created: &HashMap<String, i64>,
    username: &str,
) -> Result<i64> {
    if let Some(id) = created.get(username) {
        return Ok(*id);
    }

    match author_by_username(conn, username).await {
        Ok(author) => Ok(author.id),
        Err(e) if e.is_not_found() => {
            Err(BlogError::Fixture(format!("unknown author '{}'", username)))
        }
        Err(e) => Err(e),
    }
}

impl Fixture {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BlogError::Fixture(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BlogError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// 通过写入路径把 fixture 写进存储
    ///
    /// 整个 fixture 在一个事务里写入：任何一条失败，之前写入的数据全部回滚。
    pub async fn apply(&self, store: &Store) -> Result<FixtureSummary> {
        let mut tx = store.pool().begin().await?;
        let summary = self.apply_on(&mut *tx).await?;
        tx.commit().await?;

        info!(
            "fixture loaded: {} authors, {} posts, {} likes, {} comments",
            summary.authors, summary.posts, summary.likes, summary.comments
        );
        Ok(summary)
    }

    async fn apply_on(&self, conn: &mut SqliteConnection) -> Result<FixtureSummary> {
        let mut summary = FixtureSummary::default();
        let mut authors = HashMap::new();

        for author in &self.authors {
            let created = insert_author(&mut *conn, &author.username, author.is_staff).await?;
            authors.insert(created.username.clone(), created.id);
            summary.authors += 1;
        }

        for title in &self.tags {
            upsert_tag(&mut *conn, title).await?;
            summary.tags += 1;
        }

        let mut posts_by_slug: HashMap<String, i64> = HashMap::new();
        for post in &self.posts {
            let author_id = resolve_author(conn, &authors, &post.author).await?;
            let created = insert_post(
                conn,
                NewPost {
                    title: post.title.clone(),
                    text: post.text.clone(),
                    slug: post.slug.clone(),
                    image: post.image.clone(),
                    published_at: post.published_at,
                    author_id,
                    tags: post.tags.clone(),
                },
            )
            .await?;

            for liker in &post.likes {
                let liker_id = resolve_author(conn, &authors, liker).await?;
                if insert_like(&mut *conn, created.id, liker_id).await? {
                    summary.likes += 1;
                }
            }

            posts_by_slug.entry(created.slug).or_insert(created.id);
            summary.posts += 1;
        }

        for comment in &self.comments {
            let post_id = posts_by_slug
                .get(&comment.post)
                .copied()
                .ok_or_else(|| BlogError::Fixture(format!("unknown post '{}'", comment.post)))?;
            let author_id = resolve_author(conn, &authors, &comment.author).await?;

            insert_comment(
                &mut *conn,
                NewComment {
                    post_id,
                    author_id,
                    text: comment.text.clone(),
                    published_at: comment.published_at,
                },
            )
            .await?;
            summary.comments += 1;
        }

        Ok(summary)
    }
}
