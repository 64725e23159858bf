//! 查询层：文章、标签、评论的只读查询构造器
//!
//! 每个构造器最多发出固定次数的查询：文章本身一次，需要标签时再批量查一次，
//! 不会对每一行单独查询。

use std::collections::HashMap;

use tracing::debug;

use crate::error::{BlogError, EntityKind, Result};
use crate::models::{CommentEntry, PostEntry, TagEntry};
use crate::store::Store;

/// 文章排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// 默认排序：发布时间倒序
    #[default]
    Default,
    /// 按不同点赞用户数倒序，相同时按 id 升序
    Popular,
    /// 按发布时间倒序
    Fresh,
}

impl PostOrder {
    fn to_sql(self) -> &'static str {
        match self {
            PostOrder::Popular => "total_likes DESC, p.id ASC",
            PostOrder::Default | PostOrder::Fresh => "p.published_at DESC, p.id DESC",
        }
    }
}

/// 文章附带的标签要加载到什么程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TagPrefetch {
    #[default]
    None,
    Titles,
    WithPostCounts,
}

/// 文章查询
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    order: PostOrder,
    slug: Option<String>,
    tag_id: Option<i64>,
    like_count: bool,
    comment_count: bool,
    tags: TagPrefetch,
    limit: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    title: String,
    total_posts: Option<i64>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按点赞数排序（同时带上点赞数）
    pub fn popular(mut self) -> Self {
        self.order = PostOrder::Popular;
        self.like_count = true;
        self
    }

    /// 按发布时间倒序
    pub fn fresh(mut self) -> Self {
        self.order = PostOrder::Fresh;
        self
    }

    pub fn with_like_count(mut self) -> Self {
        self.like_count = true;
        self
    }

    pub fn with_comment_count(mut self) -> Self {
        self.comment_count = true;
        self
    }

    /// 带上标签标题
    pub fn with_tags(mut self) -> Self {
        if self.tags == TagPrefetch::None {
            self.tags = TagPrefetch::Titles;
        }
        self
    }

    /// 带上标签，以及每个标签下的文章总数
    pub fn with_tag_post_counts(mut self) -> Self {
        self.tags = TagPrefetch::WithPostCounts;
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    /// 只要带有该标签的文章
    pub fn tagged(mut self, tag_id: i64) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(&self) -> PostOrder {
        self.order
    }

    fn to_sql(&self) -> String {
        let likes = if self.like_count {
            "COUNT(DISTINCT l.author_id)"
        } else {
            "NULL"
        };
        let comments = if self.comment_count {
            "COUNT(DISTINCT c.id)"
        } else {
            "NULL"
        };

        let mut sql = format!(
            r#"SELECT
                p.id,
                p.title,
                p.text,
                p.slug,
                p.image,
                p.published_at,
                a.username AS author,
                {} AS total_likes,
                {} AS total_comments
            FROM posts p
            JOIN authors a ON a.id = p.author_id"#,
            likes, comments
        );

        if self.like_count {
            sql.push_str("\n            LEFT JOIN post_likes l ON l.post_id = p.id");
        }
        if self.comment_count {
            sql.push_str("\n            LEFT JOIN comments c ON c.post_id = p.id");
        }

        let mut conditions = Vec::new();
        if self.slug.is_some() {
            conditions.push("p.slug = ?");
        }
        if self.tag_id.is_some() {
            conditions.push("p.id IN (SELECT post_id FROM post_tags WHERE tag_id = ?)");
        }
        if !conditions.is_empty() {
            sql.push_str("\n            WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str("\n            GROUP BY p.id");
        sql.push_str("\n            ORDER BY ");
        sql.push_str(self.order.to_sql());

        if self.limit.is_some() {
            sql.push_str("\n            LIMIT ?");
        }

        sql
    }

    /// 执行查询
    pub async fn fetch(&self, store: &Store) -> Result<Vec<PostEntry>> {
        let sql = self.to_sql();

        let mut query = sqlx::query_as::<_, PostEntry>(&sql);
        if let Some(slug) = &self.slug {
            query = query.bind(slug.as_str());
        }
        if let Some(tag_id) = self.tag_id {
            query = query.bind(tag_id);
        }
        if let Some(limit) = self.limit {
            query = query.bind(limit);
        }

        store.record_query("posts");
        let mut posts = query.fetch_all(store.pool()).await?;

        if self.tags != TagPrefetch::None {
            self.attach_tags(store, &mut posts).await?;
        }

        debug!("fetched {} posts ({:?})", posts.len(), self.order);
        Ok(posts)
    }

    /// 取第一篇文章，没有匹配时返回 NotFound
    pub async fn fetch_one(&self, store: &Store) -> Result<PostEntry> {
        let key = match (&self.slug, self.tag_id) {
            (Some(slug), _) => slug.clone(),
            (None, Some(tag_id)) => format!("tag #{}", tag_id),
            (None, None) => "*".to_string(),
        };

        self.clone()
            .limit(1)
            .fetch(store)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, key))
    }

    /// 所有文章 slug（去重，按字母序）
    pub async fn all_slugs(store: &Store) -> Result<Vec<String>> {
        store.record_query("post_slugs");
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT slug FROM posts ORDER BY slug")
            .fetch_all(store.pool())
            .await?;

        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    /// 用一次查询为整页文章加载标签
    async fn attach_tags(&self, store: &Store, posts: &mut [PostEntry]) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let total_posts = match self.tags {
            TagPrefetch::WithPostCounts => {
                "(SELECT COUNT(DISTINCT x.post_id) FROM post_tags x WHERE x.tag_id = t.id)"
            }
            _ => "NULL",
        };
        let sql = format!(
            r#"SELECT
                pt.post_id,
                t.id,
                t.title,
                {} AS total_posts
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id IN (SELECT value FROM json_each(?))
            ORDER BY t.title ASC"#,
            total_posts
        );

        // json_each 接收 JSON 数组，整页文章 id 只需绑定一个参数
        let ids: Vec<String> = posts.iter().map(|post| post.id.to_string()).collect();
        let ids = format!("[{}]", ids.join(","));

        store.record_query("post_tags");
        let rows = sqlx::query_as::<_, PostTagRow>(&sql)
            .bind(ids)
            .fetch_all(store.pool())
            .await?;

        let mut by_post: HashMap<i64, Vec<TagEntry>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(TagEntry {
                id: row.id,
                title: row.title,
                total_posts: row.total_posts,
            });
        }

        for post in posts.iter_mut() {
            post.tags = Some(by_post.remove(&post.id).unwrap_or_default());
        }

        Ok(())
    }
}

/// 标签查询，结果总是带有文章数
#[derive(Debug, Clone, Default)]
pub struct TagQuery {
    popular: bool,
    title: Option<String>,
    limit: Option<i64>,
}

impl TagQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按不同文章数倒序，相同时按标题
    pub fn popular(mut self) -> Self {
        self.popular = true;
        self
    }

    /// 按标题精确查找
    ///
    /// 标题总是以小写存储，所以查找键先转为小写，`PYTHON` 与 `python` 是同一个标签。
    /// 除大小写外不做其他规范化，带空白的键不会命中。
    pub fn by_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_lowercase());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub async fn fetch(&self, store: &Store) -> Result<Vec<TagEntry>> {
        let mut sql = String::from(
            r#"SELECT
                t.id,
                t.title,
                COUNT(DISTINCT pt.post_id) AS total_posts
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id"#,
        );
        if self.title.is_some() {
            sql.push_str("\n            WHERE t.title = ?");
        }
        sql.push_str("\n            GROUP BY t.id");
        sql.push_str(if self.popular {
            "\n            ORDER BY total_posts DESC, t.title ASC"
        } else {
            "\n            ORDER BY t.title ASC"
        });
        if self.limit.is_some() {
            sql.push_str("\n            LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, TagEntry>(&sql);
        if let Some(title) = &self.title {
            query = query.bind(title.as_str());
        }
        if let Some(limit) = self.limit {
            query = query.bind(limit);
        }

        store.record_query("tags");
        let tags = query.fetch_all(store.pool()).await?;
        Ok(tags)
    }

    pub async fn fetch_one(&self, store: &Store) -> Result<TagEntry> {
        let key = self.title.clone().unwrap_or_else(|| "*".to_string());

        self.clone()
            .limit(1)
            .fetch(store)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BlogError::not_found(EntityKind::Tag, key))
    }
}

/// 评论查询
#[derive(Debug, Clone, Copy)]
pub struct CommentQuery {
    post_id: i64,
}

impl CommentQuery {
    /// 某篇文章的评论，按发布时间升序
    pub fn for_post(post_id: i64) -> Self {
        Self { post_id }
    }

    pub async fn fetch(&self, store: &Store) -> Result<Vec<CommentEntry>> {
        store.record_query("comments");
        let comments = sqlx::query_as::<_, CommentEntry>(
            r#"
            SELECT c.id, c.post_id, c.text, c.published_at, a.username AS author
            FROM comments c
            JOIN authors a ON a.id = c.author_id
            WHERE c.post_id = ?
            ORDER BY c.published_at ASC, c.id ASC
            "#,
        )
        .bind(self.post_id)
        .fetch_all(store.pool())
        .await?;

        Ok(comments)
    }
}
