//! 页面组装：查询、序列化，然后交给渲染器

use serde::Serialize;
use tracing::info;

use crate::core::query::{CommentQuery, PostQuery, TagQuery};
use crate::core::serialize::{
    serialize_post, serialize_post_detail, serialize_tag, PostDetailRecord, PostRecord, TagRecord,
};
use crate::error::Result;
use crate::models::Config;
use crate::store::Store;

/// 可以被渲染的页面上下文
pub trait PageContext: Serialize {
    /// 模板名
    const TEMPLATE: &'static str;
}

/// 首页
#[derive(Debug, Clone, Serialize)]
pub struct HomeContext {
    pub popular_posts: Vec<PostRecord>,
    /// 最新文章
    pub page_posts: Vec<PostRecord>,
    pub popular_tags: Vec<TagRecord>,
}

impl PageContext for HomeContext {
    const TEMPLATE: &'static str = "index.html";
}

/// 文章详情页
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: PostDetailRecord,
    pub popular_tags: Vec<TagRecord>,
    pub popular_posts: Vec<PostRecord>,
}

impl PageContext for PostDetailContext {
    const TEMPLATE: &'static str = "post-details.html";
}

/// 标签筛选页
#[derive(Debug, Clone, Serialize)]
pub struct TagFilterContext {
    pub tag: String,
    pub posts: Vec<PostRecord>,
    pub popular_tags: Vec<TagRecord>,
    pub popular_posts: Vec<PostRecord>,
}

impl PageContext for TagFilterContext {
    const TEMPLATE: &'static str = "posts-list.html";
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactsContext {}

impl PageContext for ContactsContext {
    const TEMPLATE: &'static str = "contacts.html";
}

/// 列表用的文章查询：评论数和带文章数的标签
fn listing(query: PostQuery) -> PostQuery {
    query.with_comment_count().with_tag_post_counts()
}

async fn popular_posts(store: &Store, config: &Config) -> Result<Vec<PostRecord>> {
    let posts = listing(PostQuery::new().popular())
        .limit(config.listing.popular_posts)
        .fetch(store)
        .await?;

    Ok(posts
        .iter()
        .map(|post| serialize_post(post, &config.media_url))
        .collect())
}

async fn popular_tags(store: &Store, config: &Config) -> Result<Vec<TagRecord>> {
    let tags = TagQuery::new()
        .popular()
        .limit(config.listing.popular_tags)
        .fetch(store)
        .await?;

    Ok(tags.iter().map(serialize_tag).collect())
}

pub async fn home(store: &Store, config: &Config) -> Result<HomeContext> {
    let popular_posts = popular_posts(store, config).await?;

    let page_posts: Vec<PostRecord> = listing(PostQuery::new().fresh())
        .limit(config.listing.fresh_posts)
        .fetch(store)
        .await?
        .iter()
        .map(|post| serialize_post(post, &config.media_url))
        .collect();

    let popular_tags = popular_tags(store, config).await?;

    info!("assembled home page");
    Ok(HomeContext {
        popular_posts,
        page_posts,
        popular_tags,
    })
}

/// 按 slug 查找文章，找不到时返回 NotFound
pub async fn post_detail(store: &Store, config: &Config, slug: &str) -> Result<PostDetailContext> {
    let post = PostQuery::new()
        .slug(slug)
        .with_like_count()
        .with_tag_post_counts()
        .fetch_one(store)
        .await?;

    let comments = CommentQuery::for_post(post.id).fetch(store).await?;
    let post = serialize_post_detail(&post, &comments, &config.media_url);

    let popular_tags = popular_tags(store, config).await?;
    let popular_posts = popular_posts(store, config).await?;

    info!("assembled post page '{}'", slug);
    Ok(PostDetailContext {
        post,
        popular_tags,
        popular_posts,
    })
}

/// 按标题查找标签，列出带有该标签的文章
pub async fn tag_filter(store: &Store, config: &Config, tag_title: &str) -> Result<TagFilterContext> {
    let tag = TagQuery::new().by_title(tag_title).fetch_one(store).await?;

    let posts: Vec<PostRecord> = listing(PostQuery::new().tagged(tag.id))
        .limit(config.listing.tag_posts)
        .fetch(store)
        .await?
        .iter()
        .map(|post| serialize_post(post, &config.media_url))
        .collect();

    let popular_tags = popular_tags(store, config).await?;
    let popular_posts = popular_posts(store, config).await?;

    info!("assembled tag page '{}'", tag.title);
    Ok(TagFilterContext {
        tag: tag.title,
        posts,
        popular_tags,
        popular_posts,
    })
}

pub fn contacts() -> ContactsContext {
    ContactsContext::default()
}
