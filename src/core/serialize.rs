//! 序列化层：把查询层的结果映射为供模板使用的扁平记录
//!
//! 这里的函数都是纯函数，只读取查询时已经计算好的聚合字段。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CommentEntry, PostEntry, TagEntry};
use crate::utils::{media_url_for, truncate_chars, TEASER_LENGTH};

/// 标签记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub title: String,
    pub posts_with_tag: i64,
}

/// 文章记录中的标签：只有标题，或者带有文章数的标签记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PostTags {
    Titles(Vec<String>),
    Annotated(Vec<TagRecord>),
}

impl PostTags {
    pub fn len(&self) -> usize {
        match self {
            PostTags::Titles(titles) => titles.len(),
            PostTags::Annotated(tags) => tags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn titles(&self) -> Vec<&str> {
        match self {
            PostTags::Titles(titles) => titles.iter().map(String::as_str).collect(),
            PostTags::Annotated(tags) => tags.iter().map(|tag| tag.title.as_str()).collect(),
        }
    }
}

/// 列表中的文章
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    pub title: String,
    /// 正文前 200 个字符
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: Option<i64>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: PostTags,
}

/// 文章详情
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailRecord {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentRecord>,
    pub likes_amount: Option<i64>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub comments_amount: usize,
    pub tags: PostTags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}

fn image_url(post: &PostEntry, media_url: &str) -> Option<String> {
    post.image
        .as_deref()
        .filter(|image| !image.is_empty())
        .map(|image| media_url_for(media_url, image))
}

/// 所有标签都带有文章数时输出标签记录，否则只输出标题
fn serialize_post_tags(tags: Option<&[TagEntry]>) -> PostTags {
    let tags = tags.unwrap_or_default();
    if tags.iter().all(|tag| tag.total_posts.is_some()) {
        PostTags::Annotated(tags.iter().map(serialize_tag).collect())
    } else {
        PostTags::Titles(tags.iter().map(|tag| tag.title.clone()).collect())
    }
}

pub fn serialize_post(post: &PostEntry, media_url: &str) -> PostRecord {
    PostRecord {
        title: post.title.clone(),
        teaser_text: truncate_chars(&post.text, TEASER_LENGTH).to_string(),
        author: post.author.clone(),
        comments_amount: post.total_comments,
        image_url: image_url(post, media_url),
        published_at: post.published_at,
        slug: post.slug.clone(),
        tags: serialize_post_tags(post.tags.as_deref()),
    }
}

pub fn serialize_tag(tag: &TagEntry) -> TagRecord {
    TagRecord {
        title: tag.title.clone(),
        posts_with_tag: tag.total_posts.unwrap_or_default(),
    }
}

pub fn serialize_comment(comment: &CommentEntry) -> CommentRecord {
    CommentRecord {
        text: comment.text.clone(),
        published_at: comment.published_at,
        author: comment.author.clone(),
    }
}

pub fn serialize_post_detail(
    post: &PostEntry,
    comments: &[CommentEntry],
    media_url: &str,
) -> PostDetailRecord {
    let comments: Vec<CommentRecord> = comments.iter().map(serialize_comment).collect();

    PostDetailRecord {
        title: post.title.clone(),
        text: post.text.clone(),
        author: post.author.clone(),
        comments_amount: comments.len(),
        comments,
        likes_amount: post.total_likes,
        image_url: image_url(post, media_url),
        published_at: post.published_at,
        slug: post.slug.clone(),
        tags: serialize_post_tags(post.tags.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn entry(text: &str, image: Option<&str>) -> PostEntry {
        PostEntry {
            id: 1,
            title: "Title".to_string(),
            text: text.to_string(),
            slug: "title".to_string(),
            image: image.map(str::to_string),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            author: "admin".to_string(),
            total_likes: Some(3),
            total_comments: Some(2),
            tags: None,
        }
    }

    fn tag(title: &str, total_posts: Option<i64>) -> TagEntry {
        TagEntry {
            id: 1,
            title: title.to_string(),
            total_posts,
        }
    }

    #[test]
    fn test_teaser_is_first_200_chars() {
        let text = "a".repeat(150) + &"б".repeat(150);
        let record = serialize_post(&entry(&text, None), "/media/");

        assert_eq!(record.teaser_text.chars().count(), 200);
        assert_eq!(record.teaser_text, text.chars().take(200).collect::<String>());
    }

    #[test]
    fn test_short_teaser_is_whole_text() {
        let record = serialize_post(&entry("short body", None), "/media/");
        assert_eq!(record.teaser_text, "short body");
    }

    #[test]
    fn test_image_url_null_iff_no_image() {
        let without = serialize_post(&entry("x", None), "/media/");
        assert_eq!(without.image_url, None);

        let empty = serialize_post(&entry("x", Some("")), "/media/");
        assert_eq!(empty.image_url, None);

        let with = serialize_post(&entry("x", Some("cat.jpg")), "/media/");
        assert_eq!(with.image_url.as_deref(), Some("/media/cat.jpg"));
    }

    #[test]
    fn test_tags_forms() {
        let mut post = entry("x", None);
        let record = serialize_post(&post, "/media/");
        assert!(record.tags.is_empty());

        post.tags = Some(vec![tag("rust", None), tag("web", None)]);
        let record = serialize_post(&post, "/media/");
        assert_eq!(record.tags, PostTags::Titles(vec!["rust".into(), "web".into()]));
        assert_eq!(serde_json::to_value(&record.tags).unwrap(), json!(["rust", "web"]));

        post.tags = Some(vec![tag("rust", Some(4))]);
        let record = serialize_post(&post, "/media/");
        assert_eq!(record.tags.titles(), ["rust"]);
        assert_eq!(
            serde_json::to_value(&record.tags).unwrap(),
            json!([{ "title": "rust", "posts_with_tag": 4 }])
        );
    }

    #[test]
    fn test_post_record_json_shape() {
        let record = serialize_post(&entry("body", Some("a.png")), "/media/");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["title"], "Title");
        assert_eq!(value["author"], "admin");
        assert_eq!(value["comments_amount"], 2);
        assert_eq!(value["image_url"], "/media/a.png");
        assert_eq!(value["slug"], "title");
        assert_eq!(value["published_at"], "2024-05-01T08:30:00Z");
    }

    #[test]
    fn test_serialize_tag() {
        let record = serialize_tag(&tag("python", Some(3)));
        assert_eq!(
            record,
            TagRecord {
                title: "python".to_string(),
                posts_with_tag: 3,
            }
        );
    }

    #[test]
    fn test_post_detail_counts_serialized_comments() {
        let post = entry("full body text", None);
        let comments = vec![
            CommentEntry {
                id: 1,
                post_id: 1,
                text: "first".to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
                author: "reader".to_string(),
            },
            CommentEntry {
                id: 2,
                post_id: 1,
                text: "second".to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
                author: "admin".to_string(),
            },
        ];

        let detail = serialize_post_detail(&post, &comments, "/media/");
        assert_eq!(detail.text, "full body text");
        assert_eq!(detail.comments_amount, 2);
        assert_eq!(detail.likes_amount, Some(3));
        assert_eq!(detail.comments[0].author, "reader");
        assert_eq!(detail.comments[1].text, "second");
    }
}
