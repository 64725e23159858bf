#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_blog::store::{NewComment, NewPost};
use rust_blog::{Author, Post, Result, Store};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

/// 一个 staff 作者加若干普通读者
pub struct Blog {
    pub store: Store,
    pub admin: Author,
    pub readers: Vec<Author>,
}

impl Blog {
    pub async fn new(readers: usize) -> Result<Self> {
        let store = Store::in_memory().await?;
        let admin = store.create_author("admin", true).await?;

        let mut created = Vec::with_capacity(readers);
        for i in 0..readers {
            created.push(store.create_author(&format!("reader{}", i), false).await?);
        }

        Ok(Self {
            store,
            admin,
            readers: created,
        })
    }

    pub async fn post(&self, title: &str, day: u32, tags: &[&str]) -> Result<Post> {
        self.store
            .create_post(NewPost {
                title: title.to_string(),
                text: format!("Body of {}", title),
                slug: None,
                image: None,
                published_at: at(day, 9),
                author_id: self.admin.id,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .await
    }

    /// 前 `count` 个读者给文章点赞
    pub async fn like(&self, post: &Post, count: usize) -> Result<()> {
        for reader in self.readers.iter().take(count) {
            self.store.like_post(post.id, reader.id).await?;
        }
        Ok(())
    }

    pub async fn comment(&self, post: &Post, author: &Author, text: &str, day: u32, hour: u32) -> Result<()> {
        self.store
            .add_comment(NewComment {
                post_id: post.id,
                author_id: author.id,
                text: text.to_string(),
                published_at: at(day, hour),
            })
            .await?;
        Ok(())
    }
}
