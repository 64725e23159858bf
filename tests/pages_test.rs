mod common;

use common::Blog;
use rust_blog::core::pages;
use rust_blog::core::PostTags;
use rust_blog::store::NewPost;
use rust_blog::theme::render_page;
use rust_blog::{BlogError, Config, EntityKind, Result, ThemeRenderer};

/// 7 篇文章，点赞数依次递增；带标签和评论
async fn populated_blog() -> Result<Blog> {
    let blog = Blog::new(7).await?;
    for i in 1..=7 {
        let tags: &[&str] = if i % 2 == 0 { &["Python", "even"] } else { &["odd"] };
        let post = blog.post(&format!("Post {}", i), i as u32, tags).await?;
        blog.like(&post, i).await?;
        blog.comment(&post, &blog.readers[0], "nice", i as u32, 12).await?;
    }
    Ok(blog)
}

#[tokio::test]
async fn home_page_context() -> Result<()> {
    let blog = populated_blog().await?;
    let config = Config::default();

    let before = blog.store.queries_issued();
    let home = pages::home(&blog.store, &config).await?;
    assert_eq!(blog.store.queries_issued() - before, 5);

    let popular: Vec<&str> = home.popular_posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(popular, ["Post 7", "Post 6", "Post 5", "Post 4", "Post 3"]);

    let fresh: Vec<&str> = home.page_posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(fresh, ["Post 7", "Post 6", "Post 5", "Post 4", "Post 3"]);

    assert!(home.popular_posts.iter().all(|p| p.comments_amount == Some(1)));
    assert_eq!(home.popular_tags.len(), 3);
    assert_eq!(home.popular_tags[0].title, "odd");
    assert_eq!(home.popular_tags[0].posts_with_tag, 4);

    match &home.popular_posts[1].tags {
        PostTags::Annotated(tags) => {
            let view: Vec<(&str, i64)> = tags.iter().map(|t| (t.title.as_str(), t.posts_with_tag)).collect();
            assert_eq!(view, [("even", 3), ("python", 3)]);
        }
        other => panic!("expected annotated tags, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn page_query_count_does_not_grow_with_data() -> Result<()> {
    let config = Config::default();

    let small = Blog::new(1).await?;
    let post = small.post("Only", 1, &["one"]).await?;
    small.comment(&post, &small.readers[0], "hi", 1, 10).await?;

    let large = populated_blog().await?;
    for i in 8..=20 {
        large.post(&format!("Post {}", i), i, &["python", "bulk"]).await?;
    }

    for blog in [&small, &large] {
        let before = blog.store.queries_issued();
        pages::home(&blog.store, &config).await?;
        assert_eq!(blog.store.queries_issued() - before, 5);
    }

    let before = small.store.queries_issued();
    pages::post_detail(&small.store, &config, "only").await?;
    assert_eq!(small.store.queries_issued() - before, 6);

    let before = large.store.queries_issued();
    pages::post_detail(&large.store, &config, "post-2").await?;
    assert_eq!(large.store.queries_issued() - before, 6);

    let before = large.store.queries_issued();
    pages::tag_filter(&large.store, &config, "python").await?;
    assert_eq!(large.store.queries_issued() - before, 6);
    Ok(())
}

#[tokio::test]
async fn post_detail_context() -> Result<()> {
    let blog = Blog::new(3).await?;
    let post = blog
        .store
        .create_post(NewPost {
            title: "Illustrated".to_string(),
            text: "x".repeat(500),
            slug: Some("illustrated".to_string()),
            image: Some("cover.png".to_string()),
            published_at: common::at(3, 9),
            author_id: blog.admin.id,
            tags: vec!["Art".to_string()],
        })
        .await?;
    blog.like(&post, 3).await?;
    blog.comment(&post, &blog.readers[2], "second", 4, 12).await?;
    blog.comment(&post, &blog.readers[1], "first", 4, 8).await?;

    let config = Config::default();
    let page = pages::post_detail(&blog.store, &config, "illustrated").await?;

    assert_eq!(page.post.title, "Illustrated");
    assert_eq!(page.post.text.len(), 500);
    assert_eq!(page.post.likes_amount, Some(3));
    assert_eq!(page.post.comments_amount, 2);
    assert_eq!(page.post.comments[0].text, "first");
    assert_eq!(page.post.comments[0].author, "reader1");
    assert_eq!(page.post.image_url.as_deref(), Some("/media/cover.png"));
    assert_eq!(page.post.tags.titles(), ["art"]);
    assert_eq!(page.popular_posts.len(), 1);
    assert_eq!(page.popular_posts[0].teaser_text.chars().count(), 200);
    assert_eq!(page.popular_tags[0].title, "art");
    Ok(())
}

#[tokio::test]
async fn post_detail_unknown_slug_is_not_found() -> Result<()> {
    let blog = populated_blog().await?;
    let config = Config::default();

    let before = blog.store.queries_issued();
    let err = pages::post_detail(&blog.store, &config, "no-such-post").await.unwrap_err();

    assert!(matches!(
        err,
        BlogError::NotFound { kind: EntityKind::Post, ref key } if key == "no-such-post"
    ));
    // 找不到文章时不再查询侧栏
    assert_eq!(blog.store.queries_issued() - before, 1);
    Ok(())
}

#[tokio::test]
async fn tag_filter_returns_tagged_posts() -> Result<()> {
    let blog = Blog::new(0).await?;
    blog.post("First python", 1, &["Python"]).await?;
    blog.post("Second python", 2, &["python", "web"]).await?;
    blog.post("Third python", 3, &["PYTHON"]).await?;
    blog.post("Unrelated", 4, &["go"]).await?;

    let config = Config::default();
    let page = pages::tag_filter(&blog.store, &config, "python").await?;

    assert_eq!(page.tag, "python");
    let titles: Vec<&str> = page.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Third python", "Second python", "First python"]);
    assert_eq!(page.popular_tags[0].title, "python");
    assert_eq!(page.popular_tags[0].posts_with_tag, 3);
    Ok(())
}

#[tokio::test]
async fn tag_filter_caps_posts() -> Result<()> {
    let blog = Blog::new(0).await?;
    for day in 1..=25 {
        blog.post(&format!("Post {}", day), day, &["bulk"]).await?;
    }

    let config = Config::default();
    let page = pages::tag_filter(&blog.store, &config, "bulk").await?;
    assert_eq!(page.posts.len(), 20);
    assert_eq!(page.posts[0].title, "Post 25");
    Ok(())
}

#[tokio::test]
async fn tag_filter_unknown_tag_is_not_found() -> Result<()> {
    let blog = Blog::new(0).await?;
    let err = pages::tag_filter(&blog.store, &Config::default(), "nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::NotFound { kind: EntityKind::Tag, .. }));
    Ok(())
}

#[tokio::test]
async fn pages_render_with_builtin_theme() -> Result<()> {
    let blog = populated_blog().await?;
    let config = Config::default();
    let renderer = ThemeRenderer::builtin()?;

    let home = render_page(&renderer, &pages::home(&blog.store, &config).await?)?;
    assert!(home.contains("Post 7"));
    assert!(home.contains("/tags/python/"));

    let detail = render_page(&renderer, &pages::post_detail(&blog.store, &config, "post-4").await?)?;
    assert!(detail.contains("<h1>Post 4</h1>"));
    assert!(detail.contains("Comments (1)"));

    let tag = render_page(&renderer, &pages::tag_filter(&blog.store, &config, "even").await?)?;
    assert!(tag.contains("Posts tagged #even"));
    assert!(tag.contains("Post 6"));

    let contacts = render_page(&renderer, &pages::contacts())?;
    assert!(contacts.contains("Contacts"));
    Ok(())
}
