//! List posts

use anyhow::Result;
use chrono::{DateTime, FixedOffset};

use crate::content::{ContentLoader, Post, PostCollection};
use crate::Blog;

/// Publication state of a post at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Published,
    Scheduled,
    Draft,
}

impl PostStatus {
    pub fn of(post: &Post, now: &DateTime<FixedOffset>) -> Self {
        match post.published_at {
            None => PostStatus::Draft,
            Some(date) if date > *now => PostStatus::Scheduled,
            Some(_) => PostStatus::Published,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Draft => "draft",
        }
    }
}

/// List published posts, or every post with its status when `all` is set
pub fn run(blog: &Blog, all: bool) -> Result<()> {
    let loader = ContentLoader::new(blog)?;
    let now = blog.now()?;

    if all {
        let posts = loader.load_posts()?;
        println!("Posts ({}):", posts.len());
        for post in &posts {
            println!(
                "  {:<10} {:<12} {} [{}]",
                PostStatus::of(post, &now).label(),
                short_date(post),
                post.display_title(),
                post.slug
            );
        }
    } else {
        let posts: PostCollection = loader.load_published(now)?;
        println!("Published posts ({}):", posts.len());
        for post in &posts {
            println!(
                "  {:<12} {} [{}]",
                short_date(post),
                post.display_title(),
                post.slug
            );
        }
    }

    Ok(())
}

fn short_date(post: &Post) -> String {
    post.published_at
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
