//! The published collection: drafts and scheduled posts removed, newest first

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::Post;

/// Posts eligible for display, ordered by `published_at` descending
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PostCollection {
    posts: Vec<Post>,
}

impl PostCollection {
    /// Filter and sort `posts` as of `now`
    ///
    /// Posts without `published_at`, or dated strictly after `now`, are
    /// dropped. Posts sharing a timestamp keep their input order.
    pub fn publish(posts: Vec<Post>, now: DateTime<FixedOffset>) -> Self {
        let mut posts: Vec<Post> = posts
            .into_iter()
            .filter(|post| match post.published_at {
                None => {
                    tracing::debug!("Skipping draft: {}", post.slug);
                    false
                }
                Some(date) if date > now => {
                    tracing::debug!("Skipping scheduled post: {} ({})", post.slug, date);
                    false
                }
                Some(_) => true,
            })
            .collect();

        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Self { posts }
    }

    /// All published posts, newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    /// Find a post by slug
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    /// The most recently published post
    pub fn latest(&self) -> Option<&Post> {
        self.posts.first()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a PostCollection {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}
