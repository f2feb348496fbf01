//! Content loader - loads posts from the posts directory

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Post, PostCollection, PostParser};
use crate::Blog;

/// Loads posts from the (flat) posts directory
///
/// Loading is fail-fast: the first unreadable or unparseable file aborts the
/// whole load.
pub struct ContentLoader {
    posts_dir: PathBuf,
    parser: PostParser,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            posts_dir: blog.posts_dir.clone(),
            parser: PostParser::from_config(&blog.config)?,
        })
    }

    /// Create a loader for an arbitrary directory
    pub fn with_parser<P: AsRef<Path>>(posts_dir: P, parser: PostParser) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
            parser,
        }
    }

    /// Load every post, drafts and scheduled posts included, in file-name order
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.posts_dir)
            .with_context(|| format!("failed to read posts directory {:?}", self.posts_dir))?
        {
            let path = entry?.path();
            if path.is_file() && is_markdown_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut seen = HashSet::new();
        let mut posts = Vec::with_capacity(paths.len());

        for path in paths {
            let post = self.load_post(&path)?;
            if !seen.insert(post.slug.clone()) {
                bail!("duplicate post slug `{}` ({:?})", post.slug, path);
            }
            tracing::debug!("Loaded post: {}", post.slug);
            posts.push(post);
        }

        Ok(posts)
    }

    /// Load every post and keep the ones published as of `now`
    pub fn load_published(&self, now: DateTime<FixedOffset>) -> Result<PostCollection> {
        let posts = self.load_posts()?;
        let total = posts.len();
        let collection = PostCollection::publish(posts, now);
        tracing::info!(
            "Loaded {} posts ({} published) from {:?}",
            total,
            collection.len(),
            self.posts_dir
        );
        Ok(collection)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read post {:?}", path))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("post file name is not valid UTF-8: {:?}", path))?;

        self.parser
            .parse(slug, &content)
            .with_context(|| format!("failed to parse post {:?}", path))
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MarkdownRenderer;
    use crate::helpers::{parse_date_string, SiteZone};

    fn loader(dir: &Path) -> ContentLoader {
        let parser = PostParser::new(
            MarkdownRenderer::new(),
            SiteZone::Named(chrono_tz::UTC),
            "MMMM Do, YYYY",
        );
        ContentLoader::with_parser(dir, parser)
    }

    fn now() -> DateTime<FixedOffset> {
        parse_date_string("2025-01-01", &SiteZone::Named(chrono_tz::UTC)).unwrap()
    }

    #[test]
    fn test_load_and_publish() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("old.md"),
            "---\ntitle: Old\npublished_at: 2023-01-01\n---\nold\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("new.markdown"),
            "---\ntitle: New\npublished_at: 2024-06-01\n---\nnew\n",
        )
        .unwrap();
        fs::write(dir.path().join("draft.md"), "---\ntitle: Draft\n---\nwip\n").unwrap();
        fs::write(
            dir.path().join("later.md"),
            "---\ntitle: Later\npublished_at: 2099-01-01\n---\nsoon\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a post").unwrap();

        let loader = loader(dir.path());
        assert_eq!(loader.load_posts().unwrap().len(), 4);

        let collection = loader.load_published(now()).unwrap();
        let slugs: Vec<_> = collection.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
        assert_eq!(
            collection.get("new").unwrap().published_at_pretty.as_deref(),
            Some("June 1st, 2024")
        );
    }

    #[test]
    fn test_load_order_follows_file_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.md", "a.md", "b.md"] {
            fs::write(dir.path().join(name), "---\n---\n").unwrap();
        }
        let posts = loader(dir.path()).load_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_subdirectories_are_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/inner.md"), "---\n---\n").unwrap();
        assert!(loader(dir.path()).load_posts().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_post_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("good.md"),
            "---\npublished_at: 2023-01-01\n---\nok\n",
        )
        .unwrap();
        fs::write(dir.path().join("broken.md"), "---\ntitle: [oops\n---\nx\n").unwrap();

        let err = loader(dir.path()).load_published(now()).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.md"));
    }

    #[test]
    fn test_duplicate_slugs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("same.md"), "---\n---\n").unwrap();
        fs::write(dir.path().join("same.markdown"), "---\n---\n").unwrap();

        let err = loader(dir.path()).load_posts().unwrap_err();
        assert!(err.to_string().contains("duplicate post slug"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(loader(&dir.path().join("nope")).load_posts().is_err());
    }
}
