//! Remove generated files from the public directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::ContentLoader;
use crate::Blog;

/// Delete `index.html`, `atom.xml` and every `<slug>.html`
///
/// Only files the generator writes are removed; locale directories and
/// copied static assets stay.
pub fn run(blog: &Blog) -> Result<()> {
    if !blog.public_dir.exists() {
        return Ok(());
    }

    let mut targets = vec!["index.html".to_string(), "atom.xml".to_string()];
    if blog.posts_dir.is_dir() {
        let posts = ContentLoader::new(blog)?.load_posts()?;
        targets.extend(posts.iter().map(|post| format!("{}.html", post.slug)));
    }

    for target in targets {
        remove_if_exists(&blog.public_dir.join(target))?;
    }

    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        fs::remove_file(path)?;
        tracing::info!("Deleted: {:?}", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_only_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::create_dir_all(blog.public_dir.join("fr_FR")).unwrap();
        fs::write(blog.posts_dir.join("hello.md"), "---\n---\nhi\n").unwrap();

        for name in ["index.html", "atom.xml", "hello.html", "fr_FR/index.html", "logo.png"] {
            fs::write(blog.public_dir.join(name), "x").unwrap();
        }

        run(&blog).unwrap();

        assert!(!blog.public_dir.join("index.html").exists());
        assert!(!blog.public_dir.join("atom.xml").exists());
        assert!(!blog.public_dir.join("hello.html").exists());
        assert!(blog.public_dir.join("fr_FR/index.html").exists());
        assert!(blog.public_dir.join("logo.png").exists());
    }

    #[test]
    fn test_clean_without_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        run(&blog).unwrap();
    }
}
