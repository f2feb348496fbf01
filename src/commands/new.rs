//! Create a new post

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::helpers::format_date;
use crate::Blog;

/// Scaffold `<posts_dir>/<slug>.md`
///
/// The post is a draft unless `publish` is set, in which case `published_at`
/// is stamped with the current date on the site clock.
pub fn create_post(blog: &Blog, title: &str, slug: Option<&str>, publish: bool) -> Result<PathBuf> {
    let slug = match slug {
        Some(slug) => slug::slugify(slug),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&blog.posts_dir)?;
    let file_path = blog.posts_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let published_at = if publish {
        Some(format_date(&blog.now()?, "YYYY-MM-DD"))
    } else {
        None
    };

    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        excerpt: None,
        og_image: None,
        published_at,
    };
    fs::write(&file_path, front_matter.to_document("")?)?;

    println!("Created: {:?}", file_path);
    Ok(file_path)
}
