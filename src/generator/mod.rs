//! Generator module - writes the static site from the published collection

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::content::PostCollection;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Static site generator
pub struct Generator {
    public_dir: PathBuf,
    static_dir: PathBuf,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            public_dir: blog.public_dir.clone(),
            static_dir: blog.static_dir.clone(),
            renderer: TemplateRenderer::new(&blog.config)?,
        })
    }

    /// Generate the entire site
    ///
    /// Returns the paths written, static assets excluded.
    pub fn generate(&self, posts: &PostCollection) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.public_dir)
            .with_context(|| format!("failed to create {:?}", self.public_dir))?;

        self.copy_static_assets()?;

        let mut written = Vec::with_capacity(posts.len() + 2);

        let index = self.renderer.render_index(posts)?;
        written.push(self.write("index.html", &index)?);

        for post in posts {
            let html = self
                .renderer
                .render_post(post)
                .with_context(|| format!("failed to render post `{}`", post.slug))?;
            written.push(self.write(&format!("{}.html", post.slug), &html)?);
        }

        let feed = self.renderer.render_feed(posts)?;
        written.push(self.write("atom.xml", &feed)?);
        tracing::info!("Generated atom.xml");

        Ok(written)
    }

    fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let output_path = self.public_dir.join(relative);
        fs::write(&output_path, contents)
            .with_context(|| format!("failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    /// Copy the static asset directory into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        if !self.static_dir.is_dir() {
            return Ok(());
        }

        let mut copied = 0usize;
        for entry in WalkDir::new(&self.static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.static_dir)?;
            let dest = self.public_dir.join(relative);
            copy_file(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files from {:?}", copied, self.static_dir);
        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}
