//! blogfront: a small blog front end
//!
//! Posts are Markdown files with YAML front matter. At startup they are
//! parsed, drafts and scheduled posts are dropped, and the rest are ordered
//! newest first. The resulting collection is either rendered ahead of time
//! into a static site directory or served on request, alongside legacy-URL
//! redirects and locale subdomains.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

/// The main application context
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Post source directory
    pub posts_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the public directory
    pub static_dir: PathBuf,
    /// JSON redirect table
    pub redirects_path: PathBuf,
}

impl Blog {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let redirects_path = base_dir.join(&config.redirects);

        Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
            static_dir,
            redirects_path,
        }
    }

    /// Current instant on the site clock
    pub fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.config.zone()?.now())
    }

    /// Load the published collection as of now
    pub fn load_published(&self) -> Result<content::PostCollection> {
        let loader = content::ContentLoader::new(self)?;
        loader.load_published(self.now()?)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Remove generated files from the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, slug: Option<&str>, publish: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, slug, publish)
    }
}
