//! Post model and parser

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{FrontMatter, MarkdownRenderer};
use crate::config::SiteConfig;
use crate::error::PostError;
use crate::helpers::{format_date, parse_date_string, SiteZone};

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// URL-safe identifier taken from the source file name
    pub slug: String,

    /// Post title
    pub title: Option<String>,

    /// Short summary shown on index pages
    pub excerpt: Option<String>,

    /// Open Graph image reference
    pub og_image: Option<String>,

    /// Publication date; `None` marks a draft
    pub published_at: Option<DateTime<FixedOffset>>,

    /// `published_at` in the site's long date format
    pub published_at_pretty: Option<String>,

    /// Rendered HTML content
    pub body: String,
}

impl Post {
    /// Whether the post has a publication date at all
    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }

    /// Whether the post is visible at `now`
    pub fn is_published_at(&self, now: &DateTime<FixedOffset>) -> bool {
        self.published_at.is_some_and(|date| date <= *now)
    }

    /// Title for display, falling back to the slug
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }
}

/// Turns post source documents into [`Post`] records
pub struct PostParser {
    renderer: MarkdownRenderer,
    zone: SiteZone,
    date_format: String,
}

impl PostParser {
    /// Create a parser with explicit settings
    pub fn new(renderer: MarkdownRenderer, zone: SiteZone, date_format: &str) -> Self {
        Self {
            renderer,
            zone,
            date_format: date_format.to_string(),
        }
    }

    /// Create a parser from the site configuration
    pub fn from_config(config: &SiteConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            MarkdownRenderer::with_options(&config.highlight),
            config.zone()?,
            &config.date_format,
        ))
    }

    /// Parse one post document
    ///
    /// No I/O happens here; `slug` is supplied by the caller.
    pub fn parse(&self, slug: &str, source: &str) -> Result<Post, PostError> {
        let (fm, markdown) = FrontMatter::parse(source)?;

        let published_at = fm
            .published_at
            .as_deref()
            .map(|raw| {
                parse_date_string(raw, &self.zone)
                    .ok_or_else(|| PostError::InvalidDate(raw.to_string()))
            })
            .transpose()?;

        let published_at_pretty = published_at
            .as_ref()
            .map(|date| format_date(date, &self.date_format));

        Ok(Post {
            slug: slug.to_string(),
            title: fm.title,
            excerpt: fm.excerpt,
            og_image: fm.og_image,
            published_at,
            published_at_pretty,
            body: self.renderer.render(markdown),
        })
    }
}
