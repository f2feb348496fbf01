//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded directly in the binary. Post bodies are
//! inserted unescaped; every other string is escaped in the template.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostCollection};
use crate::helpers::{
    absolutize_urls, full_url_for, post_path, strip_html, strip_invalid_xml_chars, truncate,
};

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
    config: SiteConfig,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Escaping is explicit in the templates; bodies are trusted HTML
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
            ("atom.xml", include_str!("default/atom.xml")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self {
            tera,
            config: config.clone(),
            site: SiteData::from_config(config),
        })
    }

    /// Render the index page listing every published post
    pub fn render_index(&self, posts: &PostCollection) -> Result<String> {
        let views: Vec<PostView> = posts.iter().map(|p| self.post_view(p)).collect();

        let mut context = self.base_context();
        context.insert("posts", &views);
        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render a single post page
    pub fn render_post(&self, post: &Post) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &self.post_view(post));
        Ok(self.tera.render("post.html", &context)?)
    }

    /// Render the Atom feed for the newest `feed_limit` posts
    pub fn render_feed(&self, posts: &PostCollection) -> Result<String> {
        let base_url = self.config.url.trim_end_matches('/');

        let entries: Vec<FeedEntry> = posts
            .iter()
            .take(self.config.feed_limit)
            .map(|post| FeedEntry {
                title: post.display_title().to_string(),
                url: full_url_for(&self.config, &post.slug),
                published: post
                    .published_at
                    .map(|date| date.to_rfc3339())
                    .unwrap_or_default(),
                summary: post.excerpt.clone(),
                content: strip_invalid_xml_chars(&absolutize_urls(&post.body, base_url))
                    .replace("]]>", "]]]]><![CDATA[>"),
            })
            .collect();

        let updated = posts
            .latest()
            .and_then(|post| post.published_at)
            .map(|date| date.to_rfc3339())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let mut context = self.base_context();
        context.insert("entries", &entries);
        context.insert("updated", &updated);
        Ok(self.tera.render("atom.xml", &context)?)
    }

    fn post_view<'a>(&self, post: &'a Post) -> PostView<'a> {
        PostView {
            post,
            display_title: post.display_title(),
            url: post_path(&self.config, &post.slug),
        }
    }

    /// Create a base context with common variables
    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
        context
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(s.trim(), length, &omission)))
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// Base URL without a trailing slash
    pub url: String,
    /// Root path, always starting and ending with `/`
    pub root: String,
}

impl SiteData {
    fn from_config(config: &SiteConfig) -> Self {
        let root = config.root.trim_matches('/');
        let root = if root.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", root)
        };

        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            root,
        }
    }
}

/// A post plus the derived values templates need
#[derive(Debug, Serialize)]
struct PostView<'a> {
    #[serde(flatten)]
    post: &'a Post,
    display_title: &'a str,
    url: String,
}

#[derive(Debug, Serialize)]
struct FeedEntry {
    title: String,
    url: String,
    published: String,
    summary: Option<String>,
    content: String,
}
