//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::helpers::SiteZone;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA zone for the publication clock and naive dates; empty = system local
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,
    pub static_dir: String,
    /// JSON redirect table, relative to the base directory
    pub redirects: String,

    // Writing
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Feed
    pub feed_limit: usize,

    // Locale subdomains
    pub locales: Vec<LocaleConfig>,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            posts_dir: "_posts".to_string(),
            public_dir: "_site".to_string(),
            static_dir: "static".to_string(),
            redirects: "redirects.json".to_string(),

            date_format: "MMMM Do, YYYY".to_string(),
            highlight: HighlightConfig::default(),

            feed_limit: 20,

            locales: vec![
                LocaleConfig::new("fr", "fr_FR"),
                LocaleConfig::new("pt", "pr_BR"),
            ],

            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// The zone used for "now" and for naive `published_at` values
    pub fn zone(&self) -> Result<SiteZone> {
        SiteZone::from_name(&self.timezone)
    }
}

/// A locale served from its own subdomain
///
/// Requests to `<subdomain>.<host>` are served from `<public_dir>/<dir>`, and
/// legacy `/<dir>/<path>` URLs on the main host redirect to the subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub subdomain: String,
    pub dir: String,
}

impl LocaleConfig {
    pub fn new(subdomain: &str, dir: &str) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            dir: dir.to_string(),
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// HTTP server defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "_posts");
        assert_eq!(config.public_dir, "_site");
        assert_eq!(config.date_format, "MMMM Do, YYYY");
        assert_eq!(config.locales.len(), 2);
        assert_eq!(config.locales[0], LocaleConfig::new("fr", "fr_FR"));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
timezone: Europe/Lisbon
feed_limit: 5
locales:
  - subdomain: de
    dir: de_DE
server:
  port: 80
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.feed_limit, 5);
        assert_eq!(config.locales, vec![LocaleConfig::new("de", "de_DE")]);
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.ip, "localhost");
        assert_eq!(config.public_dir, "_site");
        assert!(matches!(config.zone().unwrap(), SiteZone::Named(_)));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From Disk");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "feed_limit: [not a number\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
