//! Legacy URL redirect table (redirects.json)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Request path → destination path or absolute URL
///
/// ```json
/// { "/2019/hello.html": "/hello-world", "/talks": "https://talks.example.com" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RedirectTable {
    entries: IndexMap<String, String>,
}

impl RedirectTable {
    /// Load the table from a JSON file; a missing file yields an empty table
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No redirect table at {:?}", path);
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read redirects {:?}", path))
            }
        };

        let table = Self::from_json(&content)
            .with_context(|| format!("failed to parse redirects {:?}", path))?;
        tracing::info!("Loaded {} redirects from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse a table from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Destination for `path`, if any
    ///
    /// `/old/` matches an entry for `/old` and vice versa.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        if let Some(dest) = self.entries.get(path) {
            return Some(dest);
        }

        let alternate = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
            Some(_) => return None,
            None => format!("{}/", path),
        };
        self.entries.get(&alternate).map(String::as_str)
    }

    /// Entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "/2019/01/hello.html": "/hello-world",
        "/talks/": "https://talks.example.com/",
        "/about": "/pages/about"
    }"#;

    #[test]
    fn test_lookup() {
        let table = RedirectTable::from_json(TABLE).unwrap();
        assert_eq!(table.lookup("/2019/01/hello.html"), Some("/hello-world"));
        assert_eq!(table.lookup("/unknown"), None);
        assert_eq!(table.lookup("/"), None);
    }

    #[test]
    fn test_lookup_ignores_trailing_slash() {
        let table = RedirectTable::from_json(TABLE).unwrap();
        assert_eq!(table.lookup("/talks"), Some("https://talks.example.com/"));
        assert_eq!(table.lookup("/about/"), Some("/pages/about"));
    }

    #[test]
    fn test_file_order_is_preserved() {
        let table = RedirectTable::from_json(TABLE).unwrap();
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/2019/01/hello.html", "/talks/", "/about"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = RedirectTable::load(dir.path().join("redirects.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redirects.json");
        fs::write(&path, r#"{ "/a": 1 }"#).unwrap();
        assert!(RedirectTable::load(&path).is_err());

        fs::write(&path, "not json").unwrap();
        assert!(RedirectTable::load(&path).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redirects.json");
        fs::write(&path, TABLE).unwrap();
        assert_eq!(RedirectTable::load(&path).unwrap().len(), 3);
    }
}
