//! URL helper functions

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;

use crate::config::SiteConfig;

/// Characters escaped when a decoded path or URL goes back into a header or URI
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

lazy_static! {
    /// `href="/..."` / `src='/...'` attributes pointing at site-relative paths
    static ref ROOT_RELATIVE_ATTR: Regex =
        Regex::new(r#"(href|src)=(["'])/([^/])"#).expect("valid regex");
}

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about") // -> "https://example.com/blog/about"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of a post page, without extension (`/hello-world`)
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, slug)
}

/// Rewrite root-relative `href`/`src` attributes to absolute URLs on `base_url`
///
/// Protocol-relative URLs (`//cdn...`) are left alone.
pub fn absolutize_urls(html: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    ROOT_RELATIVE_ATTR
        .replace_all(html, |caps: &regex::Captures| {
            format!("{}={}{}/{}", &caps[1], &caps[2], base, &caps[3])
        })
        .into_owned()
}

/// Percent-decode a request path; invalid UTF-8 is replaced lossily
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Percent-encode non-ASCII and unsafe characters; existing escapes are kept
pub fn encode_url(url: &str) -> String {
    utf8_percent_encode(url, URL_UNSAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about"),
            "https://example.com/blog/about"
        );
    }

    #[test]
    fn test_post_path() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "hello-world"), "/hello-world");
    }

    #[test]
    fn test_absolutize_urls() {
        let html = r#"<a href="/about">a</a><img src='/img/x.png'><a href="//cdn.example.com/x">c</a><a href="https://other.org/">o</a>"#;
        let out = absolutize_urls(html, "https://example.com/");
        assert!(out.contains(r#"href="https://example.com/about""#));
        assert!(out.contains("src='https://example.com/img/x.png'"));
        assert!(out.contains(r#"href="//cdn.example.com/x""#));
        assert!(out.contains(r#"href="https://other.org/""#));
    }

    #[test]
    fn test_encode_url() {
        assert_eq!(encode_url("/café au lait"), "/caf%C3%A9%20au%20lait");
        assert_eq!(encode_url("https://example.com/a?b=c"), "https://example.com/a?b=c");
        assert_eq!(encode_url("/already%20encoded"), "/already%20encoded");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
        assert_eq!(decode_path("/plain"), "/plain");
    }
}
