//! Request routing decisions
//!
//! Resolution is a pure function of the request target and the loaded
//! tables, so the whole routing policy is testable without a socket.

use super::RedirectTable;
use crate::config::LocaleConfig;
use crate::content::PostCollection;

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `302 Found` to the given location
    Redirect(String),
    /// Serve a file from the locale's directory under the public dir
    Locale { dir: String },
    /// Render the index view
    Index,
    /// Render the Atom feed
    Feed,
    /// Render the post with this slug
    Post(String),
    /// Serve a file from the public directory
    Static,
    /// Reject without touching the filesystem
    NotFound,
}

/// The parts of a request that routing looks at
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    /// `Host` header, port included
    pub host: Option<&'a str>,
    /// `http` or `https`
    pub scheme: &'a str,
    /// Percent-decoded path
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// Routing tables assembled at startup
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    locales: Vec<LocaleConfig>,
    redirects: RedirectTable,
}

impl RouteTable {
    pub fn new(locales: Vec<LocaleConfig>, redirects: RedirectTable) -> Self {
        Self { locales, redirects }
    }

    /// Decide how to answer `target`
    ///
    /// `posts` is `Some` for the dynamic server; the static server passes
    /// `None` and every non-redirect request becomes a file lookup.
    pub fn resolve(&self, target: &RequestTarget<'_>, posts: Option<&PostCollection>) -> Route {
        let path = target.path;

        if path.split('/').any(|segment| segment == "..") {
            return Route::NotFound;
        }

        if let Some(locale) = target.host.and_then(|host| self.locale_for_host(host)) {
            return Route::Locale {
                dir: locale.dir.clone(),
            };
        }

        if let Some(dest) = self.redirects.lookup(path) {
            return Route::Redirect(dest.to_string());
        }

        if let Some(location) = self.legacy_locale_redirect(target) {
            return Route::Redirect(location);
        }

        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
            return Route::Redirect(with_query(trimmed, target.query));
        }

        if let Some(posts) = posts {
            match path {
                "/" => return Route::Index,
                "/atom.xml" => return Route::Feed,
                _ => {
                    let name = path.trim_start_matches('/');
                    let slug = name.strip_suffix(".html").unwrap_or(name);
                    if !slug.contains('/') && posts.get(slug).is_some() {
                        return Route::Post(slug.to_string());
                    }
                }
            }
        }

        Route::Static
    }

    /// Locale whose subdomain is the first label of `host`
    ///
    /// The remainder must be a registrable domain of at least two labels
    /// (`fr.example.com`, not the apex `fr.com`); `localhost` also counts.
    fn locale_for_host(&self, host: &str) -> Option<&LocaleConfig> {
        let hostname = host.rsplit_once(':').map_or(host, |(name, _)| name);
        let (label, rest) = hostname.split_once('.')?;
        let labels = rest.split('.').filter(|part| !part.is_empty()).count();
        if labels < 2 && !rest.eq_ignore_ascii_case("localhost") {
            return None;
        }
        self.locales
            .iter()
            .find(|locale| locale.subdomain.eq_ignore_ascii_case(label))
    }

    /// `/fr_FR/about` on `example.com` → `http://fr.example.com/about`
    fn legacy_locale_redirect(&self, target: &RequestTarget<'_>) -> Option<String> {
        let host = target.host?;
        self.locales.iter().find_map(|locale| {
            let rest = target.path.strip_prefix('/')?.strip_prefix(locale.dir.as_str())?;
            let rest = match rest {
                "" => "",
                _ => rest.strip_prefix('/')?,
            };
            let location = format!(
                "{}://{}.{}/{}",
                target.scheme, locale.subdomain, host, rest
            );
            Some(with_query(&location, target.query))
        })
    }
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}
