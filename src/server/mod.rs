//! HTTP server: static files, redirects, locale subdomains and post views

mod redirects;
mod routes;

pub use redirects::RedirectTable;
pub use routes::{RequestTarget, Route, RouteTable};

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::PostCollection;
use crate::helpers::{decode_path, encode_url};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Which of the two server variants to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Render posts from the in-memory collection
    Dynamic,
    /// Serve only the pre-rendered public directory
    Static,
}

/// Posts and views for the dynamic variant
struct SiteView {
    posts: PostCollection,
    renderer: TemplateRenderer,
}

/// Server state
struct ServerState {
    public_dir: PathBuf,
    routes: RouteTable,
    site: Option<SiteView>,
}

/// Load everything the server needs and start listening
///
/// Any load failure (posts, templates, redirect table) aborts before binding.
pub async fn start(blog: &Blog, ip: &str, port: u16, mode: ServeMode) -> Result<()> {
    let app = router(blog, mode)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "{:?} server running at http://{}:{} (Ctrl+C to stop)",
        mode,
        ip,
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router for `blog`
pub fn router(blog: &Blog, mode: ServeMode) -> Result<Router> {
    let redirects = RedirectTable::load(&blog.redirects_path)?;
    let routes = RouteTable::new(blog.config.locales.clone(), redirects);

    let site = match mode {
        ServeMode::Dynamic => Some(SiteView {
            posts: blog.load_published()?,
            renderer: TemplateRenderer::new(&blog.config)?,
        }),
        ServeMode::Static => None,
    };

    if !blog.public_dir.is_dir() {
        tracing::warn!(
            "Public directory {:?} does not exist; static files will 404",
            blog.public_dir
        );
    }

    let state = Arc::new(ServerState {
        public_dir: blog.public_dir.clone(),
        routes,
        site,
    });

    Ok(Router::new()
        .fallback(handle_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down");
}

/// Single entry point: resolve a route, then act on it
async fn handle_request(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let headers = request.headers();
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()));
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|proto| *proto == "http" || *proto == "https")
        .unwrap_or("http")
        .to_string();
    let path = decode_path(request.uri().path());
    let query = request.uri().query().map(str::to_string);

    let target = RequestTarget {
        host: host.as_deref(),
        scheme: &scheme,
        path: &path,
        query: query.as_deref(),
    };
    let route = state
        .routes
        .resolve(&target, state.site.as_ref().map(|site| &site.posts));
    tracing::debug!("{} -> {:?}", path, route);

    match route {
        Route::Redirect(location) => found(&location),
        Route::Index => render_view(&state, |site| site.renderer.render_index(&site.posts)),
        Route::Feed => match state
            .site
            .as_ref()
            .map(|site| site.renderer.render_feed(&site.posts))
        {
            Some(Ok(xml)) => (
                [(header::CONTENT_TYPE, "application/atom+xml; charset=utf-8")],
                xml,
            )
                .into_response(),
            Some(Err(e)) => internal_error(e),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Route::Post(slug) => render_view(&state, |site| match site.posts.get(&slug) {
            Some(post) => site.renderer.render_post(post).map(Some),
            None => Ok(None),
        }),
        Route::Locale { dir } => serve_static(&state.public_dir.join(dir), request).await,
        Route::Static => serve_static(&state.public_dir, request).await,
        Route::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run a dynamic view; `Ok(None)` and the static variant answer 404
fn render_view<F, T>(state: &ServerState, render: F) -> Response
where
    F: FnOnce(&SiteView) -> Result<T>,
    T: Into<Option<String>>,
{
    let Some(site) = state.site.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match render(site).map(Into::<Option<String>>::into) {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// `302 Found` to `location`
fn found(location: &str) -> Response {
    match HeaderValue::from_str(&encode_url(location)) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!("Invalid redirect location {:?}: {}", location, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Serve a file under `root`
///
/// `/name` falls back to `name.html` and `/dir` to `dir/index.html`, so
/// neither needs a trailing-slash redirect.
async fn serve_static(root: &Path, mut request: Request<Body>) -> Response {
    let raw_path = request.uri().path().to_string();
    let relative = decode_path(&raw_path);
    let relative = relative.trim_start_matches('/');

    if let Some(rewritten) = resolve_file(root, relative, &raw_path) {
        let rewritten = match request.uri().query() {
            Some(query) => format!("{}?{}", rewritten, query),
            None => rewritten,
        };
        if let Ok(uri) = rewritten.parse::<Uri>() {
            *request.uri_mut() = uri;
        }
    }

    let mut service = ServeDir::new(root).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve {:?} from {:?}: {}", raw_path, root, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Request path to hand to `ServeDir` when it differs from `raw_path`
fn resolve_file(root: &Path, relative: &str, raw_path: &str) -> Option<String> {
    if relative.is_empty() {
        return None;
    }

    let target = root.join(relative);
    if target.is_dir() {
        return Some(format!("{}/index.html", raw_path.trim_end_matches('/')));
    }
    if !target.exists() && root.join(format!("{}.html", relative)).is_file() {
        return Some(format!("{}.html", raw_path));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use axum::http::HeaderMap;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(
            dir.path(),
            SiteConfig {
                timezone: "UTC".to_string(),
                ..SiteConfig::default()
            },
        );

        let public = &blog.public_dir;
        fs::create_dir_all(public.join("fr_FR")).unwrap();
        fs::create_dir_all(public.join("guide")).unwrap();
        fs::write(public.join("index.html"), "home").unwrap();
        fs::write(public.join("about.html"), "about page").unwrap();
        fs::write(public.join("guide/index.html"), "guide index").unwrap();
        fs::write(public.join("fr_FR/index.html"), "accueil").unwrap();
        fs::write(public.join("fr_FR/bonjour.html"), "bonjour").unwrap();
        fs::write(
            &blog.redirects_path,
            r#"{ "/old-post": "/café", "/talks": "https://talks.example.com/" }"#,
        )
        .unwrap();

        (dir, blog)
    }

    async fn get(app: &Router, host: &str, uri: &str) -> (StatusCode, HeaderMap, String) {
        let request = Request::builder()
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn location(headers: &HeaderMap) -> &str {
        headers.get(header::LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_extensionless_path_serves_html_file() {
        let (_dir, blog) = site();
        let app = router(&blog, ServeMode::Static).unwrap();

        let (status, _, body) = get(&app, "example.com", "/about").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "about page");

        let (status, _, body) = get(&app, "example.com", "/about.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "about page");

        let (status, _, _) = get(&app, "example.com", "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directories_serve_index() {
        let (_dir, blog) = site();
        let app = router(&blog, ServeMode::Static).unwrap();

        let (status, _, body) = get(&app, "example.com", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "home");

        let (status, _, body) = get(&app, "example.com", "/guide").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "guide index");

        let (status, headers, _) = get(&app, "example.com", "/guide/").await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location(&headers), "/guide");

        fs::create_dir_all(blog.public_dir.join("empty")).unwrap();
        let (status, _, _) = get(&app, "example.com", "/empty").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_locale_host_serves_locale_dir() {
        let (_dir, blog) = site();
        let app = router(&blog, ServeMode::Static).unwrap();

        let (status, _, body) = get(&app, "fr.example.com", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "accueil");

        let (status, _, body) = get(&app, "fr.example.com", "/bonjour").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bonjour");

        let (status, _, _) = get(&app, "fr.example.com", "/about").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_redirects() {
        let (_dir, blog) = site();
        let app = router(&blog, ServeMode::Static).unwrap();

        let (status, headers, _) = get(&app, "example.com", "/old-post").await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location(&headers), "/caf%C3%A9");

        let (_, headers, _) = get(&app, "example.com", "/talks/").await;
        assert_eq!(location(&headers), "https://talks.example.com/");

        let (status, headers, _) = get(&app, "example.com", "/fr_FR/bonjour").await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location(&headers), "http://fr.example.com/bonjour");
    }

    #[tokio::test]
    async fn test_dynamic_views() {
        let (_dir, blog) = site();
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::write(
            blog.posts_dir.join("hello-world.md"),
            "---\ntitle: Hello World\npublished_at: 2023-01-01\n---\nFresh words.\n",
        )
        .unwrap();
        let app = router(&blog, ServeMode::Dynamic).unwrap();

        let (status, _, body) = get(&app, "example.com", "/hello-world").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<p>Fresh words.</p>"));

        let (status, _, body) = get(&app, "example.com", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello World"));

        let (status, headers, body) = get(&app, "example.com", "/atom.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/atom+xml"));
        assert!(body.contains("<feed"));

        let (_, _, body) = get(&app, "example.com", "/about").await;
        assert_eq!(body, "about page");
    }
}
