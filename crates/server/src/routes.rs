//! Request routing.
//!
//! Every request lands in one fallback handler. Sitemap requests are
//! recognized by path suffix or query parameter; everything else is a 404.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use newsmap_core::{SettingsService, SiteDb, SitemapDocument, SitemapGenerator};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsService,
    pub posts: SiteDb,
    pub generator: Arc<SitemapGenerator>,
    pub site_id: i64,
    pub slug: String,
    pub query_var: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

/// Whether a request asks for the news sitemap.
///
/// Only `GET` and `HEAD` qualify. The path must end in `/<slug>.xml`
/// (ASCII case-insensitive), or the query must carry `query_var` under any value.
pub fn is_sitemap_request(method: &Method, path: &str, query: Option<&str>, slug: &str, query_var: &str) -> bool {
    if method != Method::GET && method != Method::HEAD {
        return false;
    }

    let suffix = format!("/{slug}.xml");
    let path_matches = path.len() >= suffix.len()
        && path.is_char_boundary(path.len() - suffix.len())
        && path[path.len() - suffix.len()..].eq_ignore_ascii_case(&suffix);
    if path_matches {
        return true;
    }

    query.is_some_and(|q| url::form_urlencoded::parse(q.as_bytes()).any(|(key, _)| key == query_var))
}

async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if !is_sitemap_request(&method, uri.path(), uri.query(), &state.slug, &state.query_var) {
        return not_found();
    }

    let settings = state.settings.load_or_default(state.site_id).await;
    let document = state.generator.generate(&settings, &state.posts, Utc::now()).await;
    tracing::info!(path = uri.path(), urls = document.url_count(), "served news sitemap");

    sitemap_response(document, method == Method::HEAD)
}

fn sitemap_response(document: SitemapDocument, head: bool) -> Response {
    let body = if head { Body::empty() } else { Body::from(document.into_bytes()) };
    (StatusCode::OK, [(header::CONTENT_TYPE, SitemapDocument::CONTENT_TYPE)], body).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "404 Not Found").into_response()
}
