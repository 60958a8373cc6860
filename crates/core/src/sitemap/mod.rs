//! Google News sitemap generation.
//!
//! [`SitemapGenerator::generate`] turns a settings record and a post
//! repository into a finished document:
//!
//! 1. Build a [`PostQuery`] from the settings (types, cap, age window, categories).
//! 2. Drop posts flagged by the [`NoindexChain`].
//! 3. Render the `<urlset>` with the publication block on every entry.
//!
//! Generation never fails: a repository error yields an empty `<urlset>`.
//! Writing the payload and ending the request is the caller's job.

use chrono::{DateTime, Utc};

use crate::config::{AppConfig, ConfigError};
use crate::noindex::NoindexChain;
use crate::post::{PostEntry, PostQuery, PostRepository, PostStatus};
use crate::settings::{FreshnessPolicy, SitemapSettings};
use crate::site::SiteProfile;

mod render;

pub use render::{NEWS_NS, NewsUrl, Publication, SITEMAP_NS, render_urlset};

/// A rendered sitemap, ready to be written to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    xml: String,
    url_count: usize,
}

impl SitemapDocument {
    pub const CONTENT_TYPE: &'static str = "application/xml; charset=UTF-8";

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.xml.into_bytes()
    }

    /// Number of `<url>` entries in the document.
    pub fn url_count(&self) -> usize {
        self.url_count
    }
}

/// Builds sitemap documents for one site.
#[derive(Debug)]
pub struct SitemapGenerator {
    site: SiteProfile,
    freshness: FreshnessPolicy,
    noindex: NoindexChain,
}

impl SitemapGenerator {
    pub fn new(site: SiteProfile, freshness: FreshnessPolicy, noindex: NoindexChain) -> Self {
        Self { site, freshness, noindex }
    }

    /// Generator for the configured site, with the standard noindex checks
    /// unless `noindex_checks` is off.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let noindex = if config.noindex_checks { NoindexChain::standard() } else { NoindexChain::empty() };
        Ok(Self::new(config.site_profile()?, config.freshness, noindex))
    }

    /// Post selection for `settings` as of `now`.
    pub fn build_query(&self, settings: &SitemapSettings, now: DateTime<Utc>) -> PostQuery {
        PostQuery {
            post_types: settings.effective_post_types(),
            status: PostStatus::Publish,
            published_after: self.freshness.window(settings.max_age_hours).map(|window| now - window),
            categories: settings.categories.iter().copied().collect(),
            limit: settings.effective_max_posts(),
            with_meta: !self.noindex.is_empty(),
        }
    }

    /// Generate the sitemap for `settings` as of `now`.
    pub async fn generate(
        &self, settings: &SitemapSettings, posts: &dyn PostRepository, now: DateTime<Utc>,
    ) -> SitemapDocument {
        let query = self.build_query(settings, now);

        let candidates = match posts.query_posts(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(error = %e, "post query failed, rendering empty sitemap");
                Vec::new()
            }
        };

        self.render(settings, &candidates)
    }

    /// Filter and render already-selected posts.
    pub fn render(&self, settings: &SitemapSettings, candidates: &[PostEntry]) -> SitemapDocument {
        let publication = Publication {
            name: settings.effective_publication_name(&self.site.name).to_string(),
            language: settings.effective_publication_language().to_string(),
        };

        let entries: Vec<NewsUrl> = candidates.iter().filter_map(|post| self.entry_for(post)).collect();

        tracing::debug!(candidates = candidates.len(), included = entries.len(), "rendered news sitemap");

        SitemapDocument { xml: render_urlset(&publication, &entries), url_count: entries.len() }
    }

    fn entry_for(&self, post: &PostEntry) -> Option<NewsUrl> {
        if let Some(policy) = self.noindex.matching_policy(post) {
            tracing::debug!(post_id = post.id, policy, "skipping noindex post");
            return None;
        }

        let loc = match self.site.permalink(&post.permalink) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(post_id = post.id, error = %e, "skipping post with unusable permalink");
                return None;
            }
        };

        Some(NewsUrl {
            loc: loc.into(),
            publication_date: self.site.format_date(post.published_at),
            title: post.title.clone(),
            keywords: (!post.categories.is_empty()).then(|| post.categories.join(", ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::site::parse_utc_offset;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;
    use url::Url;

    /// In-memory repository that records the last query it saw.
    #[derive(Default)]
    struct FakePosts {
        posts: Vec<PostEntry>,
        last_query: Mutex<Option<PostQuery>>,
        fail: bool,
    }

    #[async_trait]
    impl PostRepository for FakePosts {
        async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PostEntry>, Error> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            if self.fail {
                return Err(Error::InvalidInput("boom".into()));
            }
            Ok(self.posts.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn site(name: &str) -> SiteProfile {
        SiteProfile::new(name, Url::parse("https://news.example.com/").unwrap(), parse_utc_offset("+02:00").unwrap())
    }

    fn generator(freshness: FreshnessPolicy, noindex: NoindexChain) -> SitemapGenerator {
        SitemapGenerator::new(site("Daily Planet"), freshness, noindex)
    }

    fn post(id: i64, title: &str, hours_ago: i64) -> PostEntry {
        PostEntry {
            id,
            permalink: format!("/{id}/{}/", title.to_lowercase()),
            title: title.into(),
            published_at: now() - Duration::hours(hours_ago),
            categories: Vec::new(),
            meta: HashMap::new(),
        }
    }

    #[test]
    fn test_build_query_optional_policy() {
        let generator = generator(FreshnessPolicy::Optional, NoindexChain::standard());
        let settings = SitemapSettings {
            categories: BTreeSet::from([4, 2]),
            max_age_hours: 24,
            max_posts: 50,
            ..Default::default()
        };

        let query = generator.build_query(&settings, now());
        assert_eq!(query.post_types, vec!["post".to_string()]);
        assert_eq!(query.status, PostStatus::Publish);
        assert_eq!(query.published_after, Some(now() - Duration::hours(24)));
        assert_eq!(query.categories, vec![2, 4]);
        assert_eq!(query.limit, 50);
        assert!(query.with_meta);

        let unbounded = SitemapSettings { max_age_hours: 0, ..settings };
        assert_eq!(generator.build_query(&unbounded, now()).published_after, None);
    }

    #[test]
    fn test_build_query_google_news_policy() {
        let generator = generator(FreshnessPolicy::GoogleNews, NoindexChain::empty());
        for hours in [0, 72] {
            let settings = SitemapSettings { max_age_hours: hours, ..Default::default() };
            let query = generator.build_query(&settings, now());
            assert_eq!(query.published_after, Some(now() - Duration::hours(48)));
            assert!(!query.with_meta);
        }
    }

    #[tokio::test]
    async fn test_generate_renders_entries() {
        let mut story = post(1, "Story", 3);
        story.categories = vec!["Politics".into(), "World".into()];
        let posts = FakePosts { posts: vec![story], ..Default::default() };

        let doc = generator(FreshnessPolicy::Optional, NoindexChain::standard())
            .generate(&SitemapSettings::default(), &posts, now())
            .await;

        assert_eq!(doc.url_count(), 1);
        let xml = doc.as_str();
        assert!(xml.contains("<loc>https://news.example.com/1/story/</loc>"));
        assert!(xml.contains("<news:name>Daily Planet</news:name>"));
        assert!(xml.contains("<news:language>en</news:language>"));
        assert!(xml.contains("<news:publication_date>2025-03-01T11:00:00+02:00</news:publication_date>"));
        assert!(xml.contains("<news:keywords>Politics, World</news:keywords>"));
    }

    #[tokio::test]
    async fn test_generate_excludes_noindex_posts() {
        let mut yoast = post(1, "Yoast", 1);
        yoast.meta.insert("_yoast_wpseo_meta-robots-noindex".into(), json!("1"));
        let mut rank_math = post(2, "RankMath", 2);
        rank_math.meta.insert("rank_math_robots".into(), json!(["noindex"]));
        let mut aioseo = post(3, "Aioseo", 3);
        aioseo.meta.insert("_aioseo_noindex".into(), json!("on"));
        let kept = post(4, "Kept", 4);

        let posts = FakePosts { posts: vec![yoast, rank_math, aioseo, kept], ..Default::default() };
        let doc = generator(FreshnessPolicy::Optional, NoindexChain::standard())
            .generate(&SitemapSettings::default(), &posts, now())
            .await;

        assert_eq!(doc.url_count(), 1);
        assert!(doc.as_str().contains("<news:title>Kept</news:title>"));
    }

    #[tokio::test]
    async fn test_lightweight_generator_keeps_flagged_posts() {
        let mut flagged = post(1, "Flagged", 1);
        flagged.meta.insert("_aioseo_noindex".into(), json!(true));
        let posts = FakePosts { posts: vec![flagged], ..Default::default() };

        let doc = generator(FreshnessPolicy::GoogleNews, NoindexChain::empty())
            .generate(&SitemapSettings::default(), &posts, now())
            .await;

        assert_eq!(doc.url_count(), 1);
        let query = posts.last_query.lock().unwrap().clone().unwrap();
        assert!(!query.with_meta);
    }

    #[tokio::test]
    async fn test_publication_fallbacks_in_output() {
        let posts = FakePosts { posts: vec![post(1, "A", 1)], ..Default::default() };
        let settings = SitemapSettings {
            publication_name: "  ".into(),
            publication_language: "english".into(),
            ..Default::default()
        };

        let named = generator(FreshnessPolicy::Optional, NoindexChain::empty())
            .generate(&settings, &posts, now())
            .await;
        assert!(named.as_str().contains("<news:name>Daily Planet</news:name>"));
        assert!(named.as_str().contains("<news:language>en</news:language>"));

        let anonymous = SitemapGenerator::new(site(""), FreshnessPolicy::Optional, NoindexChain::empty())
            .generate(&settings, &posts, now())
            .await;
        assert!(anonymous.as_str().contains("<news:name>Web</news:name>"));
    }

    #[tokio::test]
    async fn test_repository_failure_yields_empty_urlset() {
        let posts = FakePosts { posts: vec![post(1, "A", 1)], fail: true, ..Default::default() };
        let doc = generator(FreshnessPolicy::Optional, NoindexChain::standard())
            .generate(&SitemapSettings::default(), &posts, now())
            .await;

        assert_eq!(doc.url_count(), 0);
        assert!(doc.as_str().contains("<urlset"));
        assert!(doc.as_str().trim_end().ends_with("</urlset>"));
    }

    #[tokio::test]
    async fn test_unusable_permalink_is_skipped() {
        let mut broken = post(1, "Broken", 1);
        broken.permalink = "mailto:editor@example.com".into();
        let posts = FakePosts { posts: vec![broken, post(2, "Fine", 2)], ..Default::default() };

        let doc = generator(FreshnessPolicy::Optional, NoindexChain::empty())
            .generate(&SitemapSettings::default(), &posts, now())
            .await;
        assert_eq!(doc.url_count(), 1);
    }

    #[test]
    fn test_document_accessors() {
        let doc = generator(FreshnessPolicy::Optional, NoindexChain::empty()).render(&SitemapSettings::default(), &[]);
        assert_eq!(doc.as_bytes(), doc.as_str().as_bytes());
        assert_eq!(SitemapDocument::CONTENT_TYPE, "application/xml; charset=UTF-8");
        assert!(doc.clone().into_bytes().starts_with(b"<?xml"));
    }
}
