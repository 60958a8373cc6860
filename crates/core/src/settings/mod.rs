//! Sitemap settings record.
//!
//! A single record per site, persisted as a JSON blob under [`OPTION_NAME`].
//! Fields missing from a stored blob fall back to their defaults one by one,
//! so records written by older versions keep loading.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

mod sanitize;
mod service;

pub use sanitize::{SettingsForm, absint, sanitize_text_field};
pub use service::{OPTION_NAME, SettingsService};

/// Google News ignores articles older than two days.
pub const GOOGLE_NEWS_MAX_AGE_HOURS: u32 = 48;

/// Google recommends at most 1000 URLs per news sitemap.
pub const MAX_POSTS_CEILING: u32 = 1000;

pub const DEFAULT_MAX_AGE_HOURS: u32 = 48;
pub const DEFAULT_MAX_POSTS: u32 = 1000;
pub const DEFAULT_POST_TYPE: &str = "post";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const FALLBACK_PUBLICATION_NAME: &str = "Web";

/// How `max_age_hours` turns into a publication-date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessPolicy {
    /// `0` disables the age filter; any other value is used as-is.
    #[default]
    Optional,

    /// The window is always applied and never exceeds 48 hours.
    GoogleNews,
}

impl FreshnessPolicy {
    /// Age window for the given setting, or `None` when no filter applies.
    pub fn window(self, max_age_hours: u32) -> Option<Duration> {
        match self {
            FreshnessPolicy::Optional if max_age_hours == 0 => None,
            FreshnessPolicy::Optional => Some(Duration::hours(i64::from(max_age_hours))),
            FreshnessPolicy::GoogleNews => {
                let hours = match max_age_hours {
                    0 => GOOGLE_NEWS_MAX_AGE_HOURS,
                    h => h.min(GOOGLE_NEWS_MAX_AGE_HOURS),
                };
                Some(Duration::hours(i64::from(hours)))
            }
        }
    }

    /// Whether the admin sanitizer clamps age and count into documented ranges.
    pub fn clamps_input(self) -> bool {
        matches!(self, FreshnessPolicy::GoogleNews)
    }
}

/// Persisted sitemap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapSettings {
    /// Post types to include.
    pub post_types: BTreeSet<String>,

    /// Category ids to restrict to; empty means unrestricted.
    pub categories: BTreeSet<i64>,

    /// Publication name for `<news:name>`.
    pub publication_name: String,

    /// Two-letter ISO 639-1 code for `<news:language>`.
    pub publication_language: String,

    /// Maximum post age in hours.
    pub max_age_hours: u32,

    /// Maximum number of sitemap entries.
    pub max_posts: u32,
}

impl Default for SitemapSettings {
    fn default() -> Self {
        Self {
            post_types: BTreeSet::from([DEFAULT_POST_TYPE.to_string()]),
            categories: BTreeSet::new(),
            publication_name: String::new(),
            publication_language: DEFAULT_LANGUAGE.to_string(),
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            max_posts: DEFAULT_MAX_POSTS,
        }
    }
}

impl SitemapSettings {
    /// Defaults for a freshly activated site.
    pub fn for_site(site_name: &str) -> Self {
        Self { publication_name: site_name.trim().to_string(), ..Default::default() }
    }

    /// Publication name as rendered: the setting, else the site name, else `"Web"`.
    pub fn effective_publication_name<'a>(&'a self, site_name: &'a str) -> &'a str {
        let name = self.publication_name.trim();
        if !name.is_empty() {
            return name;
        }
        let site_name = site_name.trim();
        if !site_name.is_empty() { site_name } else { FALLBACK_PUBLICATION_NAME }
    }

    /// Language code as rendered; anything but two characters becomes `"en"`.
    pub fn effective_publication_language(&self) -> &str {
        let language = self.publication_language.trim();
        if language.chars().count() == 2 { language } else { DEFAULT_LANGUAGE }
    }

    /// Post types to query; an empty set means the default type.
    pub fn effective_post_types(&self) -> Vec<String> {
        if self.post_types.is_empty() {
            vec![DEFAULT_POST_TYPE.to_string()]
        } else {
            self.post_types.iter().cloned().collect()
        }
    }

    /// Row cap for the post query; a stored zero means the default cap.
    pub fn effective_max_posts(&self) -> u32 {
        if self.max_posts == 0 { DEFAULT_MAX_POSTS } else { self.max_posts }
    }
}
