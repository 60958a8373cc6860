//! Admin form input sanitization.
//!
//! Form values arrive as raw strings. Text fields are stripped of markup and
//! control whitespace, numeric fields are coerced to non-negative integers,
//! and under [`FreshnessPolicy::GoogleNews`] age and count are clamped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FreshnessPolicy, GOOGLE_NEWS_MAX_AGE_HOURS, MAX_POSTS_CEILING, SitemapSettings};

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));
static OCTETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid octet pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace pattern"));

/// Raw settings as submitted by the admin surface.
///
/// A field left as `None` was not submitted and takes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub publication_name: Option<String>,
    pub publication_language: Option<String>,
    pub post_types: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub max_age_hours: Option<String>,
    pub max_posts: Option<String>,
}

impl SettingsForm {
    /// Pre-fill a form from stored settings, as the admin page renders it.
    pub fn from_settings(settings: &SitemapSettings) -> Self {
        Self {
            publication_name: Some(settings.publication_name.clone()),
            publication_language: Some(settings.publication_language.clone()),
            post_types: Some(settings.post_types.iter().cloned().collect()),
            categories: Some(settings.categories.iter().map(i64::to_string).collect()),
            max_age_hours: Some(settings.max_age_hours.to_string()),
            max_posts: Some(settings.max_posts.to_string()),
        }
    }

    /// Turn submitted values into a settings record.
    pub fn sanitize(self, policy: FreshnessPolicy) -> SitemapSettings {
        let mut settings = SitemapSettings::default();

        if let Some(name) = self.publication_name {
            settings.publication_name = sanitize_text_field(&name);
        }

        if let Some(language) = self.publication_language {
            settings.publication_language = sanitize_text_field(&language);
        }

        if let Some(post_types) = self.post_types {
            settings.post_types = post_types
                .iter()
                .map(|t| sanitize_text_field(t))
                .filter(|t| !t.is_empty())
                .collect();
        }

        if let Some(categories) = self.categories {
            settings.categories = categories
                .iter()
                .filter_map(|c| i64::try_from(absint(c)).ok())
                .filter(|id| *id > 0)
                .collect::<BTreeSet<_>>();
        }

        if let Some(max_age) = self.max_age_hours {
            let hours = to_u32(absint(&max_age));
            settings.max_age_hours =
                if policy.clamps_input() { hours.clamp(1, GOOGLE_NEWS_MAX_AGE_HOURS) } else { hours };
        }

        if let Some(max_posts) = self.max_posts {
            let posts = to_u32(absint(&max_posts));
            settings.max_posts = if policy.clamps_input() { posts.clamp(1, MAX_POSTS_CEILING) } else { posts };
        }

        settings
    }
}

/// Strip markup, percent-encoded octets and control whitespace from a single-line text value.
pub fn sanitize_text_field(input: &str) -> String {
    let without_tags = TAGS.replace_all(input, "");
    let without_octets = OCTETS.replace_all(&without_tags, "");
    WHITESPACE.replace_all(&without_octets, " ").trim().to_string()
}

/// Absolute integer value of the leading numeric part of `input`; garbage is 0.
pub fn absint(input: &str) -> u64 {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

fn to_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
