//! Post repository types.
//!
//! The generator only sees posts through [`PostRepository`], so any store
//! that can answer a [`PostQuery`] can back a sitemap.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Metadata values are stored as JSON: strings, lists and booleans all occur.
pub type MetaValue = serde_json::Value;

/// Decode a stored or user-supplied metadata value.
///
/// Lists, objects, strings and booleans keep their JSON form. Numbers become
/// their string form, matching what WordPress returns for scalar meta, and
/// anything that is not JSON is taken as a plain string.
pub fn parse_meta_value(raw: &str) -> MetaValue {
    match serde_json::from_str(raw) {
        Ok(MetaValue::Number(n)) => MetaValue::String(n.to_string()),
        Ok(value) => value,
        Err(_) => MetaValue::String(raw.to_string()),
    }
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "future" => Ok(PostStatus::Future),
            "trash" => Ok(PostStatus::Trash),
            other => Err(Error::InvalidInput(format!("unknown post status: {other}"))),
        }
    }
}

/// A post as the sitemap sees it. Built fresh for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostEntry {
    pub id: i64,

    /// Permalink, absolute or relative to the site base URL.
    pub permalink: String,

    pub title: String,

    pub published_at: DateTime<Utc>,

    /// Category names, sorted by name.
    pub categories: Vec<String>,

    /// SEO metadata; only populated when the query asks for it.
    pub meta: HashMap<String, MetaValue>,
}

impl PostEntry {
    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }
}

/// Post selection criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Allowed post types; never empty when built from settings.
    pub post_types: Vec<String>,

    pub status: PostStatus,

    /// Inclusive lower bound on the publication time.
    pub published_after: Option<DateTime<Utc>>,

    /// Category ids; a post matches if it is in any of them. Empty = unrestricted.
    pub categories: Vec<i64>,

    /// Row cap. Results are ordered by publication time, newest first.
    pub limit: u32,

    /// Whether to load SEO metadata for the returned posts.
    pub with_meta: bool,
}

/// Source of posts for sitemap generation.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts matching `query`, newest first, at most `query.limit` of them.
    ///
    /// Order among posts sharing a publication time is unspecified.
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PostEntry>, Error>;
}
