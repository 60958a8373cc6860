//! Noindex detection from SEO plugin metadata.
//!
//! Each [`NoindexPolicy`] recognizes one plugin's metadata convention. A
//! [`NoindexChain`] asks its policies in order and excludes a post as soon as
//! one of them matches. A post with none of the recognized keys is kept.

use crate::post::{MetaValue, PostEntry};

pub const YOAST_NOINDEX_KEY: &str = "_yoast_wpseo_meta-robots-noindex";
pub const RANK_MATH_ROBOTS_KEY: &str = "rank_math_robots";
pub const AIOSEO_NOINDEX_KEY: &str = "_aioseo_noindex";

/// A single metadata convention marking a post as not indexable.
pub trait NoindexPolicy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn is_noindex(&self, post: &PostEntry) -> bool;
}

/// Yoast SEO stores the string `"1"` when a post is noindex.
///
/// Scalar meta arrives in string form (see [`crate::post::parse_meta_value`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct YoastSeo;

impl NoindexPolicy for YoastSeo {
    fn name(&self) -> &'static str {
        "yoast"
    }

    fn is_noindex(&self, post: &PostEntry) -> bool {
        matches!(post.meta(YOAST_NOINDEX_KEY), Some(MetaValue::String(v)) if v == "1")
    }
}

/// Rank Math stores a list of robots directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankMath;

impl NoindexPolicy for RankMath {
    fn name(&self) -> &'static str {
        "rank_math"
    }

    fn is_noindex(&self, post: &PostEntry) -> bool {
        match post.meta(RANK_MATH_ROBOTS_KEY) {
            Some(MetaValue::Array(directives)) => directives.iter().any(|d| d.as_str() == Some("noindex")),
            _ => false,
        }
    }
}

/// All in One SEO stores `"on"`, `"1"` or a boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllInOneSeo;

impl NoindexPolicy for AllInOneSeo {
    fn name(&self) -> &'static str {
        "aioseo"
    }

    fn is_noindex(&self, post: &PostEntry) -> bool {
        match post.meta(AIOSEO_NOINDEX_KEY) {
            Some(MetaValue::String(v)) => v == "on" || v == "1",
            Some(MetaValue::Bool(b)) => *b,
            _ => false,
        }
    }
}

/// Ordered list of policies combined with logical OR.
#[derive(Default)]
pub struct NoindexChain {
    policies: Vec<Box<dyn NoindexPolicy>>,
}

impl NoindexChain {
    /// No checks at all; nothing is ever excluded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Yoast SEO, then Rank Math, then All in One SEO.
    pub fn standard() -> Self {
        Self::empty().with(YoastSeo).with(RankMath).with(AllInOneSeo)
    }

    pub fn with(mut self, policy: impl NoindexPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Name of the first policy flagging `post`, if any.
    pub fn matching_policy(&self, post: &PostEntry) -> Option<&'static str> {
        self.policies.iter().find(|p| p.is_noindex(post)).map(|p| p.name())
    }
}

impl std::fmt::Debug for NoindexChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.policies.iter().map(|p| p.name())).finish()
    }
}
