//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NEWSMAP_*)
//! 2. TOML config file (if NEWSMAP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::FixedOffset;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::settings::FreshnessPolicy;
use crate::site::{SiteProfile, parse_utc_offset};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NEWSMAP_*)
/// 2. TOML config file (if NEWSMAP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding settings and posts.
    ///
    /// Set via NEWSMAP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address the HTTP server listens on.
    ///
    /// Set via NEWSMAP_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Site whose settings record is served.
    ///
    /// Set via NEWSMAP_SITE_ID environment variable.
    #[serde(default = "default_site_id")]
    pub site_id: i64,

    /// Site display name, the fallback publication name.
    ///
    /// Set via NEWSMAP_SITE_NAME environment variable.
    #[serde(default)]
    pub site_name: String,

    /// Base URL relative permalinks resolve against.
    ///
    /// Set via NEWSMAP_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Site timezone as a fixed UTC offset (e.g. `+02:00`).
    ///
    /// Set via NEWSMAP_UTC_OFFSET environment variable.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// The sitemap is served at `/<sitemap_slug>.xml`.
    ///
    /// Set via NEWSMAP_SITEMAP_SLUG environment variable.
    #[serde(default = "default_sitemap_slug")]
    pub sitemap_slug: String,

    /// Query parameter that also selects the sitemap (`/?<query_var>=1`).
    ///
    /// Set via NEWSMAP_QUERY_VAR environment variable.
    #[serde(default = "default_query_var")]
    pub query_var: String,

    /// How the age setting is applied.
    ///
    /// Set via NEWSMAP_FRESHNESS environment variable (`optional` or `google_news`).
    #[serde(default)]
    pub freshness: FreshnessPolicy,

    /// Whether SEO plugin noindex metadata excludes posts.
    ///
    /// Set via NEWSMAP_NOINDEX_CHECKS environment variable.
    #[serde(default = "default_true")]
    pub noindex_checks: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./newsmap.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_site_id() -> i64 {
    1
}

fn default_base_url() -> String {
    "http://localhost:8080/".into()
}

fn default_utc_offset() -> String {
    "+00:00".into()
}

fn default_sitemap_slug() -> String {
    "news-sitemap".into()
}

fn default_query_var() -> String {
    "news_sitemap".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            site_id: default_site_id(),
            site_name: String::new(),
            base_url: default_base_url(),
            utc_offset: default_utc_offset(),
            sitemap_slug: default_sitemap_slug(),
            query_var: default_query_var(),
            freshness: FreshnessPolicy::default(),
            noindex_checks: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NEWSMAP_`
    /// 2. TOML file from `NEWSMAP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NEWSMAP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NEWSMAP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "base_url".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Parsed site offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| ConfigError::Invalid {
            field: "utc_offset".into(),
            reason: format!("expected +HH:MM, -HH:MM or Z, got {:?}", self.utc_offset),
        })
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid { field: "bind_addr".into(), reason: e.to_string() })
    }

    /// Site identity for rendering.
    pub fn site_profile(&self) -> Result<SiteProfile, ConfigError> {
        Ok(SiteProfile::new(self.site_name.trim(), self.base_url()?, self.utc_offset()?))
    }

    /// Path the sitemap is served at, e.g. `/news-sitemap.xml`.
    pub fn sitemap_path(&self) -> String {
        format!("/{}.xml", self.sitemap_slug)
    }

    /// Primary and alternative public sitemap URLs.
    pub fn sitemap_urls(&self) -> Result<(Url, Url), ConfigError> {
        let base = self.base_url()?;
        let invalid = |e: url::ParseError| ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() };
        let primary = base.join(self.sitemap_path().trim_start_matches('/')).map_err(invalid)?;
        let mut alternative = base.clone();
        alternative.query_pairs_mut().clear().append_pair(&self.query_var, "1");
        Ok((primary, alternative))
    }
}
