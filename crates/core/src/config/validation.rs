//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn is_identifier(value: &str, allow_dash: bool) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_dash && c == '-'))
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `site_id` is not positive
    /// - `base_url` is not an http(s) URL
    /// - `utc_offset` is not a fixed offset
    /// - `bind_addr` is not a socket address
    /// - `sitemap_slug` or `query_var` is empty or has characters outside `[A-Za-z0-9_-]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_id < 1 {
            return Err(ConfigError::Invalid { field: "site_id".into(), reason: "must be at least 1".into() });
        }

        self.base_url()?;
        self.utc_offset()?;
        self.bind_addr()?;

        if !is_identifier(&self.sitemap_slug, true) {
            return Err(ConfigError::Invalid {
                field: "sitemap_slug".into(),
                reason: "must be non-empty and contain only letters, digits, '_' or '-'".into(),
            });
        }

        if !is_identifier(&self.query_var, false) {
            return Err(ConfigError::Invalid {
                field: "query_var".into(),
                reason: "must be non-empty and contain only letters, digits or '_'".into(),
            });
        }

        if self.site_name.trim().is_empty() {
            tracing::warn!("site_name is empty; publication name falls back to \"Web\" when unset");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_site_id() {
        let config = AppConfig { site_id: 0, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("site_id"));
    }

    #[test]
    fn test_validate_base_url() {
        let config = AppConfig { base_url: "ftp://example.com/".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("base_url"));

        let config = AppConfig { base_url: "not a url".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("base_url"));
    }

    #[test]
    fn test_validate_utc_offset() {
        let config = AppConfig { utc_offset: "Europe/Paris".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("utc_offset"));
    }

    #[test]
    fn test_validate_bind_addr() {
        let config = AppConfig { bind_addr: "localhost".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("bind_addr"));
    }

    #[test]
    fn test_validate_slug_and_query_var() {
        let config = AppConfig { sitemap_slug: "news/sitemap".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("sitemap_slug"));

        let config = AppConfig { sitemap_slug: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("sitemap_slug"));

        let config = AppConfig { query_var: "news-sitemap".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("query_var"));
    }

    #[test]
    fn test_validate_accepts_custom_values() {
        let config = AppConfig {
            sitemap_slug: "google-news-sitemap".into(),
            query_var: "google_news_sitemap".into(),
            utc_offset: "+05:30".into(),
            base_url: "https://example.com/blog/".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
