//! Settings persistence on top of the site option store.

use super::SitemapSettings;
use crate::Error;
use crate::store::SiteDb;

/// Option name the settings record is stored under.
pub const OPTION_NAME: &str = "newsmap_options";

/// Reads and writes the per-site [`SitemapSettings`] record.
#[derive(Clone, Debug)]
pub struct SettingsService {
    db: SiteDb,
}

impl SettingsService {
    pub fn new(db: SiteDb) -> Self {
        Self { db }
    }

    /// Stored settings for a site, or defaults when none are stored.
    pub async fn load(&self, site_id: i64) -> Result<SitemapSettings, Error> {
        match self.db.get_option(site_id, OPTION_NAME).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(SitemapSettings::default()),
        }
    }

    /// Like [`load`](Self::load), but any failure is logged and yields defaults.
    pub async fn load_or_default(&self, site_id: i64) -> SitemapSettings {
        match self.load(site_id).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(site_id, error = %e, "failed to load sitemap settings, using defaults");
                SitemapSettings::default()
            }
        }
    }

    /// Whether a settings record exists for the site.
    pub async fn exists(&self, site_id: i64) -> Result<bool, Error> {
        Ok(self.db.get_option(site_id, OPTION_NAME).await?.is_some())
    }

    /// Replace the settings record for a site.
    pub async fn save(&self, site_id: i64, settings: &SitemapSettings) -> Result<(), Error> {
        let raw = serde_json::to_string(settings)?;
        self.db.update_option(site_id, OPTION_NAME, &raw).await?;
        tracing::info!(site_id, "saved sitemap settings");
        Ok(())
    }

    /// Create default settings for a site unless a record already exists.
    ///
    /// Returns true if a record was created.
    pub async fn activate(&self, site_id: i64, site_name: &str) -> Result<bool, Error> {
        let raw = serde_json::to_string(&SitemapSettings::for_site(site_name))?;
        let created = self.db.add_option(site_id, OPTION_NAME, &raw).await?;
        if created {
            tracing::info!(site_id, "created default sitemap settings");
        } else {
            tracing::debug!(site_id, "sitemap settings already present");
        }
        Ok(created)
    }

    /// Delete the settings record for every site.
    ///
    /// Returns the number of deleted records.
    pub async fn uninstall(&self) -> Result<u64, Error> {
        let deleted = self.db.delete_option_all_sites(OPTION_NAME).await?;
        tracing::info!(deleted, "removed sitemap settings");
        Ok(deleted)
    }
}
