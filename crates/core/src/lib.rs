//! Core types and shared functionality for newsmap.
//!
//! This crate provides:
//! - Google News sitemap generation with pluggable noindex checks
//! - The per-site settings record and its admin sanitizer
//! - SQLite storage for settings and posts
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod noindex;
pub mod post;
pub mod settings;
pub mod site;
pub mod sitemap;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use noindex::{NoindexChain, NoindexPolicy};
pub use post::{PostEntry, PostQuery, PostRepository, PostStatus};
pub use settings::{FreshnessPolicy, SettingsForm, SettingsService, SitemapSettings};
pub use site::SiteProfile;
pub use sitemap::{SitemapDocument, SitemapGenerator};
pub use store::SiteDb;
