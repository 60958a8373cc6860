//! SQLite-backed storage for settings records and posts.
//!
//! This module provides persistent storage using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Per-site key-value option records (JSON values)
//! - A post repository with categories and SEO metadata
//! - Automatic schema migrations
//! - WAL mode for concurrent readers

pub mod connection;
pub mod migrations;
pub mod options;
pub mod posts;

pub use crate::Error;

pub use connection::SiteDb;
pub use posts::{Category, NewPost, PostSummary};
