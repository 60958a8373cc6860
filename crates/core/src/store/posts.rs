//! Post repository backed by SQLite.
//!
//! Posts carry their categories through `post_categories` and their SEO
//! metadata through `post_meta`. Publication times are unix seconds (UTC).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, params_from_iter, types::Value};

use super::connection::SiteDb;
use crate::Error;
use crate::post::{MetaValue, PostEntry, PostQuery, PostRepository, PostStatus, parse_meta_value};

/// A post to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub permalink: String,
    pub post_type: String,
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
    pub categories: Vec<i64>,
    pub meta: Vec<(String, MetaValue)>,
}

impl NewPost {
    /// A published `post` with no categories or metadata.
    pub fn published(title: impl Into<String>, permalink: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            permalink: permalink.into(),
            post_type: "post".to_string(),
            status: PostStatus::Publish,
            published_at,
            categories: Vec::new(),
            meta: Vec::new(),
        }
    }
}

/// A stored post as listed by the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub permalink: String,
    pub post_type: String,
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn timestamp_to_utc(seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::InvalidInput(format!("publication time out of range: {seconds}")))
}

impl SiteDb {
    /// Store a post with its categories and metadata.
    ///
    /// Returns the new post id.
    pub async fn insert_post(&self, post: &NewPost) -> Result<i64, Error> {
        if post.title.trim().is_empty() {
            return Err(Error::InvalidInput("post title cannot be empty".into()));
        }
        if post.permalink.trim().is_empty() {
            return Err(Error::InvalidInput("post permalink cannot be empty".into()));
        }

        let post = post.clone();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT INTO posts (title, permalink, post_type, status, published_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        post.title.trim(),
                        post.permalink.trim(),
                        post.post_type,
                        post.status.as_str(),
                        post.published_at.timestamp(),
                    ],
                )?;
                let id = tx.last_insert_rowid();

                for category_id in &post.categories {
                    let exists: bool = tx.query_row(
                        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
                        params![category_id],
                        |row| row.get(0),
                    )?;
                    if !exists {
                        return Err(Error::NotFound(format!("category {category_id}")));
                    }
                    tx.execute(
                        "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?1, ?2)",
                        params![id, category_id],
                    )?;
                }

                for (key, value) in &post.meta {
                    tx.execute(
                        "INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
                        ON CONFLICT(post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
                        params![id, key, serde_json::to_string(value)?],
                    )?;
                }

                tx.commit()?;
                Ok(id)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a post and its category links and metadata.
    ///
    /// Returns true if the post existed.
    pub async fn delete_post(&self, id: i64) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List stored posts, newest first.
    pub async fn list_posts(&self, limit: u32) -> Result<Vec<PostSummary>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<PostSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, permalink, post_type, status, published_at
                    FROM posts ORDER BY published_at DESC, id DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                })?;

                let mut posts = Vec::new();
                for row in rows {
                    let (id, title, permalink, post_type, status, published_at) = row?;
                    posts.push(PostSummary {
                        id,
                        title,
                        permalink,
                        post_type,
                        status: status.parse()?,
                        published_at: timestamp_to_utc(published_at)?,
                    });
                }
                Ok(posts)
            })
            .await
            .map_err(Error::from)
    }

    /// Create a category, or return the id of the existing one with that name.
    pub async fn add_category(&self, name: &str) -> Result<i64, Error> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("category name cannot be empty".into()));
        }
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute("INSERT OR IGNORE INTO categories (name) VALUES (?1)", params![name])?;
                let id = conn.query_row("SELECT id FROM categories WHERE name = ?1", params![name], |row| row.get(0))?;
                Ok(id)
            })
            .await
            .map_err(Error::from)
    }

    /// All categories, ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Category>, Error> {
                let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
                let categories = stmt
                    .query_map([], |row| Ok(Category { id: row.get(0)?, name: row.get(1)? }))?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(categories)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl PostRepository for SiteDb {
    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<PostEntry>, Error> {
        let query = query.clone();
        self.conn
            .call(move |conn| -> Result<Vec<PostEntry>, Error> {
                let mut sql = String::from("SELECT p.id, p.title, p.permalink, p.published_at FROM posts p WHERE p.status = ?");
                let mut values = vec![Value::Text(query.status.as_str().to_string())];

                if !query.post_types.is_empty() {
                    sql.push_str(&format!(" AND p.post_type IN ({})", placeholders(query.post_types.len())));
                    values.extend(query.post_types.iter().cloned().map(Value::Text));
                }

                if let Some(after) = query.published_after {
                    sql.push_str(" AND p.published_at >= ?");
                    // Stored times are whole seconds; a fractional cutoff rounds up.
                    let cutoff = after.timestamp() + i64::from(after.timestamp_subsec_nanos() > 0);
                    values.push(Value::Integer(cutoff));
                }

                if !query.categories.is_empty() {
                    sql.push_str(&format!(
                        " AND EXISTS (SELECT 1 FROM post_categories pc WHERE pc.post_id = p.id AND pc.category_id IN ({}))",
                        placeholders(query.categories.len())
                    ));
                    values.extend(query.categories.iter().copied().map(Value::Integer));
                }

                sql.push_str(" ORDER BY p.published_at DESC LIMIT ?");
                values.push(Value::Integer(i64::from(query.limit)));

                tracing::debug!(sql = %sql, params = values.len(), "querying posts");

                let mut posts = Vec::new();
                {
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params_from_iter(values), |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    })?;
                    for row in rows {
                        let (id, title, permalink, published_at) = row?;
                        posts.push(PostEntry {
                            id,
                            permalink,
                            title,
                            published_at: timestamp_to_utc(published_at)?,
                            categories: Vec::new(),
                            meta: HashMap::new(),
                        });
                    }
                }

                if posts.is_empty() {
                    return Ok(posts);
                }

                attach_categories(conn, &mut posts)?;
                if query.with_meta {
                    attach_meta(conn, &mut posts)?;
                }

                Ok(posts)
            })
            .await
            .map_err(Error::from)
    }
}

fn attach_categories(conn: &rusqlite::Connection, posts: &mut [PostEntry]) -> Result<(), Error> {
    let ids: Vec<Value> = posts.iter().map(|p| Value::Integer(p.id)).collect();
    let sql = format!(
        "SELECT pc.post_id, c.name FROM post_categories pc
        JOIN categories c ON c.id = pc.category_id
        WHERE pc.post_id IN ({}) ORDER BY c.name",
        placeholders(ids.len())
    );

    let mut by_post: HashMap<i64, Vec<String>> = HashMap::new();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids), |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (post_id, name) = row?;
        by_post.entry(post_id).or_default().push(name);
    }

    for post in posts.iter_mut() {
        if let Some(names) = by_post.remove(&post.id) {
            post.categories = names;
        }
    }
    Ok(())
}

fn attach_meta(conn: &rusqlite::Connection, posts: &mut [PostEntry]) -> Result<(), Error> {
    let ids: Vec<Value> = posts.iter().map(|p| Value::Integer(p.id)).collect();
    let sql = format!(
        "SELECT post_id, meta_key, meta_value FROM post_meta WHERE post_id IN ({})",
        placeholders(ids.len())
    );

    let mut by_post: HashMap<i64, HashMap<String, MetaValue>> = HashMap::new();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (post_id, key, raw) = row?;
        by_post.entry(post_id).or_default().insert(key, parse_meta_value(&raw));
    }

    for post in posts.iter_mut() {
        if let Some(meta) = by_post.remove(&post.id) {
            post.meta = meta;
        }
    }
    Ok(())
}
