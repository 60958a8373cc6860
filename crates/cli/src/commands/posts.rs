//! Post and category CLI commands

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use newsmap_core::PostStatus;
use newsmap_core::post::{MetaValue, parse_meta_value};
use newsmap_core::store::NewPost;

use super::Context;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category (no-op if it already exists)
    Add {
        /// Category name
        name: String,
    },

    /// List categories
    List,
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Store a post
    Add(AddArgs),

    /// List stored posts, newest first
    List {
        /// Maximum number of posts to list
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Delete a post
    Delete {
        /// Post id
        id: i64,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Post title
    #[arg(long)]
    title: String,

    /// Permalink, absolute or relative to the base URL
    #[arg(long)]
    path: String,

    /// Publication time (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_published_at)]
    published_at: Option<DateTime<Utc>>,

    /// Post type
    #[arg(long, default_value = "post")]
    post_type: String,

    /// Post status
    #[arg(long, default_value = "publish")]
    status: PostStatus,

    /// Category name (repeatable, created if missing)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Metadata entry as KEY=VALUE (repeatable; lists and booleans are JSON, other values are strings)
    #[arg(long = "meta", value_parser = parse_meta)]
    meta: Vec<(String, MetaValue)>,
}

fn parse_published_at(input: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn parse_meta(input: &str) -> Result<(String, MetaValue), String> {
    let (key, raw) = input.split_once('=').ok_or("expected KEY=VALUE")?;
    let key = key.trim();
    if key.is_empty() {
        return Err("metadata key cannot be empty".into());
    }
    Ok((key.to_string(), parse_meta_value(raw)))
}

pub async fn run_category(ctx: &Context, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::Add { name } => {
            let id = ctx.db.add_category(&name).await?;
            println!("{id}\t{}", name.trim());
        }
        CategoryCommands::List => {
            for category in ctx.db.list_categories().await? {
                println!("{}\t{}", category.id, category.name);
            }
        }
    }
    Ok(())
}

pub async fn run_post(ctx: &Context, command: PostCommands) -> Result<()> {
    match command {
        PostCommands::Add(args) => {
            let mut categories = Vec::with_capacity(args.categories.len());
            for name in &args.categories {
                let id = ctx.db.add_category(name).await.with_context(|| format!("category {name:?}"))?;
                categories.push(id);
            }

            let post = NewPost {
                post_type: args.post_type,
                status: args.status,
                categories,
                meta: args.meta,
                ..NewPost::published(args.title, args.path, args.published_at.unwrap_or_else(Utc::now))
            };
            let id = ctx.db.insert_post(&post).await?;
            println!("{id}");
        }
        PostCommands::List { limit } => {
            for post in ctx.db.list_posts(limit).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    post.id,
                    post.published_at.to_rfc3339(),
                    post.status,
                    post.post_type,
                    post.title,
                    post.permalink
                );
            }
        }
        PostCommands::Delete { id } => {
            if !ctx.db.delete_post(id).await? {
                bail!("no post with id {id}");
            }
            println!("Deleted post {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsmap_core::{AppConfig, SiteDb, SitemapGenerator, SitemapSettings};
    use serde_json::json;

    #[test]
    fn test_parse_meta_json_values() {
        assert_eq!(parse_meta("_aioseo_noindex=true").unwrap(), ("_aioseo_noindex".into(), json!(true)));
        assert_eq!(
            parse_meta("rank_math_robots=[\"noindex\"]").unwrap(),
            ("rank_math_robots".into(), json!(["noindex"]))
        );
    }

    #[test]
    fn test_parse_meta_scalars_as_strings() {
        assert_eq!(parse_meta("_yoast_wpseo_meta-robots-noindex=1").unwrap().1, json!("1"));
        assert_eq!(parse_meta("_yoast_wpseo_meta-robots-noindex=\"1\"").unwrap().1, json!("1"));
        assert_eq!(parse_meta("_aioseo_noindex=on").unwrap().1, json!("on"));
        assert_eq!(parse_meta("note=a=b").unwrap(), ("note".into(), json!("a=b")));
    }

    #[tokio::test]
    async fn test_flagged_meta_hides_post() {
        let db = SiteDb::open_in_memory().await.unwrap();
        for flag in ["_yoast_wpseo_meta-robots-noindex=1", "_aioseo_noindex=1"] {
            let post = NewPost {
                meta: vec![parse_meta(flag).unwrap()],
                ..NewPost::published(flag, "/flagged/", Utc::now())
            };
            db.insert_post(&post).await.unwrap();
        }
        db.insert_post(&NewPost::published("Kept", "/kept/", Utc::now())).await.unwrap();

        let generator = SitemapGenerator::from_config(&AppConfig::default()).unwrap();
        let document = generator.generate(&SitemapSettings::default(), &db, Utc::now()).await;
        assert_eq!(document.url_count(), 1);
        assert!(document.as_str().contains("<news:title>Kept</news:title>"));
    }

    #[test]
    fn test_parse_meta_rejects_malformed() {
        assert!(parse_meta("no-separator").is_err());
        assert!(parse_meta("=1").is_err());
    }

    #[test]
    fn test_parse_published_at() {
        let at = parse_published_at("2025-06-10T08:30:00+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2025-06-10T06:30:00+00:00");
        assert!(parse_published_at("yesterday").is_err());
    }
}
