//! CLI command definitions and dispatch.

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use newsmap_core::{AppConfig, SettingsService, SiteDb, SitemapGenerator};

mod posts;
mod settings;

pub use posts::{CategoryCommands, PostCommands};
pub use settings::SettingsCommands;

#[derive(Subcommand)]
pub enum Commands {
    /// Create default settings for the configured site if none exist
    Activate,

    /// Show or change the sitemap settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Delete the sitemap settings of every site
    Uninstall,

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Manage posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Print the news sitemap for the configured site
    Render,

    /// Print the public sitemap URLs
    Urls,
}

/// Loaded configuration and an open database.
pub struct Context {
    pub config: AppConfig,
    pub db: SiteDb,
}

impl Context {
    async fn load() -> Result<Self> {
        let config = AppConfig::load()?;
        let db = SiteDb::open(&config.db_path).await?;
        tracing::debug!(db_path = %config.db_path.display(), site_id = config.site_id, "opened site database");
        Ok(Self { config, db })
    }

    fn settings(&self) -> SettingsService {
        SettingsService::new(self.db.clone())
    }
}

pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Urls => print_urls(&AppConfig::load()?),
        command => {
            let ctx = Context::load().await?;
            run_with(&ctx, command).await
        }
    }
}

async fn run_with(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Activate => {
            let created = ctx.settings().activate(ctx.config.site_id, &ctx.config.site_name).await?;
            if created {
                println!("Created default settings for site {}", ctx.config.site_id);
            } else {
                println!("Settings already exist for site {}", ctx.config.site_id);
            }
        }
        Commands::Settings(cmd) => settings::run(ctx, cmd).await?,
        Commands::Uninstall => {
            let removed = ctx.settings().uninstall().await?;
            println!("Removed {removed} settings record(s)");
        }
        Commands::Category(cmd) => posts::run_category(ctx, cmd).await?,
        Commands::Post(cmd) => posts::run_post(ctx, cmd).await?,
        Commands::Render => {
            let settings = ctx.settings().load_or_default(ctx.config.site_id).await;
            let generator = SitemapGenerator::from_config(&ctx.config)?;
            let document = generator.generate(&settings, &ctx.db, Utc::now()).await;
            print!("{}", document.as_str());
        }
        Commands::Urls => print_urls(&ctx.config)?,
    }
    Ok(())
}

fn print_urls(config: &AppConfig) -> Result<()> {
    let (primary, alternative) = config.sitemap_urls()?;
    println!("{primary}");
    println!("{alternative}");
    Ok(())
}
