//! Settings CLI commands

use anyhow::Result;
use clap::{Args, Subcommand};
use newsmap_core::{SettingsForm, SitemapSettings};

use super::Context;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the stored settings and the values the sitemap renders
    Show,

    /// Change settings; omitted flags keep their current value
    Set(SetArgs),
}

#[derive(Args, Default)]
pub struct SetArgs {
    /// Publication name (empty falls back to the site name)
    #[arg(long)]
    publication_name: Option<String>,

    /// Two-letter publication language code
    #[arg(long)]
    publication_language: Option<String>,

    /// Post type to include (repeatable, replaces the current list)
    #[arg(long = "post-type")]
    post_types: Vec<String>,

    /// Category id to restrict to (repeatable, replaces the current list)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Remove the category restriction
    #[arg(long, conflicts_with = "categories")]
    all_categories: bool,

    /// Maximum post age in hours
    #[arg(long)]
    max_age_hours: Option<String>,

    /// Maximum number of posts
    #[arg(long)]
    max_posts: Option<String>,
}

impl SetArgs {
    /// Lay the given flags over the form for the current record.
    fn apply(self, current: &SitemapSettings) -> SettingsForm {
        let mut form = SettingsForm::from_settings(current);
        if let Some(name) = self.publication_name {
            form.publication_name = Some(name);
        }
        if let Some(language) = self.publication_language {
            form.publication_language = Some(language);
        }
        if !self.post_types.is_empty() {
            form.post_types = Some(self.post_types);
        }
        if self.all_categories {
            form.categories = Some(Vec::new());
        } else if !self.categories.is_empty() {
            form.categories = Some(self.categories);
        }
        if let Some(hours) = self.max_age_hours {
            form.max_age_hours = Some(hours);
        }
        if let Some(posts) = self.max_posts {
            form.max_posts = Some(posts);
        }
        form
    }
}

pub async fn run(ctx: &Context, command: SettingsCommands) -> Result<()> {
    let service = ctx.settings();
    let site_id = ctx.config.site_id;

    match command {
        SettingsCommands::Show => {
            if !service.exists(site_id).await? {
                println!("# no settings stored for site {site_id}; showing defaults");
            }
            let settings = service.load(site_id).await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            print_effective(&settings, &ctx.config.site_name);
        }
        SettingsCommands::Set(args) => {
            let current = service.load(site_id).await?;
            let updated = args.apply(&current).sanitize(ctx.config.freshness);
            service.save(site_id, &updated).await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
            print_effective(&updated, &ctx.config.site_name);
        }
    }
    Ok(())
}

fn print_effective(settings: &SitemapSettings, site_name: &str) {
    println!("# publication name: {}", settings.effective_publication_name(site_name));
    println!("# publication language: {}", settings.effective_publication_language());
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsmap_core::FreshnessPolicy;
    use std::collections::BTreeSet;

    fn current() -> SitemapSettings {
        SitemapSettings {
            publication_name: "Gazette".into(),
            categories: BTreeSet::from([3, 5]),
            max_posts: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_flags_keeps_record() {
        let settings = SetArgs::default().apply(&current()).sanitize(FreshnessPolicy::Optional);
        assert_eq!(settings, current());
    }

    #[test]
    fn test_flags_override_fields() {
        let args = SetArgs {
            publication_language: Some("de".into()),
            post_types: vec!["post".into(), "report".into()],
            max_posts: Some("50".into()),
            ..Default::default()
        };
        let settings = args.apply(&current()).sanitize(FreshnessPolicy::Optional);
        assert_eq!(settings.publication_name, "Gazette");
        assert_eq!(settings.publication_language, "de");
        assert_eq!(settings.post_types, BTreeSet::from(["post".to_string(), "report".to_string()]));
        assert_eq!(settings.categories, BTreeSet::from([3, 5]));
        assert_eq!(settings.max_posts, 50);
    }

    #[test]
    fn test_all_categories_clears_restriction() {
        let args = SetArgs { all_categories: true, ..Default::default() };
        let settings = args.apply(&current()).sanitize(FreshnessPolicy::Optional);
        assert!(settings.categories.is_empty());
    }

    #[test]
    fn test_google_news_clamps_flags() {
        let args = SetArgs { max_age_hours: Some("96".into()), max_posts: Some("0".into()), ..Default::default() };
        let settings = args.apply(&current()).sanitize(FreshnessPolicy::GoogleNews);
        assert_eq!(settings.max_age_hours, 48);
        assert_eq!(settings.max_posts, 1);
    }
}
