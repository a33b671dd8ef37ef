mod crawl;
mod discover;
mod enrich;
mod fetch;
mod html;
mod listing;
mod output;
mod record;
mod segment;
mod settings;
mod urls;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::crawl::Crawler;
use crate::discover::Category;
use crate::fetch::HttpClient;
use crate::segment::MarkerSegmenter;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "aitool_scraper",
    about = "Crawl AI tool directory categories into a JSON file"
)]
struct Cli {
    /// Output JSON path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Stop each category after this many pages (0 = no limit)
    #[arg(long)]
    max_pages: Option<u32>,
    /// Skip fetching each tool's own page
    #[arg(long)]
    no_enrich: bool,
    /// Crawl only these category slugs instead of discovering them
    #[arg(short, long = "category")]
    categories: Vec<String>,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(max) = self.max_pages {
            settings.max_pages = max;
        }
        if self.no_enrich {
            settings.enrich = false;
        }
        if !self.categories.is_empty() {
            settings.categories = self.categories;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let mut settings = Settings::load()?;
    Cli::parse().apply(&mut settings);
    info!(settings = ?settings, "Starting scraper");

    let client = HttpClient::new(&settings)?;
    let categories = load_categories(&client, &settings).await?;
    println!("Found {} categories", categories.len());

    let segmenter = MarkerSegmenter::new(settings.marker.clone());
    let crawler = Crawler::new(&client, &segmenter, &settings);
    let mut records = crawler.crawl_all(&categories).await;

    output::write_records(&settings.output, &mut records)?;
    println!("Scraped {} tools.", records.len());
    println!("Wrote {}", settings.output.display());

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

/// Configured slugs, or whatever the categories index lists.
async fn load_categories(client: &HttpClient, settings: &Settings) -> Result<Vec<Category>> {
    if !settings.categories.is_empty() {
        return settings
            .categories
            .iter()
            .map(|slug| -> Result<Category> {
                Ok(Category {
                    slug: slug.trim_matches('/').to_string(),
                    url: settings.category_root(slug)?,
                })
            })
            .collect();
    }

    let index = settings.categories_index()?;
    discover::discover(client, &index, &settings.categories_path)
        .await
        .with_context(|| format!("Category discovery failed for {}", index))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
