use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE: &str = "aitool_scraper";
pub const ENV_PREFIX: &str = "AITOOLS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub categories_path: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub page_delay_ms: u64,
    pub category_delay_ms: u64,
    /// Pause after each tool page fetched for enrichment.
    pub enrich_delay_ms: u64,
    pub page_param: String,
    /// Literal token separating name/metric from the blurb in listing text.
    pub marker: String,
    /// Hard stop for pagination; 0 means unbounded.
    pub max_pages: u32,
    pub enrich: bool,
    pub output: PathBuf,
    /// Crawl only these slugs instead of discovering categories.
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: "https://aitoolfor.org".into(),
            categories_path: "/categories/".into(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 15,
            max_attempts: 3,
            backoff_base_ms: 1000,
            page_delay_ms: 1000,
            category_delay_ms: 2000,
            enrich_delay_ms: 500,
            page_param: "page".into(),
            marker: "1233".into(),
            max_pages: 200,
            enrich: true,
            output: PathBuf::from("aitools.json"),
            categories: Vec::new(),
        }
    }
}

impl Settings {
    /// Defaults, then `aitool_scraper.toml` if present, then `AITOOLS_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("categories"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base_url {:?}", self.base_url))
    }

    pub fn categories_index(&self) -> Result<Url> {
        self.base()?
            .join(&self.categories_path)
            .with_context(|| format!("Invalid categories_path {:?}", self.categories_path))
    }

    /// Root listing URL for an explicitly configured category slug.
    pub fn category_root(&self, slug: &str) -> Result<Url> {
        let index = self.categories_index()?;
        let path = format!("{}/", slug.trim_matches('/'));
        index
            .join(&path)
            .with_context(|| format!("Invalid category slug {:?}", slug))
    }

    pub fn max_pages(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}
