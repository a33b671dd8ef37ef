use std::collections::HashSet;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use url::Url;

use crate::discover::Category;
use crate::enrich;
use crate::fetch::{FetchError, PageSource};
use crate::html::{Anchor, Document};
use crate::listing::{parse_listing, Listing};
use crate::record::{Enrichment, ToolRecord};
use crate::segment::TextSegmenter;
use crate::settings::Settings;
use crate::urls;

/// What one listing fetch produced.
#[derive(Debug)]
enum ListingPage {
    Entries(Vec<Anchor>),
    /// Page fetched but carries no listing.
    Empty(&'static str),
    /// Fetch failed after retries.
    Unavailable(FetchError),
}

/// Sequential per-category crawler: paginate, segment, dedupe, enrich.
pub struct Crawler<'a, S> {
    source: &'a S,
    segmenter: &'a dyn TextSegmenter,
    settings: &'a Settings,
    progress: ProgressBar,
}

impl<'a, S: PageSource> Crawler<'a, S> {
    pub fn new(source: &'a S, segmenter: &'a dyn TextSegmenter, settings: &'a Settings) -> Self {
        let progress = ProgressBar::new(0);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} categories ({msg})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Crawler {
            source,
            segmenter,
            settings,
            progress,
        }
    }

    /// Print a status line without tearing the progress bar.
    fn say(&self, line: impl AsRef<str>) {
        self.progress.suspend(|| println!("{}", line.as_ref()));
    }

    /// Crawl every category in order, pausing between them.
    pub async fn crawl_all(&self, categories: &[Category]) -> Vec<ToolRecord> {
        let pb = &self.progress;
        pb.reset();
        pb.set_length(categories.len() as u64);

        let mut all = Vec::new();
        for (i, category) in categories.iter().enumerate() {
            pb.set_message(category.slug.clone());
            let records = self.crawl(category).await;
            self.say(format!("  {} tools in {}", records.len(), category.slug));
            all.extend(records);
            pb.inc(1);

            if i + 1 < categories.len() {
                pause(self.settings.category_delay_ms).await;
            }
        }
        pb.finish_and_clear();
        all
    }

    /// Walk `?page=1, 2, ...` until a page yields nothing new.
    ///
    /// An empty first page gets one retry against the bare root, for categories
    /// that do not paginate at all.
    pub async fn crawl(&self, category: &Category) -> Vec<ToolRecord> {
        self.say(format!("Scraping category: {}", category.slug));
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            if let Some(max) = self.settings.max_pages() {
                if page > max {
                    warn!("{}: stopping at page limit {}", category.slug, max);
                    break;
                }
            }

            let url = urls::with_page(&category.url, &self.settings.page_param, page);
            self.say(format!("  page {}: {}", page, url));
            let mut found = self.scrape_page(category, &url, &mut seen).await;

            if found.is_empty() && page == 1 {
                self.say(format!("  page 1 empty, trying without pagination: {}", category.url));
                found = self.scrape_page(category, &category.url, &mut seen).await;
            }

            if found.is_empty() {
                info!("{}: no new tools on page {}, done", category.slug, page);
                break;
            }

            self.say(format!("  {} new tools on page {}", found.len(), page));
            records.extend(found);
            pause(self.settings.page_delay_ms).await;
            page += 1;
        }

        records
    }

    /// New records from one listing page. Already-seen URLs are skipped.
    async fn scrape_page(
        &self,
        category: &Category,
        url: &Url,
        seen: &mut HashSet<String>,
    ) -> Vec<ToolRecord> {
        let anchors = match self.fetch_listing(url).await {
            ListingPage::Entries(anchors) => anchors,
            ListingPage::Empty(why) => {
                warn!("{}: {} on {}", category.slug, why, url);
                return Vec::new();
            }
            ListingPage::Unavailable(e) => {
                warn!("{}: listing unavailable: {}", category.slug, e);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for anchor in anchors {
            if anchor.text.is_empty() {
                continue;
            }
            let segments = self.segmenter.segment(&anchor.text);
            let Some(tool_url) = urls::resolve(url, &anchor.href) else {
                warn!("{}: unresolvable link {:?}", category.slug, anchor.href);
                continue;
            };
            if !seen.insert(tool_url.to_string()) {
                debug!("{}: already seen {}", category.slug, tool_url);
                continue;
            }

            let mut record =
                ToolRecord::from_listing(&category.slug, tool_url.as_str(), &anchor.text, segments);
            if self.settings.enrich {
                match self.enrich(&tool_url).await {
                    Ok(e) => record.apply(e),
                    Err(e) => warn!("Enrichment failed for {}: {}", tool_url, e),
                }
                pause(self.settings.enrich_delay_ms).await;
            }
            records.push(record);
        }
        records
    }

    async fn fetch_listing(&self, url: &Url) -> ListingPage {
        match self.source.fetch(url).await {
            Ok(body) => match parse_listing(&Document::parse(&body)) {
                Listing::Entries(anchors) => ListingPage::Entries(anchors),
                Listing::Missing(why) => ListingPage::Empty(why),
            },
            Err(e) => ListingPage::Unavailable(e),
        }
    }

    async fn enrich(&self, url: &Url) -> Result<Enrichment, FetchError> {
        let body = self.source.fetch(url).await?;
        Ok(enrich::extract(&Document::parse(&body), url))
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
