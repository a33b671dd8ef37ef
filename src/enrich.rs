use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::Selector;
use url::Url;

use crate::html::{attr, Document};
use crate::record::Enrichment;
use crate::urls;

static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

const TAG_PATHS: &[&str] = &["/categories/", "/category/", "/tags/", "/tag/"];
const GENERIC_LABELS: &[&str] = &[
    "home",
    "categories",
    "category",
    "tags",
    "all",
    "all categories",
    "all tags",
];

/// Pull title, description, image and tags out of a tool page.
pub fn extract(doc: &Document, page_url: &Url) -> Enrichment {
    let title = doc.first_text(&H1_SEL).or_else(|| doc.first_text(&TITLE_SEL));

    let meta_description = doc
        .meta_content("description")
        .or_else(|| doc.meta_content("og:description"))
        .or_else(|| doc.first_text(&P_SEL));

    let image_url = doc
        .meta_content("og:image")
        .or_else(|| doc.meta_content("twitter:image"))
        .or_else(|| doc.first(&IMG_SEL).and_then(|img| attr(img, "src")))
        .and_then(|src| urls::resolve(page_url, &src))
        .map(String::from);

    Enrichment {
        title,
        meta_description,
        image_url,
        tags: tags(doc),
    }
}

fn tags(doc: &Document) -> Vec<String> {
    doc.anchors()
        .into_iter()
        .filter(|a| TAG_PATHS.iter().any(|p| a.href.contains(p)))
        .map(|a| a.text)
        .filter(|t| !t.is_empty() && !GENERIC_LABELS.contains(&t.to_lowercase().as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
