use std::collections::HashSet;

use tracing::{info, warn};
use url::Url;

use crate::fetch::{FetchError, PageSource};
use crate::html::Document;
use crate::urls;

/// One listing to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub slug: String,
    pub url: Url,
}

/// Fetch the categories index and return its categories, first occurrence per slug.
pub async fn discover<S: PageSource>(
    source: &S,
    index: &Url,
    categories_path: &str,
) -> Result<Vec<Category>, FetchError> {
    info!("Fetching categories index: {}", index);
    let body = source.fetch(index).await?;
    let categories = categories_from_index(&Document::parse(&body), index, categories_path);
    if categories.is_empty() {
        warn!("No category links found on {}", index);
    }
    Ok(categories)
}

pub fn categories_from_index(doc: &Document, index: &Url, categories_path: &str) -> Vec<Category> {
    let marker = categories_path.trim_matches('/');
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for anchor in doc.anchors() {
        if !anchor.href.contains(categories_path) {
            continue;
        }
        let Some(url) = urls::resolve(index, &anchor.href) else {
            continue;
        };
        let Some(slug) = urls::last_segment(&url) else {
            continue;
        };
        // Link back to the index itself.
        if slug == marker {
            continue;
        }
        if seen.insert(slug.clone()) {
            out.push(Category { slug, url });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> Url {
        Url::parse("https://aitoolfor.org/categories/").unwrap()
    }

    #[test]
    fn index_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/categories.html").unwrap();
        let cats = categories_from_index(&Document::parse(&html), &index(), "/categories/");
        let slugs: Vec<&str> = cats.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["assistant", "video", "writing"]);
        assert_eq!(cats[0].url.as_str(), "https://aitoolfor.org/categories/assistant/");
        assert_eq!(cats[2].url.as_str(), "https://aitoolfor.org/categories/writing");
    }

    #[test]
    fn no_category_links() {
        let doc = Document::parse(r#"<a href="/about/">About</a><a href="/tools/x/">X</a>"#);
        assert!(categories_from_index(&doc, &index(), "/categories/").is_empty());
    }

    #[test]
    fn first_occurrence_wins() {
        let doc = Document::parse(
            r#"<a href="/categories/video/">Video</a>
               <a href="https://aitoolfor.org/categories/video/?sort=top">Video again</a>"#,
        );
        let cats = categories_from_index(&doc, &index(), "/categories/");
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].url.as_str(), "https://aitoolfor.org/categories/video/");
    }
}
