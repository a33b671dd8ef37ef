use std::sync::LazyLock;

use scraper::Selector;

use crate::html::{anchors_in, Anchor, Document};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static LIST_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul, ol").unwrap());

/// Outcome of reading one listing page.
#[derive(Debug)]
pub enum Listing {
    Entries(Vec<Anchor>),
    /// No heading, no list after it, or a list without anchors.
    Missing(&'static str),
}

/// Anchors in the first list that follows the page's first heading.
pub fn parse_listing(doc: &Document) -> Listing {
    let Some(heading) = doc.first(&HEADING_SEL) else {
        return Listing::Missing("no heading");
    };
    let Some(list) = doc.first_after(heading, &LIST_SEL) else {
        return Listing::Missing("no list after heading");
    };
    let anchors = anchors_in(list);
    if anchors.is_empty() {
        return Listing::Missing("no anchors in list");
    }
    Listing::Entries(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(html: &str) -> Vec<Anchor> {
        match parse_listing(&Document::parse(html)) {
            Listing::Entries(a) => a,
            Listing::Missing(why) => panic!("expected entries, got {}", why),
        }
    }

    #[test]
    fn fixture_page() {
        let html = std::fs::read_to_string("tests/fixtures/listing_page.html").unwrap();
        let a = entries(&html);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].href, "/tools/widget-pro/");
        assert_eq!(a[0].text, "Widget Pro 5K 1233 A tool for widgets.");
        assert_eq!(a[2].text, "");
    }

    #[test]
    fn nav_list_before_heading_is_ignored() {
        let a = entries(
            r#"<nav><ul><li><a href="/">Home</a></li></ul></nav>
            <h1>Assistant</h1><ul><li><a href="/tools/x/">X 1K 1233 y</a></li></ul>"#,
        );
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].href, "/tools/x/");
    }

    #[test]
    fn missing_heading() {
        let doc = Document::parse("<ul><li><a href='/x'>x</a></li></ul>");
        assert!(matches!(parse_listing(&doc), Listing::Missing("no heading")));
    }

    #[test]
    fn missing_list() {
        let doc = Document::parse("<h1>Empty category</h1><p>Nothing here</p>");
        assert!(matches!(parse_listing(&doc), Listing::Missing("no list after heading")));
    }

    #[test]
    fn empty_list() {
        let doc = Document::parse("<h1>Empty</h1><ul></ul>");
        assert!(matches!(parse_listing(&doc), Listing::Missing("no anchors in list")));
    }
}
