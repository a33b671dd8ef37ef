use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static META_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());

/// A link target together with its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Parsed HTML page with the handful of lookups the crawler needs.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Document {
            html: Html::parse_document(body),
        }
    }

    /// First element matching `selector` in document order.
    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// First element matching `selector` that comes after `anchor` in document order.
    pub fn first_after<'a>(
        &'a self,
        anchor: ElementRef<'a>,
        selector: &Selector,
    ) -> Option<ElementRef<'a>> {
        self.html
            .tree
            .root()
            .descendants()
            .skip_while(|node| node.id() != anchor.id())
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        anchors_in(self.html.root_element())
    }

    /// `content` of the first non-empty `<meta>` whose `name` or `property` is `key`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.html.select(&META_SEL).find_map(|el| {
            let v = el.value();
            let matches = v.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(key))
                || v.attr("property").is_some_and(|p| p.eq_ignore_ascii_case(key));
            if !matches {
                return None;
            }
            v.attr("content")
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
        })
    }

    /// Visible text of the first element matching `selector`, if non-empty.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.html
            .select(selector)
            .map(visible_text)
            .find(|t| !t.is_empty())
    }
}

/// All anchors with an `href` below `root`, in document order.
pub fn anchors_in(root: ElementRef<'_>) -> Vec<Anchor> {
    root.select(&ANCHOR_SEL)
        .filter_map(|el| {
            let href = attr(el, "href")?;
            Some(Anchor {
                href,
                text: visible_text(el),
            })
        })
        .collect()
}

/// Text nodes joined by spaces with whitespace runs collapsed.
pub fn visible_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).map(|v| v.trim().to_string())
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
