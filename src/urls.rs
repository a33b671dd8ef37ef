use url::Url;

/// Resolve a possibly relative link target against `base`.
///
/// Empty targets and anything that does not parse yield `None`. The fragment is
/// dropped so the result can serve as a dedupe key.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = match Url::parse(href) {
        Ok(abs) => abs,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(href).ok()?,
        Err(_) => return None,
    };
    url.set_fragment(None);
    Some(url)
}

/// Category root with `param=page` set, replacing any existing value.
pub fn with_page(root: &Url, param: &str, page: u32) -> Url {
    let kept: Vec<(String, String)> = root
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = root.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(param, &page.to_string());
    url
}

/// Last non-empty path segment, e.g. `/categories/assistant/` -> `assistant`.
pub fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}
