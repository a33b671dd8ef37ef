use std::sync::LazyLock;

use regex::Regex;

static METRIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]+))?([KMBkmb])?$").unwrap());

/// Structured fields recovered from one listing entry's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub name: String,
    pub metric_raw: Option<String>,
    pub metric_value: Option<u64>,
    pub description: Option<String>,
}

/// Splits a whitespace-normalized listing blob into name, metric and description.
pub trait TextSegmenter {
    fn segment(&self, raw: &str) -> Segments;
}

/// Splits at the first whole-token occurrence of a site-specific marker.
///
/// The marker is whatever literal the listing markup happens to render between
/// the popularity count and the blurb. It is not a structural guarantee.
#[derive(Debug, Clone)]
pub struct MarkerSegmenter {
    marker: String,
}

impl MarkerSegmenter {
    pub fn new(marker: impl Into<String>) -> Self {
        MarkerSegmenter {
            marker: marker.into().trim().to_string(),
        }
    }

    /// Returns (head, description) split once at the marker, if present.
    fn split_marker<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        if self.marker.is_empty() {
            return None;
        }
        // Pad so a marker at either end still matches as a whole token.
        let padded = format!(" {} ", text);
        let needle = format!(" {} ", self.marker);
        let idx = padded.find(&needle)?;

        // padded = " " + text + " ": offsets shift by one.
        let head_end = idx.min(text.len());
        let desc_start = (idx + needle.len()).saturating_sub(1).min(text.len());
        Some((&text[..head_end], &text[desc_start..]))
    }
}

impl TextSegmenter for MarkerSegmenter {
    fn segment(&self, raw: &str) -> Segments {
        let text = raw.trim();

        let Some((head, description)) = self.split_marker(text) else {
            return Segments {
                name: text.to_string(),
                ..Default::default()
            };
        };

        let head = head.trim();
        let tokens: Vec<&str> = head.split_whitespace().collect();

        let (name, metric_raw) = match tokens.split_last() {
            Some((last, rest)) if is_metric_token(last) => {
                // A lone metric token stays the name as well.
                let name = if rest.is_empty() {
                    head.to_string()
                } else {
                    rest.join(" ")
                };
                (name, Some(last.to_string()))
            }
            _ => (head.to_string(), None),
        };

        let metric_value = metric_raw.as_deref().and_then(parse_metric);

        Segments {
            name,
            metric_raw,
            metric_value,
            description: Some(description.trim().to_string()),
        }
    }
}

pub fn is_metric_token(token: &str) -> bool {
    METRIC_RE.is_match(token)
}

/// Expands `5K`, `1.66B`, `174M` or plain digits into an integer count.
///
/// Decimal digits are scaled exactly and truncated, so `1.66B` is
/// 1_660_000_000 rather than whatever the nearest float rounds to.
pub fn parse_metric(raw: &str) -> Option<u64> {
    let caps = METRIC_RE.captures(raw.trim())?;
    let whole: u64 = caps[1].parse().ok()?;
    let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let multiplier: u64 = match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(s) if s == "K" => 1_000,
        Some(s) if s == "M" => 1_000_000,
        Some(s) if s == "B" => 1_000_000_000,
        _ => 1,
    };

    let mut value = whole.checked_mul(multiplier)?;
    if !fraction.is_empty() {
        // Digits beyond the multiplier's precision can only contribute < 1.
        let precision = multiplier.ilog10() as usize;
        let kept = &fraction[..fraction.len().min(precision)];
        if !kept.is_empty() {
            let scale = 10u64.pow((precision - kept.len()) as u32);
            let frac: u64 = kept.parse().ok()?;
            value = value.checked_add(frac.checked_mul(scale)?)?;
        }
    }
    Some(value)
}
