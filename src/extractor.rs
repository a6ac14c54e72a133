use scraper::{ElementRef, Html, Selector};

use crate::config::RunConfig;
use crate::review::{normalize_text, ExtractedReview, Review};

/// Turns one listing page into reviews for the configured source, keeping only
/// those inside the run's date window. Performs no I/O.
pub fn extract(html: &str, config: &RunConfig) -> Vec<Review> {
    let document = Html::parse_document(html);
    let ruleset = config.source.ruleset();

    ruleset
        .extract(&document)
        .into_iter()
        .filter(|extracted| in_window(extracted, config, ruleset.keeps_undated()))
        .map(|extracted| extracted.review)
        .collect()
}

fn in_window(extracted: &ExtractedReview, config: &RunConfig, keeps_undated: bool) -> bool {
    match extracted.published {
        Some(instant) => config.window.contains(instant),
        None => keeps_undated,
    }
}

/// Compiles a selector written into the source. Panics on malformed CSS.
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", selector, e))
}

/// Whitespace-normalized text of the first match under `node`, or `""`.
pub(crate) fn text_of(node: &ElementRef, selector: &Selector) -> String {
    node.select(selector)
        .next()
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Trimmed attribute of the first match under `node`, or `""`.
pub(crate) fn attr_of(node: &ElementRef, selector: &Selector, attr: &str) -> String {
    node.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
