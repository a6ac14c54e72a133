use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{ElementRef, Html, Selector};

use super::ReviewSource;
use crate::config::{ProductId, RunConfig, Source};
use crate::extractor::{attr_of, css, text_of};
use crate::fetcher::{FetchError, Transport};
use crate::resolver::{resolve_product_id, ResolveError};
use crate::review::{normalize_text, parse_iso_instant, parse_rating, ExtractedReview, Review};

const PRODUCT_URL: &str = "https://www.capterra.com/p";

const DESKTOP_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static CARD: Lazy<Selector> = Lazy::new(|| css(".review-card"));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h3"));
static REVIEWER: Lazy<Selector> = Lazy::new(|| css(".reviewer-name"));
static DATE: Lazy<Selector> = Lazy::new(|| css(".review-date"));
static STARS: Lazy<Selector> = Lazy::new(|| css(".star-rating"));
static LABEL: Lazy<Selector> = Lazy::new(|| css("p, span, strong, b, h4"));

const COMMENTS: &str = "Comments:";
const PROS: &str = "Pros:";
const CONS: &str = "Cons:";

/// Capterra review cards with labeled Comments/Pros/Cons sections.
pub struct Capterra;

impl ReviewSource for Capterra {
    fn source(&self) -> Source {
        Source::Capterra
    }

    fn requires_product_id(&self) -> bool {
        true
    }

    fn product_id(&self, config: &RunConfig, transport: &dyn Transport) -> Result<ProductId, ResolveError> {
        resolve_product_id(transport, &config.company_name, &browser_headers())
    }

    fn listing_url(&self, product: &ProductId, page: u32) -> String {
        format!("{}/{}/reviews/?page={}", PRODUCT_URL, product, page)
    }

    fn headers(&self, _config: &RunConfig, _product: &ProductId) -> Result<HeaderMap, FetchError> {
        Ok(browser_headers())
    }

    fn extract(&self, document: &Html) -> Vec<ExtractedReview> {
        document
            .select(&CARD)
            .map(|card| {
                let date = text_of(&card, &DATE);
                let published = parse_listing_date(&date);

                let mut rating = attr_of(&card, &STARS, "data-rating");
                if rating.is_empty() {
                    rating = text_of(&card, &STARS);
                }

                let review = Review {
                    title: text_of(&card, &TITLE),
                    description: labeled_section(&card, COMMENTS),
                    date,
                    rating: parse_rating(&rating),
                    reviewer_name: text_of(&card, &REVIEWER),
                    pros: Some(labeled_section(&card, PROS)),
                    cons: Some(labeled_section(&card, CONS)),
                };
                ExtractedReview { review, published }
            })
            .collect()
    }

    // Capterra dates are locale text; a card whose date can't be read is kept
    // rather than silently lost.
    fn keeps_undated(&self) -> bool {
        true
    }
}

/// Sent on both the product search and the listing pages.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_CHROME_UA));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Text following a `label` node: the rest of the label's own text when the
/// body sits inline, otherwise the next element sibling.
fn labeled_section(card: &ElementRef, label: &str) -> String {
    for node in card.select(&LABEL) {
        let text = normalize_text(&node.text().collect::<String>());
        let Some(rest) = text.strip_prefix(label) else {
            continue;
        };

        let rest = rest.trim();
        if !rest.is_empty() {
            return rest.to_string();
        }

        return node
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(|sibling| normalize_text(&sibling.text().collect::<String>()))
            .unwrap_or_default();
    }
    String::new()
}

fn parse_listing_date(raw: &str) -> Option<DateTime<Utc>> {
    // Numeric dates on capterra.com are US order.
    ["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| parse_iso_instant(raw))
}
