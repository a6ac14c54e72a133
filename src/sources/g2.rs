use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, REFERER, USER_AGENT,
};
use scraper::{ElementRef, Html, Selector};

use super::ReviewSource;
use crate::config::{ProductId, RunConfig, Source};
use crate::extractor::{attr_of, css, text_of};
use crate::fetcher::{FetchError, Transport};
use crate::resolver::ResolveError;
use crate::review::{format_instant, normalize_text, parse_iso_instant, parse_rating, ExtractedReview, Review};

const PRODUCTS_URL: &str = "https://www.g2.com/products";

const MOBILE_CHROME_UA: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36";

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("priority", "u=1, i"),
    ("sec-ch-device-memory", "8"),
    ("sec-ch-ua", "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
    ("sec-ch-ua-arch", "\"\""),
    (
        "sec-ch-ua-full-version-list",
        "\"Google Chrome\";v=\"131.0.6778.265\", \"Chromium\";v=\"131.0.6778.265\", \"Not_A Brand\";v=\"24.0.0.0\"",
    ),
    ("sec-ch-ua-mobile", "?1"),
    ("sec-ch-ua-model", "\"Nexus 5\""),
    ("sec-ch-ua-platform", "\"Android\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
];

static REVIEW: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="review"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="name"]"#));
static DATE_PUBLISHED: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="datePublished"]"#));
static RATING: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="ratingValue"]"#));
static AUTHOR: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="author"]"#));
static BODY: Lazy<Selector> = Lazy::new(|| css(r#"[itemprop="reviewBody"]"#));

// Attribution G2 appends to every review body.
static ATTRIBUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Review\s+collected\s+by\s+and\s+hosted\s+on\s+G2\.com\.").expect("valid attribution pattern")
});

/// G2 marks reviews up with schema.org microdata.
pub struct G2;

impl ReviewSource for G2 {
    fn source(&self) -> Source {
        Source::G2
    }

    fn product_id(&self, config: &RunConfig, _transport: &dyn Transport) -> Result<ProductId, ResolveError> {
        Ok(ProductId::new(urlencoding::encode(&config.company_slug()).into_owned()))
    }

    fn listing_url(&self, product: &ProductId, page: u32) -> String {
        format!("{}/{}/reviews?page={}&_pjax=%23pjax-container", PRODUCTS_URL, product, page)
    }

    fn headers(&self, config: &RunConfig, product: &ProductId) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html, */*; q=0.01"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en-IN;q=0.9,en-GB;q=0.8,en;q=0.7"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(MOBILE_CHROME_UA));
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }

        let referer = format!("{}/{}/reviews", PRODUCTS_URL, product);
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer).map_err(|_| FetchError::InvalidHeader { name: "referer" })?,
        );

        // Without a session cookie G2 answers 403; that is a page failure, not a crash.
        let cookie = config.session_cookie.as_deref().unwrap_or_default();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie).map_err(|_| FetchError::InvalidHeader { name: "cookie" })?,
        );

        Ok(headers)
    }

    fn extract(&self, document: &Html) -> Vec<ExtractedReview> {
        document
            .select(&REVIEW)
            .map(|node| {
                let raw_date = attr_of(&node, &DATE_PUBLISHED, "content");
                let published = parse_iso_instant(&raw_date);
                let body = text_of(&node, &BODY);

                let review = Review {
                    title: review_title(&node),
                    description: ATTRIBUTION.replace_all(&body, "").trim().to_string(),
                    date: published.map(format_instant).unwrap_or(raw_date),
                    rating: parse_rating(&attr_of(&node, &RATING, "content")),
                    reviewer_name: reviewer_name(&node),
                    pros: None,
                    cons: None,
                };
                ExtractedReview { review, published }
            })
            .collect()
    }
}

/// First non-empty `name` of the review itself. The author block nests a
/// `name` of its own, often as an empty `<meta>` ahead of the title.
fn review_title(review: &ElementRef) -> String {
    review
        .select(&TITLE)
        .filter(|name| !inside_author(name, review))
        .map(|name| normalize_text(&name.text().collect::<String>()).replace('"', "").trim().to_string())
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

fn inside_author(node: &ElementRef, review: &ElementRef) -> bool {
    node.ancestors()
        .take_while(|ancestor| *ancestor != **review)
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().attr("itemprop") == Some("author"))
}

/// Author text, or the `content` of its nested `name` meta when it has no text.
fn reviewer_name(review: &ElementRef) -> String {
    let Some(author) = review.select(&AUTHOR).next() else {
        return String::new();
    };
    let text = normalize_text(&author.text().collect::<String>());
    if !text.is_empty() {
        return text;
    }
    attr_of(&author, &TITLE, "content")
}
