use reqwest::header::HeaderMap;
use scraper::Html;
use log::{info, warn};
use thiserror::Error;

use crate::config::ProductId;
use crate::extractor::css;
use crate::fetcher::{FetchError, Transport};

const SEARCH_URL: &str = "https://www.capterra.com/search/";
const PRODUCT_PREFIXES: [&str; 2] = ["/p/", "https://www.capterra.com/p/"];

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No Capterra product found for '{company}'")]
    NotFound { company: String },
    #[error("Capterra product search failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Looks a company up through Capterra's search page and returns the
/// `<id>/<slug>` pair of the first product link mentioning it.
///
/// The match is a substring test on the lowercased link, so a company whose
/// name is contained in another product's slug can resolve to that product.
/// Pass an explicit product id to bypass the lookup.
pub fn resolve_product_id<T: Transport + ?Sized>(
    transport: &T,
    company: &str,
    headers: &HeaderMap,
) -> Result<ProductId, ResolveError> {
    let search_url = format!("{}?query={}", SEARCH_URL, urlencoding::encode(company.trim()));
    info!("Searching Capterra for: '{}'", company);

    let html = transport.get(&search_url, headers)?;
    match parse_search_results(&html, company) {
        Some(product) => {
            info!("Resolved Capterra product for '{}': {}", company, product);
            Ok(product)
        }
        None => {
            warn!("No Capterra product link matched '{}'", company);
            Err(ResolveError::NotFound { company: company.to_string() })
        }
    }
}

fn parse_search_results(html: &str, company: &str) -> Option<ProductId> {
    let document = Html::parse_document(html);
    let needle = company.trim().to_lowercase();
    let anchors = css("a[href]");

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.to_lowercase().contains(&needle))
        .find_map(product_path)
}

/// `/p/135003/Acme/reviews/` -> `135003/Acme`
fn product_path(href: &str) -> Option<ProductId> {
    let rest = PRODUCT_PREFIXES.iter().find_map(|prefix| href.strip_prefix(prefix))?;
    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let id = segments.next()?;
    let slug = segments.next()?;
    Some(ProductId::new(format!("{}/{}", id, slug)))
}
