use log::{info, warn};
use thiserror::Error;

use crate::config::{validate, ConfigError, ProductId, RunConfig, RunConfigInput};
use crate::extractor;
use crate::fetcher::{PageFetcher, Transport};
use crate::resolver::ResolveError;
use crate::review::Review;

/// Listing pages attempted per run, whether or not earlier pages had reviews.
pub const PAGE_COUNT: u32 = 5;

/// Errors that abort a whole run. Page-level failures never surface here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    Success(usize),
    NoData,
    Blocked(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page: u32,
    pub url: String,
    pub status: PageStatus,
}

impl PageOutcome {
    pub fn failed(&self) -> bool {
        matches!(self.status, PageStatus::Blocked(_) | PageStatus::Error(_))
    }
}

#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Page order first, then document order within a page.
    pub reviews: Vec<Review>,
    pub pages: Vec<PageOutcome>,
}

impl ScrapeReport {
    pub fn failures(&self) -> impl Iterator<Item = &PageOutcome> {
        self.pages.iter().filter(|p| p.failed())
    }

    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        format!(
            "{} reviews from {} pages ({} failed)",
            self.reviews.len(),
            self.pages.len() - failed,
            failed
        )
    }
}

/// Drives the fixed-length page loop, one page at a time.
pub struct Pipeline<T> {
    fetcher: PageFetcher<T>,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T) -> Self {
        Pipeline { fetcher: PageFetcher::new(transport) }
    }

    /// Validates before any request is made.
    pub fn scrape_input(&self, input: &RunConfigInput) -> Result<ScrapeReport, ScrapeError> {
        let config = validate(input)?;
        self.scrape(&config)
    }

    pub fn scrape(&self, config: &RunConfig) -> Result<ScrapeReport, ScrapeError> {
        let product = self.product_id(config)?;
        let ruleset = config.source.ruleset();
        let mut report = ScrapeReport::default();

        for page in 1..=PAGE_COUNT {
            let url = ruleset.listing_url(&product, page);
            info!("Scraping data from {} (Page {})...", url, page);

            let status = match self.fetcher.fetch(&url, config, &product) {
                Ok(html) => {
                    let reviews = extractor::extract(&html, config);
                    info!("Scraped {} reviews from page {}.", reviews.len(), page);
                    let count = reviews.len();
                    report.reviews.extend(reviews);
                    if count == 0 {
                        PageStatus::NoData
                    } else {
                        PageStatus::Success(count)
                    }
                }
                Err(e) if e.is_blocked() => {
                    warn!("Blocked on page {}: {}", page, e);
                    PageStatus::Blocked(e.to_string())
                }
                Err(e) => {
                    warn!("Skipping page {}: {}", page, e);
                    PageStatus::Error(e.to_string())
                }
            };

            report.pages.push(PageOutcome { page, url, status });
        }

        Ok(report)
    }

    fn product_id(&self, config: &RunConfig) -> Result<ProductId, ResolveError> {
        let ruleset = config.source.ruleset();
        match &config.product_id {
            Some(product) if ruleset.requires_product_id() => {
                info!("Using product id {} for {}", product, config.source);
                Ok(product.clone())
            }
            _ => ruleset.product_id(config, self.fetcher.transport()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_failed_pages() {
        let report = ScrapeReport {
            reviews: Vec::new(),
            pages: vec![
                PageOutcome { page: 1, url: "u1".to_string(), status: PageStatus::NoData },
                PageOutcome { page: 2, url: "u2".to_string(), status: PageStatus::Blocked("403".to_string()) },
                PageOutcome { page: 3, url: "u3".to_string(), status: PageStatus::Error("timeout".to_string()) },
            ],
        };

        assert_eq!(report.failures().map(|p| p.page).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(report.summary(), "0 reviews from 1 pages (2 failed)");
    }
}
