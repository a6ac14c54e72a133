//! Per-site rules: how to address listing pages, which headers to send and
//! how to turn a page into reviews.

mod capterra;
mod g2;

pub use capterra::Capterra;
pub use g2::G2;

use reqwest::header::HeaderMap;
use scraper::Html;

use crate::config::{ProductId, RunConfig, Source};
use crate::fetcher::{FetchError, Transport};
use crate::resolver::ResolveError;
use crate::review::ExtractedReview;

pub trait ReviewSource: Sync {
    fn source(&self) -> Source;

    /// True when `product_id` has to look the product up over the network.
    fn requires_product_id(&self) -> bool {
        false
    }

    fn product_id(&self, config: &RunConfig, transport: &dyn Transport) -> Result<ProductId, ResolveError>;

    fn listing_url(&self, product: &ProductId, page: u32) -> String;

    fn headers(&self, config: &RunConfig, product: &ProductId) -> Result<HeaderMap, FetchError>;

    /// Every review node on the page, in document order, before date filtering.
    fn extract(&self, document: &Html) -> Vec<ExtractedReview>;

    /// Whether a review whose date could not be parsed survives the window filter.
    fn keeps_undated(&self) -> bool {
        false
    }
}

impl Source {
    pub fn ruleset(&self) -> &'static dyn ReviewSource {
        match self {
            Source::G2 => &G2,
            Source::Capterra => &Capterra,
        }
    }
}
