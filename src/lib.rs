pub mod config;
pub mod review;
pub mod fetcher;
pub mod resolver;
pub mod extractor;
pub mod sources;
pub mod pipeline;
pub mod output;
pub mod logger;

// Exporting types for convenience
pub use config::{validate, ConfigError, DateWindow, ProductId, RunConfig, RunConfigInput, Source};
pub use review::Review;
pub use fetcher::{FetchError, HttpTransport, PageFetcher, Transport};
pub use resolver::{resolve_product_id, ResolveError};
pub use sources::ReviewSource;
pub use pipeline::{PageOutcome, PageStatus, Pipeline, ScrapeError, ScrapeReport, PAGE_COUNT};
pub use output::{write_reviews, OutputError};
