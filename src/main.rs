use review_scraper_lib::{logger, output, HttpTransport, Pipeline, RunConfigInput};

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use log::{info, warn, error};

#[derive(Parser)]
#[command(name = "review-scraper")]
#[command(about = "Scrape G2 or Capterra product reviews into a JSON file")]
#[command(version)]
struct Cli {
    /// Company name as it appears in the review site's URLs
    company: String,

    /// Review site: G2 or CAPTERRA
    #[arg(short, long, default_value = "G2")]
    source: String,

    /// First day of the review window (YYYY-MM-DD or RFC 3339)
    #[arg(long, default_value = "2023-01-01")]
    start_date: String,

    /// Last day of the review window (YYYY-MM-DD or RFC 3339)
    #[arg(long, default_value = "2025-12-31")]
    end_date: String,

    /// G2 session cookie copied from a logged-in browser
    #[arg(long, env = "G2_COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    /// Capterra product id (`<id>/<slug>`), skips the product search
    #[arg(long)]
    product_id: Option<String>,

    /// Directory the JSON file is written to
    #[arg(short, long, default_value = "reviews")]
    output_dir: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let input = RunConfigInput {
        company_name: cli.company,
        start_date: cli.start_date,
        end_date: cli.end_date,
        source: cli.source,
        session_cookie: cli.cookie,
        product_id: cli.product_id,
    };

    let config = match review_scraper_lib::validate(&input) {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpTransport::new() {
        Ok(t) => t,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Scraping {} reviews for '{}' between {} and {}",
        config.source,
        config.company_name,
        config.window.start.format("%Y-%m-%d"),
        config.window.end.format("%Y-%m-%d")
    );

    let report = match Pipeline::new(transport).scrape(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in report.failures() {
        warn!("Page {} missing from output: {:?}", failure.page, failure.status);
    }
    info!("Run summary: {}", report.summary());

    match output::write_reviews(&cli.output_dir, &config, &report.reviews) {
        Ok(path) => {
            info!("Successfully saved {} reviews to {}", report.reviews.len(), path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
