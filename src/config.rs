use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::review::parse_iso_instant;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Company name is required")]
    MissingCompanyName,
    #[error("Invalid start date: '{0}'")]
    InvalidStartDate(String),
    #[error("Invalid end date: '{0}'")]
    InvalidEndDate(String),
    #[error("Start date must be before end date")]
    StartAfterEnd,
    #[error("Invalid source: '{0}' (expected G2 or CAPTERRA)")]
    UnsupportedSource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    G2,
    Capterra,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::G2 => "G2",
            Source::Capterra => "CAPTERRA",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "G2" => Ok(Source::G2),
            "CAPTERRA" => Ok(Source::Capterra),
            _ => Err(ConfigError::UnsupportedSource(s.to_string())),
        }
    }
}

/// Path identifying a product on its source site: the company slug on G2,
/// `<id>/<slug>` on Capterra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(path: impl Into<String>) -> Self {
        ProductId(path.into().trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Run parameters as handed over by the config supplier, before validation.
#[derive(Debug, Clone, Default)]
pub struct RunConfigInput {
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
    pub source: String,
    pub session_cookie: Option<String>,
    pub product_id: Option<String>,
}

/// Validated, read-only parameters for one scrape.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub company_name: String,
    pub window: DateWindow,
    pub source: Source,
    pub session_cookie: Option<String>,
    /// Skips product lookup when set.
    pub product_id: Option<ProductId>,
}

impl RunConfig {
    pub fn company_slug(&self) -> String {
        self.company_name.trim().to_lowercase()
    }
}

/// Checks the rules in order; the first violation is returned.
pub fn validate(input: &RunConfigInput) -> Result<RunConfig, ConfigError> {
    let company_name = input.company_name.trim();
    if company_name.is_empty() {
        return Err(ConfigError::MissingCompanyName);
    }

    let start = parse_iso_instant(&input.start_date)
        .ok_or_else(|| ConfigError::InvalidStartDate(input.start_date.clone()))?;
    let end = parse_iso_instant(&input.end_date)
        .ok_or_else(|| ConfigError::InvalidEndDate(input.end_date.clone()))?;
    if start > end {
        return Err(ConfigError::StartAfterEnd);
    }

    let source = input.source.parse::<Source>()?;

    Ok(RunConfig {
        company_name: company_name.to_string(),
        window: DateWindow { start, end },
        source,
        session_cookie: input
            .session_cookie
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        product_id: input
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ProductId::new),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RunConfigInput {
        RunConfigInput {
            company_name: "Acme".to_string(),
            start_date: "2023-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            source: "G2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_config() {
        let config = validate(&input()).unwrap();
        assert_eq!(config.source, Source::G2);
        assert_eq!(config.company_slug(), "acme");
        assert!(config.session_cookie.is_none());
        assert!(config.product_id.is_none());
    }

    #[test]
    fn rejects_empty_company_name() {
        let mut cfg = input();
        cfg.company_name = "   ".to_string();
        assert_eq!(validate(&cfg).unwrap_err(), ConfigError::MissingCompanyName);
    }

    #[test]
    fn rejects_invalid_start_date() {
        let mut cfg = input();
        cfg.start_date = "2023-13-45".to_string();
        assert!(matches!(validate(&cfg), Err(ConfigError::InvalidStartDate(_))));
    }

    #[test]
    fn rejects_invalid_end_date() {
        let mut cfg = input();
        cfg.end_date = "not a date".to_string();
        assert!(matches!(validate(&cfg), Err(ConfigError::InvalidEndDate(_))));
    }

    #[test]
    fn rejects_start_after_end() {
        let mut cfg = input();
        cfg.start_date = "2026-01-01".to_string();
        assert_eq!(validate(&cfg).unwrap_err(), ConfigError::StartAfterEnd);
    }

    #[test]
    fn rejects_unsupported_source() {
        let mut cfg = input();
        cfg.source = "TRUSTPILOT".to_string();
        assert_eq!(
            validate(&cfg).unwrap_err(),
            ConfigError::UnsupportedSource("TRUSTPILOT".to_string())
        );
    }

    #[test]
    fn first_failing_rule_wins() {
        let cfg = RunConfigInput {
            company_name: String::new(),
            start_date: "bad".to_string(),
            end_date: "bad".to_string(),
            source: "nope".to_string(),
            ..Default::default()
        };
        assert_eq!(validate(&cfg).unwrap_err(), ConfigError::MissingCompanyName);

        let cfg = RunConfigInput {
            company_name: "acme".to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: "2024-01-01".to_string(),
            source: "nope".to_string(),
            ..Default::default()
        };
        assert_eq!(validate(&cfg).unwrap_err(), ConfigError::StartAfterEnd);
    }

    #[test]
    fn equal_start_and_end_is_allowed() {
        let mut cfg = input();
        cfg.end_date = cfg.start_date.clone();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn source_parsing_ignores_case() {
        assert_eq!("capterra".parse::<Source>().unwrap(), Source::Capterra);
        assert_eq!(" g2 ".parse::<Source>().unwrap(), Source::G2);
        assert_eq!(Source::Capterra.to_string(), "CAPTERRA");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut cfg = input();
        cfg.session_cookie = Some("  ".to_string());
        cfg.product_id = Some("/135003/Acme/".to_string());
        let config = validate(&cfg).unwrap();
        assert!(config.session_cookie.is_none());
        assert_eq!(config.product_id.unwrap().as_str(), "135003/Acme");
    }

    #[test]
    fn window_is_inclusive() {
        let config = validate(&input()).unwrap();
        let window = config.window;
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + chrono::Duration::milliseconds(1)));
        assert!(!window.contains(window.start - chrono::Duration::milliseconds(1)));
    }
}
