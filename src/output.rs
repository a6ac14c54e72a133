use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use log::info;
use thiserror::Error;

use crate::config::RunConfig;
use crate::review::Review;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize reviews: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<dir>/<company>_<source>.json`, both lowercased. The file always lands
/// directly inside `dir`, whatever the company name contains.
pub fn output_path(dir: &Path, config: &RunConfig) -> PathBuf {
    dir.join(format!(
        "{}_{}.json",
        file_stem(&config.company_slug()),
        config.source.as_str().to_lowercase()
    ))
}

fn file_stem(company: &str) -> String {
    company
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// Writes the reviews as a pretty-printed JSON array, replacing any earlier file.
pub fn write_reviews(dir: &Path, config: &RunConfig, reviews: &[Review]) -> Result<PathBuf, OutputError> {
    let json = serde_json::to_string_pretty(reviews)?;
    let path = output_path(dir, config);

    fs::create_dir_all(dir).map_err(|source| OutputError::Io { path: dir.to_path_buf(), source })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|source| OutputError::Io { path: path.clone(), source })?;

    file.write_all(json.as_bytes())
        .map_err(|source| OutputError::Io { path: path.clone(), source })?;

    info!("Wrote {} reviews to {}", reviews.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{validate, RunConfigInput};

    fn config() -> RunConfig {
        validate(&RunConfigInput {
            company_name: "Close".to_string(),
            start_date: "2023-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            source: "CAPTERRA".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn writes_pretty_json_named_after_company_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reviews");
        let reviews = vec![Review {
            title: "Good".to_string(),
            description: "Solid".to_string(),
            date: "May 3, 2024".to_string(),
            rating: f64::NAN,
            reviewer_name: "Lee".to_string(),
            pros: Some("Fast".to_string()),
            cons: Some(String::new()),
        }];

        let path = write_reviews(&out, &config(), &reviews).unwrap();

        assert_eq!(path, out.join("close_capterra.json"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  {"));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value[0]["reviewerName"], "Lee");
        assert!(value[0]["rating"].is_null());
        assert_eq!(value[0]["pros"], "Fast");
    }

    #[test]
    fn company_name_cannot_escape_output_dir() {
        let dir = Path::new("reviews");
        for company in ["../../etc/passwd", "/tmp/acme", "a\\..\\b"] {
            let config = validate(&RunConfigInput {
                company_name: company.to_string(),
                start_date: "2023-01-01".to_string(),
                end_date: "2025-12-31".to_string(),
                source: "G2".to_string(),
                ..Default::default()
            })
            .unwrap();

            let path = output_path(dir, &config);
            assert_eq!(path.parent(), Some(dir), "{} escaped to {}", company, path.display());
        }

        let config = validate(&RunConfigInput {
            company_name: "../Acme Corp".to_string(),
            start_date: "2023-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            source: "G2".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(output_path(dir, &config), dir.join(".._acme_corp_g2.json"));
    }

    #[test]
    fn empty_run_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_reviews(dir.path(), &config(), &[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }
}
