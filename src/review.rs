use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

/// One review, in the shape written to the output document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub title: String,
    pub description: String,
    /// ISO-8601 instant when the source publishes one, raw page text otherwise.
    pub date: String,
    /// `NaN` when missing or unparseable; serialized as `null`.
    pub rating: f64,
    pub reviewer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<String>,
}

/// A finished review plus the instant used for date-window filtering.
#[derive(Debug, Clone)]
pub struct ExtractedReview {
    pub review: Review,
    pub published: Option<DateTime<Utc>>,
}

pub fn parse_rating(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Accepts a full RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_iso_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Millisecond precision with a `Z` suffix, e.g. `2024-05-01T00:00:00.000Z`.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collapses runs of whitespace (including newlines from nested markup) to one space.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_falls_back_to_nan() {
        assert_eq!(parse_rating(" 4.5 "), 4.5);
        assert!(parse_rating("").is_nan());
        assert!(parse_rating("five").is_nan());
    }

    #[test]
    fn parses_date_only_and_full_instants() {
        let day = parse_iso_instant("2024-05-01").unwrap();
        assert_eq!(format_instant(day), "2024-05-01T00:00:00.000Z");

        let offset = parse_iso_instant("2024-05-01T10:30:00+02:00").unwrap();
        assert_eq!(format_instant(offset), "2024-05-01T08:30:00.000Z");

        assert!(parse_iso_instant("").is_none());
        assert!(parse_iso_instant("yesterday").is_none());
    }

    #[test]
    fn nan_rating_serializes_as_null() {
        let review = Review {
            title: "Solid CRM".to_string(),
            description: String::new(),
            date: "2024-05-01T00:00:00.000Z".to_string(),
            rating: f64::NAN,
            reviewer_name: "Dana K.".to_string(),
            pros: None,
            cons: None,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert!(json["rating"].is_null());
        assert_eq!(json["reviewerName"], "Dana K.");
        assert!(json.get("pros").is_none());
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_text("  Great\n   tool \t overall "), "Great tool overall");
    }
}
