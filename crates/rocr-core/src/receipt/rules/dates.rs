//! Transaction date extraction.

use tracing::debug;

use super::patterns::{date_patterns, DATE_SLASH};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Patterns are tried in priority order (ISO, slash, dash with year last);
/// the first pattern that matches anywhere wins, and within it the first
/// match in document order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for pattern in date_patterns() {
            if let Some(m) = pattern.find(text) {
                let normalized = normalize_date(m.as_str());
                debug!("Date matched {:?} -> {}", m.as_str(), normalized);
                return Some(
                    ExtractionMatch::new(normalized, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }
        None
    }
}

/// Normalize a matched date to `YYYY-MM-DD` where the format allows it.
///
/// Only the slash form with a four-digit year is reordered (read as
/// MM/DD/YYYY). Every other match, including DD-MM-YYYY, is returned as-is.
pub fn normalize_date(raw: &str) -> String {
    if let Some(caps) = DATE_SLASH.captures(raw) {
        if caps[3].len() == 4 {
            return format!("{}-{}-{}", &caps[3], &caps[1], &caps[2]);
        }
    }
    raw.to_string()
}
