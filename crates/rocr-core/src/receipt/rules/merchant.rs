//! Merchant name extraction.

use super::patterns::contains_date;
use super::{ExtractionMatch, FieldExtractor};

/// Merchant field extractor.
///
/// Merchant names sit at the top of a receipt, so only the first few
/// non-empty lines are considered.
pub struct MerchantExtractor {
    /// Number of leading non-empty lines to scan.
    scan_lines: usize,
    /// Minimum accepted length, in characters.
    min_len: usize,
    /// Accepted names are truncated to this many characters.
    max_len: usize,
}

impl MerchantExtractor {
    pub fn new() -> Self {
        Self {
            scan_lines: 5,
            min_len: 4,
            max_len: 80,
        }
    }

    /// Set the number of lines scanned.
    pub fn with_scan_lines(mut self, lines: usize) -> Self {
        self.scan_lines = lines;
        self
    }

    /// Set minimum and maximum merchant length.
    pub fn with_length_bounds(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }
}

impl Default for MerchantExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MerchantExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(self.scan_lines)
            .find(|line| !contains_date(line) && line.chars().count() >= self.min_len)
            .map(|line| {
                let name: String = line.chars().take(self.max_len).collect();
                ExtractionMatch::new(name, line)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn merchant_of(text: &str) -> Option<String> {
        MerchantExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_first_qualifying_line() {
        let text = "\n  \n  SM SUPERMARKET  \nMakati City\n2026-03-15";
        assert_eq!(merchant_of(text), Some("SM SUPERMARKET".to_string()));
    }

    #[test]
    fn test_skips_short_and_date_lines() {
        let text = "#12\n2026-03-15 10:41\nACE HARDWARE\n";
        assert_eq!(merchant_of(text), Some("ACE HARDWARE".to_string()));
    }

    #[test]
    fn test_sixth_line_never_picked() {
        let text = "03/15/2026\nabc\n--\n15-03-2026\nxy\nREAL MERCHANT NAME";
        assert_eq!(merchant_of(text), None);
    }

    #[test]
    fn test_truncated_to_max_len() {
        let long = "M".repeat(120);
        assert_eq!(merchant_of(&long).map(|m| m.chars().count()), Some(80));
    }

    #[test]
    fn test_length_counts_characters() {
        // Four characters, more than four bytes.
        assert_eq!(merchant_of("Café"), Some("Café".to_string()));
        assert_eq!(merchant_of("Caf"), None);
    }

    #[test]
    fn test_configured_scan_window() {
        let text = "a\nb\nSTORE";
        let extractor = MerchantExtractor::new().with_scan_lines(2);
        assert_eq!(extractor.extract(text), None);
    }
}
