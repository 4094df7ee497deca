//! Rule-based field extractors for receipts.

pub mod amounts;
pub mod dates;
pub mod merchant;
pub mod patterns;

pub use amounts::{parse_amount, TotalExtractor, TotalMatch, TotalTier};
pub use dates::{normalize_date, DateExtractor};
pub use merchant::MerchantExtractor;
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// A matched field value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
