//! Common regex patterns for receipt field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Amount: digits, optional comma groups, optional 1-2 decimals.
const AMOUNT: &str = r"\d+(?:,\d+)*(?:\.\d{1,2})?";

/// Currency markers recognized in front of an amount.
const CURRENCY: &str = r"(?:PHP|USD|\$|₱)";

/// Total keywords, matched anywhere in the text ("Subtotal" included).
const TOTAL_KEYWORD: &str = r"(?:grand\s+total|amount\s+due|total)";

lazy_static! {
    // Date patterns, strongest first
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{2})-(\d{2})\b"
    ).unwrap();

    pub static ref DATE_SLASH: Regex = Regex::new(
        r"\b(\d{2})/(\d{2})/(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_DASH_YEAR_LAST: Regex = Regex::new(
        r"\b(\d{2})-(\d{2})-(\d{4})\b"
    ).unwrap();

    // Total: keyword, then a currency marker, then the amount
    pub static ref TOTAL_WITH_CURRENCY: Regex = Regex::new(
        &format!(r"(?i){TOTAL_KEYWORD}[^\d]*?{CURRENCY}\s*({AMOUNT})")
    ).unwrap();

    // Total: keyword, then the amount
    pub static ref TOTAL_WITH_KEYWORD: Regex = Regex::new(
        &format!(r"(?i){TOTAL_KEYWORD}[^\d]*?({AMOUNT})")
    ).unwrap();

    // Any currency-prefixed amount
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        &format!(r"(?i){CURRENCY}\s*({AMOUNT})")
    ).unwrap();
}

/// Date patterns in priority order.
pub fn date_patterns() -> [&'static Regex; 3] {
    [&*DATE_ISO, &*DATE_SLASH, &*DATE_DASH_YEAR_LAST]
}

/// Whether any date pattern matches somewhere in `text`.
pub fn contains_date(text: &str) -> bool {
    date_patterns().iter().any(|re| re.is_match(text))
}
