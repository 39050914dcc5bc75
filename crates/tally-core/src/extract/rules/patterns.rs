//! Common regex patterns for receipt field extraction.
//!
//! All patterns run against lower-cased receipt text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount candidates, applied in this order
    pub static ref AMOUNT_TOTAL: Regex = Regex::new(
        r"(?i)total[:\s]*\$?(\d+\.?\d*)"
    ).unwrap();

    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)amount[:\s]*\$?(\d+\.?\d*)"
    ).unwrap();

    pub static ref AMOUNT_DOLLAR: Regex = Regex::new(
        r"(?i)\$(\d+\.?\d*)"
    ).unwrap();

    pub static ref AMOUNT_BEFORE_TOTAL: Regex = Regex::new(
        r"(?i)(\d+\.\d{2})\s*(?:total|due)"
    ).unwrap();

    // Dates: ISO first, then US-style numeric
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\d{4}-\d{2}-\d{2}"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}"
    ).unwrap();
}

/// Amount patterns in evaluation order.
pub fn amount_patterns() -> [&'static Regex; 4] {
    [&*AMOUNT_TOTAL, &*AMOUNT_LABELED, &*AMOUNT_DOLLAR, &*AMOUNT_BEFORE_TOTAL]
}
