//! Date extraction for receipts.

use chrono::NaiveDate;

use super::patterns::{DATE_ISO, DATE_NUMERIC};
use super::{ExtractionMatch, FieldRule};

/// Field order of a numeric date format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    /// Year, month, day.
    Ymd,
    /// Month, day, year.
    Mdy,
}

/// A numeric date layout such as `MM/DD/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub order: FieldOrder,
    pub separator: char,
    /// 4 for a full year, 2 for a two-digit year.
    pub year_digits: usize,
}

/// Formats tried, in order, for every date candidate:
/// `YYYY-MM-DD`, `MM/DD/YYYY`, `MM-DD-YYYY`, `MM/DD/YY`, `MM-DD-YY`.
pub const DATE_FORMATS: [DateFormat; 5] = [
    DateFormat { order: FieldOrder::Ymd, separator: '-', year_digits: 4 },
    DateFormat { order: FieldOrder::Mdy, separator: '/', year_digits: 4 },
    DateFormat { order: FieldOrder::Mdy, separator: '-', year_digits: 4 },
    DateFormat { order: FieldOrder::Mdy, separator: '/', year_digits: 2 },
    DateFormat { order: FieldOrder::Mdy, separator: '-', year_digits: 2 },
];

impl DateFormat {
    /// Parse `s` if it has exactly this layout and names a real date.
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = s.split(self.separator).collect();
        if parts.len() != 3 || !parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }

        let (year, month, day) = match self.order {
            FieldOrder::Ymd => (parts[0], parts[1], parts[2]),
            FieldOrder::Mdy => (parts[2], parts[0], parts[1]),
        };
        if year.len() != self.year_digits || month.len() > 2 || day.len() > 2 {
            return None;
        }

        let year: i32 = year.parse().ok()?;
        let year = if self.year_digits == 2 { expand_two_digit_year(year) } else { year };
        NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
    }
}

/// Two-digit years 00-68 are 2000-2068, 69-99 are 1969-1999.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year <= 68 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Parse a date candidate against [`DATE_FORMATS`] in order.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|format| format.parse(s))
}

/// Date field extractor.
#[derive(Debug, Clone, Copy)]
pub struct DateRule;

impl DateRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for DateRule {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // ISO dates outrank numeric US-style dates regardless of position
        for pattern in [&*DATE_ISO, &*DATE_NUMERIC] {
            for m in pattern.find_iter(text) {
                if let Some(date) = parse_date(m.as_str()) {
                    results.push(ExtractionMatch::new(date, m.as_str()));
                }
            }
        }

        results
    }
}
