//! Time-bucketed aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::record::{FieldValue, Record};

/// Calendar period used to bucket records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    /// Monday through Sunday.
    Week,
    #[default]
    Month,
}

impl Period {
    /// First day of the period containing `date`.
    pub fn start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Label of the period starting at `start`.
    ///
    /// Days read `2024-01-15`, months `2024-01`, weeks
    /// `2024-01-15/2024-01-21`.
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Period::Day => start.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let end = start + Days::new(6);
                format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
            }
            Period::Month => start.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    /// Accepts `day`/`week`/`month` and the short forms `D`/`W`/`M`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Period::Day),
            "w" | "week" | "weekly" => Ok(Period::Week),
            "m" | "month" | "monthly" => Ok(Period::Month),
            _ => Err(AnalyticsError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Sum `value_field` per calendar period of `date_field`.
///
/// Output is chronological and only holds periods that contain at least one
/// dated record. Records whose date is missing or unparseable are dropped;
/// a dated record with a non-numeric value still opens its bucket but adds
/// nothing to it. If no record carries `date_field`, or none carries
/// `value_field`, the result is empty.
pub fn aggregate_by_period<T: Record>(
    records: &[T],
    date_field: &str,
    value_field: &str,
    period: Period,
) -> IndexMap<String, Decimal> {
    let has_dates = records.iter().any(|r| r.field(date_field).is_some());
    let has_values = records.iter().any(|r| r.field(value_field).is_some());
    if !has_dates || !has_values {
        return IndexMap::new();
    }

    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for record in records {
        let Some(date) = record.field(date_field).and_then(|value| coerce_date(&value)) else {
            continue;
        };

        let value = record
            .field(value_field)
            .and_then(|v| v.as_number())
            .unwrap_or(Decimal::ZERO);

        *buckets.entry(period.start(date)).or_insert(Decimal::ZERO) += value;
    }

    buckets
        .into_iter()
        .map(|(start, total)| (period.label(start), total))
        .collect()
}

/// Interpret a field value as a calendar date.
pub fn coerce_date(value: &FieldValue<'_>) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(date) => Some(*date),
        FieldValue::Text(text) => parse_flexible_date(text),
        FieldValue::Null | FieldValue::Number(_) => None,
    }
}

fn parse_flexible_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive())
}
