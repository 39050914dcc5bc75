//! Small descriptive statistics.

use std::hash::Hash;

use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Median of `values`; the mean of the middle pair for even counts, zero
/// when empty.
pub fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }

    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    } else {
        sorted[mid]
    }
}

/// Most frequent value. The earliest-seen value wins ties.
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: IndexMap<T, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((value, count));
        }
    }

    best.map(|(value, _)| value)
}
