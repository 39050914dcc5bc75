//! Partition sort over arbitrary record fields.

use crate::error::AnalyticsError;
use crate::record::{FieldValue, Record};

/// Sort `records` by the value of `sort_by`, returning a new vector.
///
/// Iterative quicksort with an explicit work stack: the pivot is the middle
/// element's value and two cursors scan inward swapping out-of-place
/// elements. Equal keys may be reordered. Values of different kinds are
/// unordered relative to each other and are left wherever the cursors stop.
///
/// Fewer than two records are returned as they are. Otherwise every record
/// must carry `sort_by`.
pub fn quicksort<T>(records: &[T], sort_by: &str, ascending: bool) -> Result<Vec<T>, AnalyticsError>
where
    T: Record + Clone,
{
    if records.len() < 2 {
        return Ok(records.to_vec());
    }

    let mut keyed: Vec<(FieldValue<'_>, usize)> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .field(sort_by)
                .map(|value| (value, index))
                .ok_or_else(|| AnalyticsError::UnknownField(sort_by.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let before = |a: &FieldValue<'_>, b: &FieldValue<'_>| if ascending { a < b } else { a > b };

    let mut stack: Vec<(isize, isize)> = vec![(0, keyed.len() as isize - 1)];

    while let Some((low, high)) = stack.pop() {
        if low >= high {
            continue;
        }

        let pivot = keyed[((low + high) / 2) as usize].0;
        let (mut i, mut j) = (low, high);

        while i <= j {
            while i < high && before(&keyed[i as usize].0, &pivot) {
                i += 1;
            }
            while j > low && before(&pivot, &keyed[j as usize].0) {
                j -= 1;
            }

            if i <= j {
                keyed.swap(i as usize, j as usize);
                i += 1;
                j -= 1;
            }
        }

        if low < j {
            stack.push((low, j));
        }
        if i < high {
            stack.push((i, high));
        }
    }

    Ok(keyed
        .into_iter()
        .map(|(_, index)| records[index].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn amounts(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|row| row.field("amount").unwrap().to_string())
            .collect()
    }

    fn rows(values: &[i64]) -> Vec<Row> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Row::new().with("id", i as i64).with("amount", *v))
            .collect()
    }

    #[test]
    fn test_ascending_and_descending() {
        let data = rows(&[5, 3, 9, 1, 7, 3]);

        let asc = quicksort(&data, "amount", true).unwrap();
        assert_eq!(amounts(&asc), vec!["1", "3", "3", "5", "7", "9"]);

        let desc = quicksort(&data, "amount", false).unwrap();
        assert_eq!(amounts(&desc), vec!["9", "7", "5", "3", "3", "1"]);

        // input untouched
        assert_eq!(amounts(&data), vec!["5", "3", "9", "1", "7", "3"]);
    }

    #[test]
    fn test_result_is_permutation() {
        let data = rows(&[4, 4, 2, 8, 2, 6, 0, 4]);
        let sorted = quicksort(&data, "amount", true).unwrap();

        let mut ids: Vec<String> = sorted
            .iter()
            .map(|row| row.field("id").unwrap().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_sorting_sorted_output_is_idempotent() {
        let data = rows(&[10, 1, 8, 2, 6, 3]);
        let once = quicksort(&data, "amount", false).unwrap();
        let twice = quicksort(&once, "amount", false).unwrap();
        assert_eq!(amounts(&once), amounts(&twice));
    }

    #[test]
    fn test_strings_and_dates() {
        let data = vec![
            Row::new().with("vendor", "target").with("date", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            Row::new().with("vendor", "amazon").with("date", NaiveDate::from_ymd_opt(2023, 12, 5).unwrap()),
            Row::new().with("vendor", "kroger").with("date", NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()),
        ];

        let by_vendor = quicksort(&data, "vendor", true).unwrap();
        let vendors: Vec<String> = by_vendor.iter().map(|r| r.field("vendor").unwrap().to_string()).collect();
        assert_eq!(vendors, vec!["amazon", "kroger", "target"]);

        let by_date = quicksort(&data, "date", false).unwrap();
        let dates: Vec<String> = by_date.iter().map(|r| r.field("date").unwrap().to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-09", "2023-12-05"]);
    }

    #[test]
    fn test_large_input_does_not_recurse() {
        let values: Vec<i64> = (0..20_000).map(|i| (i * 7919) % 20_000).collect();
        let sorted = quicksort(&rows(&values), "amount", true).unwrap();
        assert_eq!(sorted.len(), 20_000);
        assert!(sorted
            .windows(2)
            .all(|w| w[0].field("amount").unwrap() <= w[1].field("amount").unwrap()));
    }

    #[test]
    fn test_short_input_returned_as_is() {
        let single = vec![Row::new().with("vendor", "x")];
        assert_eq!(quicksort(&single, "missing", true).unwrap(), single);
        assert!(quicksort::<Row>(&[], "amount", true).unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_is_error() {
        let mut data = rows(&[2, 1]);
        data.push(Row::new().with("vendor", "no amount"));
        assert_eq!(
            quicksort(&data, "amount", true),
            Err(AnalyticsError::UnknownField("amount".to_string()))
        );
    }
}
