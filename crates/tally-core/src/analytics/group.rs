//! Grouped aggregation.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::record::{FieldValue, Record};

/// Aggregate function applied to one field of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    /// Sum of numeric values.
    Sum,
    /// Mean of numeric values, zero when there are none.
    Avg,
    /// Number of collected values, numeric or not.
    Count,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Count => "count",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateFn {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregateFn::Sum),
            "avg" => Ok(AggregateFn::Avg),
            "count" => Ok(AggregateFn::Count),
            _ => Err(AnalyticsError::UnknownAggregate(s.to_string())),
        }
    }
}

/// Field name to the aggregates computed over it, in output order.
pub type AggregationSpec = IndexMap<String, Vec<AggregateFn>>;

/// Per-group results keyed `"{field}_{function}"`.
pub type GroupResult = IndexMap<String, Decimal>;

/// Build an [`AggregationSpec`] from borrowed pairs.
pub fn aggregation_spec(pairs: &[(&str, &[AggregateFn])]) -> AggregationSpec {
    pairs
        .iter()
        .map(|(field, funcs)| (field.to_string(), funcs.to_vec()))
        .collect()
}

/// Group records by `group_by` and aggregate the fields named in `spec`.
///
/// Groups appear in first-seen order, keyed by the display form of the group
/// value. Records without the group key, or with a null one, are skipped.
/// Sum and average only see numeric values; count sees every collected
/// value for the field.
pub fn group_and_aggregate<T: Record>(
    records: &[T],
    group_by: &str,
    spec: &AggregationSpec,
) -> IndexMap<String, GroupResult> {
    let mut grouped: IndexMap<String, Vec<Vec<FieldValue<'_>>>> = IndexMap::new();

    for record in records {
        let key = match record.field(group_by) {
            None | Some(FieldValue::Null) => continue,
            Some(value) => value.to_string(),
        };

        let columns = grouped
            .entry(key)
            .or_insert_with(|| vec![Vec::new(); spec.len()]);

        for (column, field) in columns.iter_mut().zip(spec.keys()) {
            if let Some(value) = record.field(field) {
                column.push(value);
            }
        }
    }

    grouped
        .into_iter()
        .map(|(key, columns)| {
            let mut result = GroupResult::new();

            for ((field, funcs), values) in spec.iter().zip(&columns) {
                let numbers: Vec<Decimal> = values.iter().filter_map(FieldValue::as_number).collect();
                let sum: Decimal = numbers.iter().sum();

                for func in funcs {
                    let value = match func {
                        AggregateFn::Sum => sum,
                        AggregateFn::Avg if numbers.is_empty() => Decimal::ZERO,
                        AggregateFn::Avg => sum / Decimal::from(numbers.len()),
                        AggregateFn::Count => Decimal::from(values.len()),
                    };
                    result.insert(format!("{}_{}", field, func), value);
                }
            }

            (key, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Row, Value};
    use pretty_assertions::assert_eq;

    use AggregateFn::*;

    fn result(pairs: &[(&str, i64)]) -> GroupResult {
        pairs.iter().map(|(k, v)| (k.to_string(), Decimal::from(*v))).collect()
    }

    #[test]
    fn test_non_numeric_values_counted_but_not_summed() {
        let data = vec![
            Row::new().with("category", "Food").with("amount", 10i64),
            Row::new().with("category", "Food").with("amount", "x"),
            Row::new().with("category", "Food").with("amount", 20i64),
        ];
        let spec = aggregation_spec(&[("amount", &[Sum, Avg, Count])]);

        let groups = group_and_aggregate(&data, "category", &spec);
        assert_eq!(groups["Food"], result(&[("amount_sum", 30), ("amount_avg", 15), ("amount_count", 3)]));
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let data = vec![
            Row::new().with("vendor", "Shell").with("amount", 40i64).with("id", 1i64),
            Row::new().with("vendor", "Kroger").with("amount", 25i64).with("id", 2i64),
            Row::new().with("vendor", "Shell").with("amount", 35i64).with("id", 3i64),
        ];
        let spec = aggregation_spec(&[("amount", &[Sum]), ("id", &[Count])]);

        let groups = group_and_aggregate(&data, "vendor", &spec);
        let keys: Vec<&String> = groups.keys().collect();
        assert_eq!(keys, vec!["Shell", "Kroger"]);
        assert_eq!(groups["Shell"], result(&[("amount_sum", 75), ("id_count", 2)]));
        assert_eq!(groups["Kroger"], result(&[("amount_sum", 25), ("id_count", 1)]));
    }

    #[test]
    fn test_records_without_group_key_skipped() {
        let mut nameless = Row::new().with("amount", 5i64);
        nameless.insert("vendor", Value::Null);
        let data = vec![
            Row::new().with("amount", 99i64),
            nameless,
            Row::new().with("vendor", "Target").with("amount", 5i64),
        ];
        let spec = aggregation_spec(&[("amount", &[Sum])]);

        let groups = group_and_aggregate(&data, "vendor", &spec);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["Target"], result(&[("amount_sum", 5)]));
    }

    #[test]
    fn test_avg_without_numbers_is_zero() {
        let data = vec![Row::new().with("category", "Misc").with("note", "n/a")];
        let spec = aggregation_spec(&[("note", &[Avg, Count]), ("amount", &[Sum, Count])]);

        let groups = group_and_aggregate(&data, "category", &spec);
        assert_eq!(
            groups["Misc"],
            result(&[("note_avg", 0), ("note_count", 1), ("amount_sum", 0), ("amount_count", 0)])
        );
    }

    #[test]
    fn test_parse_aggregate_names() {
        assert_eq!("SUM".parse::<AggregateFn>(), Ok(Sum));
        assert_eq!("avg".parse::<AggregateFn>(), Ok(Avg));
        assert_eq!(
            "median".parse::<AggregateFn>(),
            Err(AnalyticsError::UnknownAggregate("median".to_string()))
        );
    }
}
