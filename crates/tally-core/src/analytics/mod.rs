//! In-memory analytics over record collections.
//!
//! Every function takes the working set as a slice and returns a new value;
//! nothing here touches storage or keeps state between calls.

pub mod group;
pub mod search;
pub mod sort;
pub mod stats;
pub mod temporal;

pub use group::{aggregation_spec, group_and_aggregate, AggregateFn, AggregationSpec, GroupResult};
pub use search::{keyword_search, SearchHit};
pub use sort::quicksort;
pub use stats::{median, mode};
pub use temporal::{aggregate_by_period, coerce_date, Period};
