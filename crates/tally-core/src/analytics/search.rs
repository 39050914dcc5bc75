//! Keyword relevance search.

use serde::Serialize;

use crate::record::{FieldValue, Record};

/// A search result: the record plus its relevance score.
///
/// The score is absent when no query was given and the input was passed
/// through unscored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u32>,
}

impl<T: Record> Record for SearchHit<T> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match (name, self.relevance_score) {
            ("relevance_score", Some(score)) => Some(FieldValue::Number(score.into())),
            _ => self.record.field(name),
        }
    }
}

/// Rank `records` against a free-text query.
///
/// An empty query returns every record unchanged and unscored. Otherwise the
/// query is lower-cased and split on whitespace; each term scores one point
/// per substring occurrence in each listed, non-empty field. Records scoring
/// zero are dropped and the rest are ordered by score, highest first, ties
/// keeping input order.
pub fn keyword_search<T, S>(records: &[T], query: &str, fields: &[S]) -> Vec<SearchHit<T>>
where
    T: Record + Clone,
    S: AsRef<str>,
{
    if query.is_empty() {
        return records
            .iter()
            .map(|record| SearchHit {
                record: record.clone(),
                relevance_score: None,
            })
            .collect();
    }

    let query = query.to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();

    let mut hits: Vec<SearchHit<T>> = records
        .iter()
        .filter_map(|record| {
            let score = score_record(record, &terms, fields);
            (score > 0).then(|| SearchHit {
                record: record.clone(),
                relevance_score: Some(score),
            })
        })
        .collect();

    // sort_by_key is stable
    hits.sort_by_key(|hit| std::cmp::Reverse(hit.relevance_score));
    hits
}

fn score_record<T: Record, S: AsRef<str>>(record: &T, terms: &[&str], fields: &[S]) -> u32 {
    let mut score = 0;

    for field in fields {
        let Some(value) = record.field(field.as_ref()) else { continue };
        if value.is_empty() {
            continue;
        }

        let text = value.to_string().to_lowercase();
        for term in terms {
            score += text.matches(term).count() as u32;
        }
    }

    score
}
