//! Amount extraction for receipts.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::amount_patterns;
use super::{ExtractionMatch, FieldRule};

/// Amount field extractor.
///
/// Every pattern contributes candidates; the largest plausible one is taken
/// as the receipt total.
#[derive(Debug, Clone)]
pub struct AmountRule {
    ceiling: Decimal,
}

impl AmountRule {
    /// Accept candidates in the open range `(0, ceiling)`.
    pub fn new(ceiling: Decimal) -> Self {
        Self { ceiling }
    }

    fn is_plausible(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount < self.ceiling
    }
}

impl Default for AmountRule {
    fn default() -> Self {
        Self::new(Decimal::from(10_000))
    }
}

impl FieldRule for AmountRule {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text)
            .into_iter()
            .reduce(|best, next| if next.value > best.value { next } else { best })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in amount_patterns() {
            for caps in pattern.captures_iter(text) {
                let Some(number) = caps.get(1) else { continue };
                let Some(amount) = parse_amount(number.as_str()) else { continue };
                if !self.is_plausible(amount) {
                    continue;
                }
                results.push(ExtractionMatch::new(amount, number.as_str()));
            }
        }

        results
    }
}

/// Parse a plain decimal such as `13.64` or `13.`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim_end_matches('.')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_max_candidate_wins() {
        let rule = AmountRule::default();
        let text = "milk $8.99\ntotal: $37.22";
        let found = rule.extract(text).unwrap();
        assert_eq!(found.value, dec("37.22"));
        assert_eq!(found.source, "37.22");
    }

    #[test]
    fn test_line_item_above_total_still_wins() {
        // known weakness of the max-candidate heuristic
        let rule = AmountRule::default();
        let text = "tv $499.00\ndiscount -$100.00\ntotal: $399.00";
        assert_eq!(rule.extract(text).unwrap().value, dec("499.00"));
    }

    #[test]
    fn test_out_of_range_candidates_dropped() {
        let rule = AmountRule::default();
        assert!(rule.extract("total: $0.00").is_none());
        assert!(rule.extract("total: $10000.00").is_none());
        assert_eq!(rule.extract("$12000 $9999.99").unwrap().value, dec("9999.99"));
    }

    #[test]
    fn test_all_patterns_contribute() {
        let rule = AmountRule::default();
        let found: Vec<Decimal> = rule
            .extract_all("amount: 12.50\n15.00 due")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(found, vec![dec("12.50"), dec("15.00")]);
    }

    #[test]
    fn test_trailing_dot_parses() {
        assert_eq!(parse_amount("13."), Some(dec("13")));
        assert_eq!(parse_amount("13.64"), Some(dec("13.64")));
    }

    #[test]
    fn test_no_amount() {
        assert!(AmountRule::default().extract("thank you for shopping").is_none());
    }
}
