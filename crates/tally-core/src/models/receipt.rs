//! Receipt data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{FieldValue, Record};

/// Date format used for storing and comparing receipt dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage-assigned receipt identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub u64);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReceiptId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ReceiptId)
    }
}

/// A validated receipt.
///
/// Fields are private so a receipt can only change through
/// [`Receipt::corrected`], which re-runs validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReceiptDraft")]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<ReceiptId>,
    filename: String,
    vendor: String,
    date: NaiveDate,
    amount: Decimal,
    category: String,
    text: String,
    currency: String,
    language: String,
    uploaded_at: DateTime<Utc>,
    content_hash: String,
}

/// Unvalidated receipt input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReceiptDraft {
    pub id: Option<ReceiptId>,
    pub filename: String,
    pub vendor: String,
    pub date: String,
    pub amount: Amount,
    pub category: Option<String>,
    pub text: String,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub content_hash: String,
}

/// Amount as supplied by a caller: already numeric, or text to be parsed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Decimal),
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Number(Decimal::ZERO)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl Amount {
    fn resolve(&self) -> Result<Decimal, ValidationError> {
        let value = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => Decimal::from_str(s.trim())
                .map_err(|_| ValidationError::InvalidAmount(s.clone()))?,
        };
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(value));
        }
        Ok(value)
    }
}

/// Partial correction applied to a stored receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ReceiptUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
            && self.vendor.is_none()
            && self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.text.is_none()
            && self.currency.is_none()
            && self.language.is_none()
    }
}

impl ReceiptDraft {
    /// Validate and build a [`Receipt`].
    pub fn build(self) -> Result<Receipt, ValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::EmptyField("filename"));
        }
        if self.vendor.trim().is_empty() {
            return Err(ValidationError::EmptyField("vendor"));
        }
        let amount = self.amount.resolve()?;
        let date = parse_iso_date(&self.date)?;

        Ok(Receipt {
            id: self.id,
            filename: self.filename,
            vendor: self.vendor,
            date,
            amount,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Other".to_string()),
            text: self.text,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            language: self.language.unwrap_or_else(|| "en".to_string()),
            uploaded_at: self.uploaded_at.unwrap_or_else(Utc::now),
            content_hash: self.content_hash,
        })
    }
}

impl TryFrom<ReceiptDraft> for Receipt {
    type Error = ValidationError;

    fn try_from(draft: ReceiptDraft) -> Result<Self, Self::Error> {
        draft.build()
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    // chrono accepts unpadded fields, the stored form does not
    let well_formed = s.len() == 10
        && s.char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(ValidationError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

impl Receipt {
    /// Start a draft with the mandatory fields set.
    pub fn draft(
        filename: impl Into<String>,
        vendor: impl Into<String>,
        date: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> ReceiptDraft {
        ReceiptDraft {
            filename: filename.into(),
            vendor: vendor.into(),
            date: date.into(),
            amount: amount.into(),
            ..ReceiptDraft::default()
        }
    }

    pub fn id(&self) -> Option<ReceiptId> {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Copy of this receipt carrying a storage identifier.
    pub fn with_id(mut self, id: ReceiptId) -> Self {
        self.id = Some(id);
        self
    }

    /// Apply a manual correction, re-validating the result.
    pub fn corrected(&self, update: &ReceiptUpdate) -> Result<Receipt, ValidationError> {
        let pick = |new: &Option<String>, old: &str| new.clone().unwrap_or_else(|| old.to_string());

        ReceiptDraft {
            id: self.id,
            filename: pick(&update.filename, &self.filename),
            vendor: pick(&update.vendor, &self.vendor),
            date: update
                .date
                .clone()
                .unwrap_or_else(|| self.date.format(DATE_FORMAT).to_string()),
            amount: match &update.amount {
                Some(raw) => Amount::Text(raw.clone()),
                None => Amount::Number(self.amount),
            },
            category: Some(pick(&update.category, &self.category)),
            text: pick(&update.text, &self.text),
            currency: Some(pick(&update.currency, &self.currency)),
            language: Some(pick(&update.language, &self.language)),
            uploaded_at: Some(self.uploaded_at),
            content_hash: self.content_hash.clone(),
        }
        .build()
    }
}

impl Record for Receipt {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => match self.id {
                Some(id) => FieldValue::Number(id.0.into()),
                None => FieldValue::Null,
            },
            "filename" => FieldValue::Text(&self.filename),
            "vendor" => FieldValue::Text(&self.vendor),
            "date" => FieldValue::Date(self.date),
            "amount" => FieldValue::Number(self.amount),
            "category" => FieldValue::Text(&self.category),
            "text" => FieldValue::Text(&self.text),
            "currency" => FieldValue::Text(&self.currency),
            "language" => FieldValue::Text(&self.language),
            "uploaded_at" => FieldValue::Date(self.uploaded_at.date_naive()),
            "content_hash" => FieldValue::Text(&self.content_hash),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Receipt {
        Receipt::draft("walmart.txt", "Walmart", "2024-01-15", Decimal::new(1364, 2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_receipt_defaults() {
        let receipt = sample();
        assert_eq!(receipt.category(), "Other");
        assert_eq!(receipt.currency(), "USD");
        assert_eq!(receipt.language(), "en");
        assert_eq!(receipt.id(), None);
        assert_eq!(receipt.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_zero_amount_is_valid() {
        assert!(Receipt::draft("a.txt", "A", "2024-01-01", Decimal::ZERO).build().is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Receipt::draft("a.txt", "A", "2024-01-01", Decimal::new(-1, 2))
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::NegativeAmount(Decimal::new(-1, 2)));
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let err = Receipt::draft("a.txt", "A", "2024-01-01", "twelve").build().unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount("twelve".to_string()));
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for bad in ["2024-13-01", "2024-02-30", "01/15/2024", "2024-1-5", ""] {
            let result = Receipt::draft("a.txt", "A", bad, Decimal::ONE).build();
            assert!(
                matches!(result, Err(ValidationError::InvalidDate(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_vendor_and_filename_rejected() {
        assert_eq!(
            Receipt::draft("", "A", "2024-01-01", Decimal::ONE).build().unwrap_err(),
            ValidationError::EmptyField("filename")
        );
        assert_eq!(
            Receipt::draft("a.txt", "  ", "2024-01-01", Decimal::ONE).build().unwrap_err(),
            ValidationError::EmptyField("vendor")
        );
    }

    #[test]
    fn test_correction_revalidates() {
        let receipt = sample().with_id(ReceiptId(4));

        let update = ReceiptUpdate {
            vendor: Some("Costco".to_string()),
            amount: Some("20.10".to_string()),
            ..Default::default()
        };
        let corrected = receipt.corrected(&update).unwrap();
        assert_eq!(corrected.vendor(), "Costco");
        assert_eq!(corrected.amount(), Decimal::new(2010, 2));
        assert_eq!(corrected.id(), Some(ReceiptId(4)));
        assert_eq!(corrected.uploaded_at(), receipt.uploaded_at());

        let bad = ReceiptUpdate {
            date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(receipt.corrected(&bad).is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let receipt = sample();
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"date\":\"2024-01-15\""));
        let back: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);

        let tampered = json.replace("2024-01-15", "2024-99-15");
        assert!(serde_json::from_str::<Receipt>(&tampered).is_err());
    }

    #[test]
    fn test_record_fields() {
        let receipt = sample();
        assert_eq!(receipt.field("vendor"), Some(FieldValue::Text("Walmart")));
        assert_eq!(receipt.field("id"), Some(FieldValue::Null));
        assert_eq!(receipt.field("nope"), None);
    }
}
