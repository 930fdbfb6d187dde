//! The core record model: one ledger entry plus the structures used to
//! create and partially update it.

use serde::{Deserialize, Serialize};

use crate::{Error, validate};

/// One ledger transaction entry.
///
/// Records are created by [crate::RecordStore::create], never constructed
/// directly by callers, and mutated only through the store so that the
/// timestamps and the id-uniqueness invariant hold. Serialized field names
/// are camelCase to match the persisted and import/export JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque unique identifier, assigned by the store.
    pub id: String,
    /// Normalized description text.
    pub description: String,
    /// Non-negative amount with at most 2 fractional digits, denominated in
    /// the base currency.
    pub amount: f64,
    /// Normalized category label.
    pub category: String,
    /// Calendar date in `YYYY-MM-DD` form.
    ///
    /// Kept as a validated string: the lenient date grammar admits days such
    /// as `2023-02-30` that a calendar date type cannot represent.
    pub date: String,
    /// RFC 3339 instant set at creation, immutable afterwards.
    pub created_at: String,
    /// RFC 3339 instant refreshed on every mutation.
    pub updated_at: String,
}

/// The validated field set for creating a record.
///
/// The id and timestamps are the store's business and are assigned when the
/// draft is handed to [crate::RecordStore::create].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// Normalized description text.
    pub description: String,
    /// Non-negative amount.
    pub amount: f64,
    /// Normalized category label.
    pub category: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
}

impl RecordDraft {
    /// Build a draft from raw field text, running every field validator.
    ///
    /// # Errors
    /// Returns the first [Error::InvalidField] encountered, in field order:
    /// description, amount, category, date.
    pub fn parse(
        description: &str,
        amount: &str,
        category: &str,
        date: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            description: validate::description(description)?,
            amount: validate::amount(amount)?,
            category: validate::category(category)?,
            date: validate::date(date)?,
        })
    }
}

/// An explicit partial update for a record.
///
/// Every field is optional and merged field-by-field by
/// [crate::RecordStore::update]. The id and creation timestamp cannot be
/// named here, so they cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    /// Replacement description, already validated.
    pub description: Option<String>,
    /// Replacement amount, already validated.
    pub amount: Option<f64>,
    /// Replacement category, already validated.
    pub category: Option<String>,
    /// Replacement date, already validated.
    pub date: Option<String>,
}

impl RecordUpdate {
    /// An update that changes nothing (the timestamp still refreshes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the replacement description.
    pub fn description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the replacement amount.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the replacement category.
    pub fn category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the replacement date.
    pub fn date(mut self, date: String) -> Self {
        self.date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordDraft};

    #[test]
    fn parse_normalizes_every_field() {
        let draft = RecordDraft::parse("Bus   ticket", " 3.50 ", "Transport ", "2024-06-01")
            .expect("draft should be valid");

        assert_eq!(draft.description, "Bus ticket");
        assert_eq!(draft.amount, 3.5);
        assert_eq!(draft.category, "Transport");
        assert_eq!(draft.date, "2024-06-01");
    }

    #[test]
    fn parse_rejects_any_invalid_field() {
        assert!(RecordDraft::parse("Bus ticket", "-3.50", "Transport", "2024-06-01").is_err());
        assert!(RecordDraft::parse("Bus ticket", "3.50", "Transport", "06/01/2024").is_err());
    }

    #[test]
    fn serialized_field_names_are_camel_case() {
        let record = Record {
            id: "txn_0001".to_owned(),
            description: "Bus ticket".to_owned(),
            amount: 3.5,
            category: "Transport".to_owned(),
            date: "2024-06-01".to_owned(),
            created_at: "2024-06-01T08:00:00Z".to_owned(),
            updated_at: "2024-06-01T08:00:00Z".to_owned(),
        };

        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"createdAt\""), "got: {json}");
        assert!(json.contains("\"updatedAt\""), "got: {json}");
    }
}
