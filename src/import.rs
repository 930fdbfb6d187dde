//! The import/export gate: bulk structural validation before externally
//! supplied records may replace the store.

use crate::{Error, Record, validate};

/// Validate an import payload and parse it into records.
///
/// Validation is all-or-nothing: a single invalid element rejects the
/// entire batch, so the current store stays untouched unless every element
/// passes the record shape gate. On success the caller hands the result to
/// [crate::RecordStore::replace_all], order preserved.
///
/// # Errors
/// - [Error::ImportUnreadable] if the text is not JSON (or a shape-valid
///   element still cannot deserialize, e.g. a non-string timestamp).
/// - [Error::ImportNotArray] if the JSON is not an array.
/// - [Error::ImportInvalidRecord] with the index of the first element that
///   fails the shape gate.
pub fn parse_import(json_text: &str) -> Result<Vec<Record>, Error> {
    let value: serde_json::Value = serde_json::from_str(json_text)
        .map_err(|error| Error::ImportUnreadable(error.to_string()))?;

    let Some(items) = value.as_array() else {
        return Err(Error::ImportNotArray);
    };

    if let Some(index) = items.iter().position(|item| !validate::record_shape(item)) {
        return Err(Error::ImportInvalidRecord(index));
    }

    serde_json::from_value(value).map_err(|error| Error::ImportUnreadable(error.to_string()))
}

/// Serialize the full record collection for download.
///
/// Pretty-printed, in store order, with no filtering: the export is
/// independent of any active search or sort view.
///
/// # Errors
/// Returns [Error::Serialize] if the records cannot be rendered as JSON.
pub fn export_json(records: &[Record]) -> Result<String, Error> {
    serde_json::to_string_pretty(records).map_err(|error| Error::Serialize(error.to_string()))
}
