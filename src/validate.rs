//! Field validation grammars.
//!
//! Each function checks and normalizes one field's raw text into its typed
//! value, or rejects it with a human-readable reason for re-prompting. The
//! functions have no side effects and are idempotent: validating a
//! validator's own output reproduces it.

use std::sync::OnceLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").unwrap())
}

fn amount_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0|[1-9]\d*)(\.\d{1,2})?$").unwrap())
}

fn date_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap())
}

fn category_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+(?:[ -][A-Za-z]+)*$").unwrap())
}

fn currency_code_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").unwrap())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidField {
        field,
        reason: reason.into(),
    }
}

/// Collapse every run of 2 or more whitespace characters into a single space
/// and trim both ends.
pub fn normalize_spaces(raw: &str) -> String {
    whitespace_runs().replace_all(raw, " ").trim().to_owned()
}

/// Validate and normalize a record description.
///
/// Whitespace is normalized first, so the duplicate-word check always runs on
/// the cleaned text.
///
/// # Errors
/// Returns [Error::InvalidField] if the normalized text is empty, still
/// carries edge whitespace, or contains a case-insensitive immediate word
/// repetition such as "the the".
pub fn description(raw: &str) -> Result<String, Error> {
    let normalized = normalize_spaces(raw);

    if normalized.is_empty()
        || normalized.starts_with(char::is_whitespace)
        || normalized.ends_with(char::is_whitespace)
    {
        return Err(invalid(
            "description",
            "Description cannot be empty or start/end with spaces.",
        ));
    }

    if has_adjacent_duplicate_word(&normalized) {
        return Err(invalid(
            "description",
            "Duplicate consecutive words are not allowed.",
        ));
    }

    Ok(normalized)
}

/// Whether `text` contains the same word twice in a row, compared
/// case-insensitively.
///
/// A token only counts as the first word of a pair when it is a single whole
/// word, so "foo, foo" passes while "foo foo," does not.
fn has_adjacent_duplicate_word(text: &str) -> bool {
    let tokens: Vec<&str> = text.split(' ').collect();

    tokens.windows(2).any(|pair| {
        let mut words = pair[0].unicode_words();
        let whole_word = matches!(
            (words.next(), words.next()),
            (Some(first), None) if first == pair[0]
        );

        whole_word
            && pair[1]
                .unicode_words()
                .next()
                .is_some_and(|next| next.to_lowercase() == pair[0].to_lowercase())
    })
}

/// Validate an amount and parse it to its numeric value.
///
/// Accepts `0`, or a run of digits with no leading zero, optionally followed
/// by a decimal point and 1 or 2 digits. Signs, exponents, and thousands
/// separators are rejected.
///
/// # Errors
/// Returns [Error::InvalidField] if the trimmed text does not match the
/// amount grammar.
pub fn amount(raw: &str) -> Result<f64, Error> {
    let trimmed = raw.trim();

    if !amount_grammar().is_match(trimmed) {
        return Err(invalid("amount", "Use a valid number (e.g. 0, 10, 10.25)."));
    }

    trimmed
        .parse()
        .map_err(|error: std::num::ParseFloatError| invalid("amount", error.to_string()))
}

/// Validate a calendar date string.
///
/// The grammar is `YYYY-MM-DD` with month 01..12 and day 01..31, checked by
/// pattern only: the day count is not checked against the month or year, so
/// `2023-02-30` passes. This leniency is deliberate and load-bearing for
/// stored data written by earlier versions.
///
/// # Errors
/// Returns [Error::InvalidField] if the text is not in `YYYY-MM-DD` form.
pub fn date(raw: &str) -> Result<String, Error> {
    if !date_grammar().is_match(raw) {
        return Err(invalid("date", "Use YYYY-MM-DD format."));
    }

    Ok(raw.to_owned())
}

/// Validate and normalize a category label.
///
/// After whitespace normalization, the label must be alphabetic word-tokens
/// joined by single spaces or single hyphens.
///
/// # Errors
/// Returns [Error::InvalidField] if the normalized text contains anything
/// other than letters, single spaces, and single hyphens.
pub fn category(raw: &str) -> Result<String, Error> {
    let normalized = normalize_spaces(raw);

    if !category_grammar().is_match(&normalized) {
        return Err(invalid(
            "category",
            "Only letters, spaces, and hyphens are allowed.",
        ));
    }

    Ok(normalized)
}

/// Validate and normalize a currency code to 3 uppercase letters.
///
/// # Errors
/// Returns [Error::InvalidField] if the trimmed, uppercased text is not
/// exactly 3 ASCII letters.
pub fn currency_code(raw: &str) -> Result<String, Error> {
    let normalized = raw.trim().to_uppercase();

    if !currency_code_grammar().is_match(&normalized) {
        return Err(invalid(
            "currency",
            "Currency code must be 3 uppercase letters.",
        ));
    }

    Ok(normalized)
}

/// The structural gate for bulk data: whether `value` has the shape of a
/// record.
///
/// Requires an object with every record key present, a string `id`, and each
/// scalar field passing its field validator after stringification. Already
/// normalized data re-validates cleanly because validation is idempotent.
///
/// Returns a boolean rather than a reason: this is used for array filtering,
/// not user feedback.
pub fn record_shape(value: &serde_json::Value) -> bool {
    const REQUIRED: [&str; 7] = [
        "id",
        "description",
        "amount",
        "category",
        "date",
        "createdAt",
        "updatedAt",
    ];

    let Some(object) = value.as_object() else {
        return false;
    };

    if !REQUIRED.iter().all(|key| object.contains_key(*key)) {
        return false;
    }

    if !object["id"].is_string() {
        return false;
    }

    description(&stringify(&object["description"])).is_ok()
        && amount(&stringify(&object["amount"])).is_ok()
        && category(&stringify(&object["category"])).is_ok()
        && date(&stringify(&object["date"])).is_ok()
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Error;

    use super::{amount, category, currency_code, date, description, record_shape};

    #[test]
    fn description_normalizes_whitespace() {
        let got = description("  a   clean\t\tdescription ").unwrap();

        assert_eq!(got, "a clean description");
    }

    #[test]
    fn description_is_idempotent_on_valid_input() {
        let once = description("  weekly   groceries ").unwrap();
        let twice = description(&once).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn description_rejects_empty_text() {
        let result = description("   ");

        assert!(matches!(
            result,
            Err(Error::InvalidField {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn description_rejects_duplicate_words_after_normalization() {
        let result = description("Coffee  coffee");

        match result {
            Err(Error::InvalidField { reason, .. }) => {
                assert!(reason.contains("Duplicate"), "unexpected reason: {reason}")
            }
            other => panic!("expected a duplicate-word rejection, got {other:?}"),
        }
    }

    #[test]
    fn description_rejects_case_insensitive_repetition() {
        assert!(description("the THE movie ticket").is_err());
    }

    #[test]
    fn description_allows_repetition_split_by_punctuation() {
        // "foo, foo" has no whole word followed directly by the same word.
        assert!(description("foo, foo").is_ok());
    }

    #[test]
    fn description_rejects_repetition_with_trailing_punctuation() {
        assert!(description("foo foo,").is_err());
    }

    #[test]
    fn amount_accepts_zero_and_two_decimals() {
        assert_eq!(amount("0").unwrap(), 0.0);
        assert_eq!(amount("12.5").unwrap(), 12.5);
        assert_eq!(amount(" 10.25 ").unwrap(), 10.25);
    }

    #[test]
    fn amount_rejects_three_fractional_digits() {
        assert!(amount("0.999").is_err());
    }

    #[test]
    fn amount_rejects_signs_exponents_and_separators() {
        assert!(amount("-5").is_err());
        assert!(amount("+5").is_err());
        assert!(amount("1e3").is_err());
        assert!(amount("1,000").is_err());
    }

    #[test]
    fn amount_rejects_leading_zeros() {
        assert!(amount("007").is_err());
        assert!(amount("0").is_ok());
    }

    #[test]
    fn date_accepts_calendar_impossible_days() {
        // Day count is not checked against the month, by design.
        assert_eq!(date("2023-02-30").unwrap(), "2023-02-30");
    }

    #[test]
    fn date_rejects_out_of_range_fields() {
        assert!(date("2023-13-01").is_err());
        assert!(date("2023-00-10").is_err());
        assert!(date("2023-01-32").is_err());
        assert!(date("2023-01-00").is_err());
    }

    #[test]
    fn date_rejects_other_shapes() {
        assert!(date("2023/01/02").is_err());
        assert!(date("23-01-02").is_err());
        assert!(date(" 2023-01-02").is_err());
    }

    #[test]
    fn category_accepts_spaces_and_hyphens() {
        assert_eq!(category("Eating  Out").unwrap(), "Eating Out");
        assert_eq!(category("Food-and-Drink").unwrap(), "Food-and-Drink");
    }

    #[test]
    fn category_rejects_digits_and_double_separators() {
        assert!(category("Food2").is_err());
        assert!(category("Food--Drink").is_err());
        assert!(category("-Food").is_err());
        assert!(category("Food-").is_err());
    }

    #[test]
    fn currency_code_uppercases() {
        assert_eq!(currency_code(" usd ").unwrap(), "USD");
    }

    #[test]
    fn currency_code_rejects_wrong_lengths() {
        assert!(currency_code("US").is_err());
        assert!(currency_code("USDX").is_err());
        assert!(currency_code("U$D").is_err());
    }

    fn valid_record_value() -> serde_json::Value {
        json!({
            "id": "txn_0001",
            "description": "Weekly groceries",
            "amount": 42.5,
            "category": "Food",
            "date": "2023-02-30",
            "createdAt": "2023-03-01T10:00:00Z",
            "updatedAt": "2023-03-01T10:00:00Z",
        })
    }

    #[test]
    fn record_shape_accepts_a_valid_record() {
        assert!(record_shape(&valid_record_value()));
    }

    #[test]
    fn record_shape_stringifies_numeric_amounts() {
        let mut value = valid_record_value();
        value["amount"] = json!(10);

        assert!(record_shape(&value));
    }

    #[test]
    fn record_shape_rejects_missing_keys() {
        let mut value = valid_record_value();
        value.as_object_mut().unwrap().remove("updatedAt");

        assert!(!record_shape(&value));
    }

    #[test]
    fn record_shape_rejects_non_string_ids() {
        let mut value = valid_record_value();
        value["id"] = json!(1);

        assert!(!record_shape(&value));
    }

    #[test]
    fn record_shape_rejects_invalid_scalar_fields() {
        let mut value = valid_record_value();
        value["category"] = json!("Food2");

        assert!(!record_shape(&value));
    }

    #[test]
    fn record_shape_rejects_non_objects() {
        assert!(!record_shape(&json!("txn_0001")));
        assert!(!record_shape(&json!(null)));
    }
}
