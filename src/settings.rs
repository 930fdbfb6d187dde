//! Session-wide configuration: currency rates, display currency, spending
//! cap, and the category vocabulary.

use std::collections::BTreeMap;

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    storage::{SETTINGS_KEY, Storage},
};

/// The singleton configuration object, loaded once at startup and living for
/// the application session.
///
/// Every field has a serde default, so a stored configuration written by an
/// older version (or a partially corrupt one) still loads: absent keys take
/// their defaults and the effective configuration is persisted back
/// immediately (self-healing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// The currency raw record amounts are denominated in.
    ///
    /// Free-form in practice; the 3-letter shape is not enforced here.
    pub base_currency: String,
    /// The currency summaries are converted to for display.
    pub display_currency: String,
    /// Positive base→display multipliers keyed by currency code.
    ///
    /// Always merged one level, never replaced, so updating one currency's
    /// rate never removes the others and USD/EUR/GBP survive initialization.
    pub rates: BTreeMap<String, f64>,
    /// Spending cap compared against the sum of all amounts. `0` means no
    /// cap is configured.
    pub cap: f64,
    /// Suggested category labels, in display order.
    ///
    /// Guidance for autocomplete only, not a constraint on record
    /// categories.
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_owned(),
            display_currency: "USD".to_owned(),
            rates: BTreeMap::from([
                ("USD".to_owned(), 1.0),
                ("EUR".to_owned(), 0.92),
                ("GBP".to_owned(), 0.79),
            ]),
            cap: 0.0,
            categories: [
                "Food",
                "Books",
                "Transport",
                "Entertainment",
                "Fees",
                "Other",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl Settings {
    /// Load the effective settings from storage.
    ///
    /// Absent or malformed stored bytes degrade to the defaults (logged,
    /// never an error). Stored rates are merged one level over the default
    /// rates so the default currencies are always present. The effective
    /// settings are persisted back before returning.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] or [Error::Serialize] if the
    /// self-healing persist fails.
    pub fn load(storage: &mut dyn Storage) -> Result<Self, Error> {
        let mut settings = match storage.load(SETTINGS_KEY) {
            None => Self::default(),
            Some(bytes) => match serde_json::from_slice::<Self>(&bytes) {
                Ok(stored) => stored,
                Err(error) => {
                    tracing::warn!("stored settings are malformed, using defaults: {error}");
                    Self::default()
                }
            },
        };

        let mut rates = Self::default().rates;
        rates.append(&mut settings.rates);
        settings.rates = rates;

        settings.persist(storage)?;
        Ok(settings)
    }

    /// Merge a partial update into the settings and persist.
    ///
    /// `rates` is merged one level into the current map, never swapped out
    /// wholesale.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] or [Error::Serialize] if persistence
    /// fails; the in-memory settings keep the merged values regardless.
    pub fn update(&mut self, update: SettingsUpdate, storage: &mut dyn Storage) -> Result<(), Error> {
        if let Some(base_currency) = update.base_currency {
            self.base_currency = base_currency;
        }
        if let Some(display_currency) = update.display_currency {
            self.display_currency = display_currency;
        }
        if let Some(mut rates) = update.rates {
            self.rates.append(&mut rates);
        }
        if let Some(cap) = update.cap {
            self.cap = cap;
        }
        if let Some(categories) = update.categories {
            self.categories = categories;
        }

        self.persist(storage)
    }

    /// Convert an amount into the display currency.
    ///
    /// Multiplies by the display currency's rate, defaulting to 1 when no
    /// rate is recorded for it. Amounts are assumed to be denominated in
    /// `base_currency`; changing `base_currency` does not re-key the rates,
    /// which is a known, preserved quirk.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rates.get(&self.display_currency).copied().unwrap_or(1.0)
    }

    /// Convert an amount and render it as a currency string for the display
    /// currency, e.g. `$1,234.50`.
    pub fn format(&self, amount: f64) -> String {
        currency_string(self.convert(amount), &self.display_currency)
    }

    fn persist(&self, storage: &mut dyn Storage) -> Result<(), Error> {
        let bytes =
            serde_json::to_vec(self).map_err(|error| Error::Serialize(error.to_string()))?;

        tracing::debug!("persisting settings");
        storage.save(SETTINGS_KEY, &bytes)
    }
}

/// An explicit partial update for the settings.
///
/// Every field is optional and merged field-by-field; `rates` gets its own
/// one-level map merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    /// Replacement base currency code.
    pub base_currency: Option<String>,
    /// Replacement display currency code.
    pub display_currency: Option<String>,
    /// Rates to merge into the current rate map.
    pub rates: Option<BTreeMap<String, f64>>,
    /// Replacement spending cap.
    pub cap: Option<f64>,
    /// Replacement category vocabulary.
    pub categories: Option<Vec<String>>,
}

/// Render `number` as a currency string for the given code.
///
/// USD, EUR, and GBP get their symbols; any other code is used as a textual
/// unit prefix.
fn currency_string(number: f64, code: &str) -> String {
    let unit = currency_unit(code);

    let mut formatted = if number < 0.0 {
        Formatter::currency(&format!("-{unit}"))
            .unwrap()
            .precision(Precision::Decimals(2))
            .fmt_string(number.abs())
    } else if number > 0.0 {
        Formatter::currency(&unit)
            .unwrap()
            .precision(Precision::Decimals(2))
            .fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so the formatted string is spelled out
        format!("{unit}0.00")
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted.as_bytes()[formatted.len() - 3] != b'.' {
        formatted = format!("{formatted}0");
    }

    formatted
}

fn currency_unit(code: &str) -> String {
    match code {
        "USD" => "$".to_owned(),
        "EUR" => "\u{20ac}".to_owned(),
        "GBP" => "\u{a3}".to_owned(),
        other => format!("{other} "),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::storage::{MemoryStorage, SETTINGS_KEY, Storage};

    use super::{Settings, SettingsUpdate, currency_string};

    #[test]
    fn load_from_empty_storage_uses_defaults_and_self_heals() {
        let mut storage = MemoryStorage::new();

        let settings = Settings::load(&mut storage).unwrap();

        assert_eq!(settings, Settings::default());
        // The effective configuration was persisted immediately.
        let stored = storage.load(SETTINGS_KEY).expect("settings were persisted");
        let reloaded: Settings = serde_json::from_slice(&stored).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn load_fills_absent_keys_with_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .save(SETTINGS_KEY, br#"{"cap": 150.0}"#)
            .unwrap();

        let settings = Settings::load(&mut storage).unwrap();

        assert_eq!(settings.cap, 150.0);
        assert_eq!(settings.base_currency, "USD");
        assert_eq!(settings.categories, Settings::default().categories);
    }

    #[test]
    fn load_merges_stored_rates_over_default_rates() {
        let mut storage = MemoryStorage::new();
        storage
            .save(SETTINGS_KEY, br#"{"rates": {"JPY": 150.0, "EUR": 0.95}}"#)
            .unwrap();

        let settings = Settings::load(&mut storage).unwrap();

        assert_eq!(settings.rates["JPY"], 150.0);
        assert_eq!(settings.rates["EUR"], 0.95);
        // The defaults survive a stored map that omits them.
        assert_eq!(settings.rates["USD"], 1.0);
        assert_eq!(settings.rates["GBP"], 0.79);
    }

    #[test]
    fn load_degrades_malformed_bytes_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.save(SETTINGS_KEY, b"}{ not json").unwrap();

        let settings = Settings::load(&mut storage).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn update_merges_rates_without_removing_others() {
        let mut storage = MemoryStorage::new();
        let mut settings = Settings::default();

        settings
            .update(
                SettingsUpdate {
                    rates: Some(BTreeMap::from([("EUR".to_owned(), 0.95)])),
                    ..Default::default()
                },
                &mut storage,
            )
            .unwrap();

        assert_eq!(settings.rates["EUR"], 0.95);
        assert_eq!(settings.rates["USD"], 1.0);
        assert_eq!(settings.rates["GBP"], 0.79);
    }

    #[test]
    fn update_persists_after_every_change() {
        let mut storage = MemoryStorage::new();
        let mut settings = Settings::default();

        settings
            .update(
                SettingsUpdate {
                    cap: Some(200.0),
                    ..Default::default()
                },
                &mut storage,
            )
            .unwrap();

        let stored = storage.load(SETTINGS_KEY).expect("settings were persisted");
        let reloaded: Settings = serde_json::from_slice(&stored).unwrap();
        assert_eq!(reloaded.cap, 200.0);
    }

    #[test]
    fn convert_multiplies_by_the_display_currency_rate() {
        let mut settings = Settings::default();
        settings.display_currency = "EUR".to_owned();

        assert_eq!(settings.convert(100.0), 92.0);
    }

    #[test]
    fn convert_defaults_to_identity_for_unknown_codes() {
        let mut settings = Settings::default();
        settings.display_currency = "XYZ".to_owned();

        assert_eq!(settings.convert(100.0), 100.0);
    }

    #[test]
    fn format_renders_zero_and_trailing_zeros() {
        assert_eq!(currency_string(0.0, "USD"), "$0.00");
        assert_eq!(currency_string(12.3, "USD"), "$12.30");
    }

    #[test]
    fn format_separates_thousands() {
        assert_eq!(currency_string(1234.56, "USD"), "$1,234.56");
    }

    #[test]
    fn format_uses_the_display_currency_unit() {
        let mut settings = Settings::default();
        settings.display_currency = "EUR".to_owned();

        // 100 * 0.92 = 92, rendered in euros.
        assert_eq!(settings.format(100.0), "\u{20ac}92.00");
    }

    #[test]
    fn format_falls_back_to_the_code_for_unknown_units() {
        assert_eq!(currency_string(5.25, "NZD"), "NZD 5.25");
    }
}
