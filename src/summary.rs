//! Aggregate statistics and the trailing 7-day trend for the presentation
//! boundary.
//!
//! Monetary values crossing this boundary are already currency-converted;
//! the headline figures are additionally formatted by the settings model.

use time::{Date, Duration};

use crate::{Record, Settings};

/// Headline figures for the current collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Number of records.
    pub count: usize,
    /// Sum of all amounts, converted and formatted for display.
    pub total: String,
    /// The category with the largest summed amount. Ties go to the category
    /// seen first in store order; `None` when the collection is empty.
    pub top_category: Option<String>,
    /// Where spending sits relative to the configured cap.
    pub cap: CapStatus,
}

/// The cap comparison result.
///
/// The cap and the spending sum compare in base currency; only the
/// displayed delta is converted and formatted.
#[derive(Debug, Clone, PartialEq)]
pub enum CapStatus {
    /// No cap is configured (the cap is zero).
    NoCap,
    /// Spending is at or under the cap. Not an alerting state.
    Under {
        /// How much can still be spent, formatted for display.
        remaining: String,
    },
    /// Spending exceeds the cap. The alerting state.
    Over {
        /// How far over the cap spending is, formatted for display.
        by: String,
    },
}

impl CapStatus {
    /// Whether this status should raise an alert in the UI.
    pub fn is_alerting(&self) -> bool {
        matches!(self, Self::Over { .. })
    }
}

/// Compute the headline figures for `records`.
pub fn summarize(records: &[Record], settings: &Settings) -> Summary {
    let sum: f64 = records.iter().map(|record| record.amount).sum();

    let cap = if settings.cap > 0.0 {
        let remaining = settings.cap - sum;
        if remaining >= 0.0 {
            CapStatus::Under {
                remaining: settings.format(remaining),
            }
        } else {
            CapStatus::Over {
                by: settings.format(remaining.abs()),
            }
        }
    } else {
        CapStatus::NoCap
    };

    Summary {
        count: records.len(),
        total: settings.format(sum),
        top_category: top_category(records),
        cap,
    }
}

/// The category with the largest summed amount, first seen wins ties.
fn top_category(records: &[Record]) -> Option<String> {
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for record in records {
        match totals
            .iter_mut()
            .find(|(category, _)| *category == record.category)
        {
            Some((_, total)) => *total += record.amount,
            None => totals.push((&record.category, record.amount)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (category, total) in totals {
        if best.is_none_or(|(_, best_total)| total > best_total) {
            best = Some((category, total));
        }
    }

    best.map(|(category, _)| category.to_owned())
}

/// One day of the trailing trend.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTotal {
    /// The day in `YYYY-MM-DD` form.
    pub date: String,
    /// The day's summed amount, converted to the display currency.
    pub total: f64,
}

/// Per-day converted totals for the 7 calendar days ending at `today`,
/// oldest first.
///
/// A record counts toward a day when its `date` string equals the day's ISO
/// form exactly.
pub fn daily_totals(records: &[Record], settings: &Settings, today: Date) -> Vec<DayTotal> {
    (0..7)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let date = iso_date(day);
            let total = records
                .iter()
                .filter(|record| record.date == date)
                .map(|record| settings.convert(record.amount))
                .sum();

            DayTotal { date, total }
        })
        .collect()
}

fn iso_date(day: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}
