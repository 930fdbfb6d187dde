//! The search pipeline: compile the user's pattern, filter the collection,
//! and sort the result.
//!
//! Everything here is a pure read. The pipeline order is fixed: filter,
//! then sort. Sorting never affects which records match and vice versa.

use regex::{Regex, RegexBuilder};

use crate::Record;

/// The outcome of compiling a user-supplied search pattern.
///
/// An invalid pattern never crashes the query and never hides all records:
/// it behaves like no filter at all while carrying the reason, so callers
/// can tell "no filter, none requested" apart from "no filter, syntax
/// error" and surface a warning for the latter (fail-open).
#[derive(Debug, Clone)]
pub enum PatternFilter {
    /// A usable pattern; records are matched against it.
    Compiled(Regex),
    /// No pattern was requested; every record matches.
    NoFilter,
    /// The pattern did not compile; every record matches and the reason
    /// should be shown to the user.
    Invalid {
        /// The regex engine's description of the syntax error.
        reason: String,
    },
}

impl PatternFilter {
    /// The syntax error to surface, if the pattern failed to compile.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Invalid { reason } => Some(reason),
            _ => None,
        }
    }

    fn regex(&self) -> Option<&Regex> {
        match self {
            Self::Compiled(regex) => Some(regex),
            _ => None,
        }
    }
}

/// Compile a search pattern.
///
/// An empty pattern means no filter was requested. A syntax error also
/// disables filtering, but the result records the reason (see
/// [PatternFilter]).
pub fn compile_pattern(pattern: &str, case_insensitive: bool) -> PatternFilter {
    if pattern.is_empty() {
        return PatternFilter::NoFilter;
    }

    match RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(regex) => PatternFilter::Compiled(regex),
        Err(error) => PatternFilter::Invalid {
            reason: error.to_string(),
        },
    }
}

/// Whether a record passes the filter.
///
/// The pattern is tested against the record's description, category, amount
/// (in its canonical decimal form), and date, space-joined in that fixed
/// order. Without an active filter, every record matches.
pub fn matches(record: &Record, filter: &PatternFilter) -> bool {
    match filter.regex() {
        None => true,
        Some(regex) => regex.is_match(&search_text(record)),
    }
}

fn search_text(record: &Record) -> String {
    format!(
        "{} {} {} {}",
        record.description, record.category, record.amount, record.date
    )
}

/// The non-overlapping byte ranges of `text` where the pattern matched.
///
/// A lazy, global scan with the compiled pattern's flags; empty when no
/// filter is active. The rendering layer decides how to mark the ranges.
pub fn highlight_spans<'a>(
    text: &'a str,
    filter: &'a PatternFilter,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    filter
        .regex()
        .into_iter()
        .flat_map(move |regex| regex.find_iter(text).map(|found| (found.start(), found.end())))
}

/// How the filtered records should be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Oldest date first (lexicographic on the ISO string).
    DateAsc,
    /// Newest date first. The UI's default view.
    #[default]
    DateDesc,
    /// Description A to Z, case-insensitively.
    DescriptionAsc,
    /// Description Z to A, case-insensitively.
    DescriptionDesc,
    /// Smallest amount first.
    AmountAsc,
    /// Largest amount first.
    AmountDesc,
    /// Keep the input order.
    Unsorted,
}

impl SortKey {
    /// Parse the UI's sort value. Unknown text keeps the input order.
    pub fn parse(value: &str) -> Self {
        match value {
            "date_asc" => Self::DateAsc,
            "date_desc" => Self::DateDesc,
            "description_asc" => Self::DescriptionAsc,
            "description_desc" => Self::DescriptionDesc,
            "amount_asc" => Self::AmountAsc,
            "amount_desc" => Self::AmountDesc,
            _ => Self::Unsorted,
        }
    }
}

/// Return a sorted copy of `records` without mutating the input.
///
/// All keys sort stably: records with equal keys keep their relative input
/// order. ISO date strings compare lexicographically, which is
/// chronological; descriptions compare on their lowercase fold; amounts
/// compare numerically.
pub fn sort_records(records: &[Record], key: SortKey) -> Vec<Record> {
    let mut sorted = records.to_vec();

    match key {
        SortKey::Unsorted => {}
        SortKey::DateAsc => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::DateDesc => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::DescriptionAsc => sorted.sort_by_key(|record| record.description.to_lowercase()),
        SortKey::DescriptionDesc => {
            sorted.sort_by(|a, b| b.description.to_lowercase().cmp(&a.description.to_lowercase()))
        }
        SortKey::AmountAsc => sorted.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        SortKey::AmountDesc => sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
    }

    sorted
}

/// The filtered, sorted view of the collection plus the filter that
/// produced it.
#[derive(Debug)]
pub struct SearchResults {
    /// Records that passed the filter, in sorted order.
    pub records: Vec<Record>,
    /// The compiled-pattern-or-absence, so callers can surface
    /// [PatternFilter::error] and reuse the filter for highlighting.
    pub filter: PatternFilter,
}

/// Run the full pipeline: compile, filter, then sort.
pub fn search(
    records: &[Record],
    pattern: &str,
    case_insensitive: bool,
    key: SortKey,
) -> SearchResults {
    let filter = compile_pattern(pattern, case_insensitive);

    let matched: Vec<Record> = records
        .iter()
        .filter(|record| matches(record, &filter))
        .cloned()
        .collect();

    SearchResults {
        records: sort_records(&matched, key),
        filter,
    }
}
