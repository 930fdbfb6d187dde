//! Defines the crate level error type.

/// The errors that may occur in the ledger core.
///
/// None of these are fatal: every error is either recovered automatically
/// with a safe default or reported to the immediate caller for a retry or
/// user correction. Malformed stored data never surfaces as an error at all,
/// it degrades to defaults at load time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A record field failed its validation grammar.
    ///
    /// The reason is human-readable and intended for re-prompting the user.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the rejected field.
        field: &'static str,
        /// Why the raw text was rejected.
        reason: String,
    },

    /// An import payload could not be parsed as JSON.
    #[error("could not read import data: {0}")]
    ImportUnreadable(String),

    /// An import payload parsed as JSON but was not an array.
    #[error("import data must be a JSON array of records")]
    ImportNotArray,

    /// An element of an import payload was not a valid record.
    ///
    /// Import is all-or-nothing: a single invalid element rejects the whole
    /// batch and leaves the current collection untouched. The index of the
    /// first offending element is reported.
    #[error("record at index {0} is not a valid record")]
    ImportInvalidRecord(usize),

    /// Tried to update a record that is not in the collection.
    #[error("no record with the ID \"{0}\"")]
    RecordNotFound(String),

    /// Writing to the storage collaborator failed.
    ///
    /// The in-memory state has already been mutated when this is returned
    /// and is not rolled back, so memory and durable state have diverged.
    #[error("could not write \"{key}\" to storage: {reason}")]
    StorageWrite {
        /// The storage slot that could not be written.
        key: String,
        /// The collaborator's description of the failure.
        reason: String,
    },

    /// A value could not be serialized as JSON.
    #[error("could not serialize as JSON: {0}")]
    Serialize(String),
}
