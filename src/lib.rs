//! Capbook is the domain core of a personal transaction ledger: users record
//! dated, categorized monetary entries, search/filter/sort them, and view
//! currency-converted summaries against an optional spending cap.
//!
//! The crate owns the record and settings models, the field validation
//! grammars, the CRUD record store with identifier assignment, the
//! filter→match→sort pipeline, and the import/export gate. Rendering, input
//! widgets, and real durability are external collaborators: persistence is
//! just the two-slot [Storage] trait, and query results cross the boundary
//! already converted and formatted.
//!
//! Everything is single-threaded and synchronous. Mutations write through to
//! storage before returning; reads never mutate anything.

#![warn(missing_docs)]

mod error;
mod import;
mod query;
mod record;
mod settings;
mod storage;
mod store;
mod summary;
pub mod validate;

pub use error::Error;
pub use import::{export_json, parse_import};
pub use query::{
    PatternFilter, SearchResults, SortKey, compile_pattern, highlight_spans, matches, search,
    sort_records,
};
pub use record::{Record, RecordDraft, RecordUpdate};
pub use settings::{Settings, SettingsUpdate};
pub use storage::{DirectoryStorage, MemoryStorage, RECORDS_KEY, SETTINGS_KEY, Storage};
pub use store::RecordStore;
pub use summary::{CapStatus, DayTotal, Summary, daily_totals, summarize};
