//! The authoritative record collection: CRUD operations, identifier
//! assignment, and write-through persistence.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error, Record, RecordDraft, RecordUpdate,
    storage::{RECORDS_KEY, Storage},
    validate,
};

/// Textual prefix of every assigned record identifier.
const ID_PREFIX: &str = "txn_";

/// The in-memory record collection and the only component allowed to mutate
/// it.
///
/// Every mutating operation applies its in-memory change and then persists
/// synchronously before returning (write-through). There is no transaction
/// boundary between the two: if persistence fails, the in-memory state has
/// already diverged from durable state and the [Error::StorageWrite] is
/// reported without rollback.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Load the collection from storage.
    ///
    /// Absent or malformed stored bytes degrade to an empty collection, and
    /// stored elements that no longer pass the record shape gate are dropped.
    /// Neither case is an error; both are logged.
    pub fn load(storage: &dyn Storage) -> Self {
        let records = match storage.load(RECORDS_KEY) {
            None => Vec::new(),
            Some(bytes) => match serde_json::from_slice::<Vec<serde_json::Value>>(&bytes) {
                Ok(values) => {
                    let records: Vec<Record> = values
                        .iter()
                        .filter(|value| validate::record_shape(value))
                        .filter_map(|value| serde_json::from_value(value.clone()).ok())
                        .collect();

                    if records.len() != values.len() {
                        tracing::warn!(
                            "dropped {} stored records that failed the shape gate",
                            values.len() - records.len()
                        );
                    }

                    records
                }
                Err(error) => {
                    tracing::warn!("stored records are malformed, starting empty: {error}");
                    Vec::new()
                }
            },
        };

        Self { records }
    }

    /// The canonical record sequence, in store order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The identifier the next created record will receive.
    ///
    /// Scans every existing id for its numeric suffix (non-digit characters
    /// stripped), takes the maximum over the ids that parse, and returns
    /// max + 1 zero-padded to at least 4 digits behind the `txn_` prefix.
    /// Ids are never reused, so deletions leave gaps.
    pub fn next_id(&self) -> String {
        let max = self
            .records
            .iter()
            .filter_map(|record| numeric_suffix(&record.id))
            .max()
            .unwrap_or(0);

        format!("{ID_PREFIX}{:04}", max + 1)
    }

    /// Create a record from a validated draft, assign its id and timestamps,
    /// and persist.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] or [Error::Serialize] if persistence
    /// fails; the record is already in the collection when that happens.
    pub fn create(&mut self, draft: RecordDraft, storage: &mut dyn Storage) -> Result<Record, Error> {
        let now = now_timestamp();
        let record = Record {
            id: self.next_id(),
            description: draft.description,
            amount: draft.amount,
            category: draft.category,
            date: draft.date,
            created_at: now.clone(),
            updated_at: now,
        };

        self.records.push(record.clone());
        self.persist(storage)?;

        Ok(record)
    }

    /// Merge a partial update into the record with the given id, refresh its
    /// `updated_at`, and persist.
    ///
    /// The id and `created_at` cannot be changed: [RecordUpdate] cannot name
    /// them.
    ///
    /// # Errors
    /// Returns [Error::RecordNotFound] if no record has the id, and
    /// [Error::StorageWrite] or [Error::Serialize] if persistence fails.
    pub fn update(
        &mut self,
        id: &str,
        update: RecordUpdate,
        storage: &mut dyn Storage,
    ) -> Result<Record, Error> {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            return Err(Error::RecordNotFound(id.to_owned()));
        };

        if let Some(description) = update.description {
            record.description = description;
        }
        if let Some(amount) = update.amount {
            record.amount = amount;
        }
        if let Some(category) = update.category {
            record.category = category;
        }
        if let Some(date) = update.date {
            record.date = date;
        }
        record.updated_at = now_timestamp();

        let updated = record.clone();
        self.persist(storage)?;

        Ok(updated)
    }

    /// Remove the record with the given id.
    ///
    /// Returns whether anything was removed. Persistence only runs when the
    /// collection actually shrank, so a miss never touches storage.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] or [Error::Serialize] if persistence
    /// fails after a removal.
    pub fn delete(&mut self, id: &str, storage: &mut dyn Storage) -> Result<bool, Error> {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);

        if self.records.len() == before {
            return Ok(false);
        }

        self.persist(storage)?;
        Ok(true)
    }

    /// Replace the whole collection and persist.
    ///
    /// This is the import path. The store performs no validation here: the
    /// caller is responsible for having run the array through
    /// [crate::parse_import] first.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] or [Error::Serialize] if persistence
    /// fails.
    pub fn replace_all(
        &mut self,
        records: Vec<Record>,
        storage: &mut dyn Storage,
    ) -> Result<(), Error> {
        self.records = records;
        self.persist(storage)
    }

    fn persist(&self, storage: &mut dyn Storage) -> Result<(), Error> {
        let bytes =
            serde_json::to_vec(&self.records).map_err(|error| Error::Serialize(error.to_string()))?;

        tracing::debug!("persisting {} records", self.records.len());
        storage.save(RECORDS_KEY, &bytes)
    }
}

/// The digits of `id` with everything else stripped, parsed as a number.
fn numeric_suffix(id: &str) -> Option<u64> {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("a UTC instant always formats as RFC 3339")
}
