//! The persistence collaborator: a keyed byte store with two slots.
//!
//! The core does not design durability. It only requires that something can
//! hold bytes under a key: one slot for the serialized record array and one
//! for the serialized settings object. Implementations are injected into the
//! store and settings operations rather than reached for ambiently.

use std::{collections::HashMap, fs, io::ErrorKind, path::PathBuf};

use crate::Error;

/// Storage slot holding the serialized record array.
pub const RECORDS_KEY: &str = "capbook:records";

/// Storage slot holding the serialized settings object.
pub const SETTINGS_KEY: &str = "capbook:settings";

/// A keyed byte store the ledger persists into.
///
/// `load` never fails: missing or unreadable content is reported as `None`
/// and callers degrade to defaults. `save` may fail, and the failure is
/// surfaced to the mutating caller.
pub trait Storage {
    /// Read the bytes stored under `key`, or `None` if the slot is absent.
    fn load(&self, key: &str) -> Option<Vec<u8>>;

    /// Write `bytes` under `key`, replacing any previous content.
    ///
    /// # Errors
    /// Returns [Error::StorageWrite] if the bytes could not be stored.
    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), Error>;
}

/// An in-memory byte store.
///
/// Used by tests, and by embedders that bring their own durability and only
/// need the ledger's in-session behavior.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.get(key).cloned()
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), Error> {
        self.slots.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// A byte store keeping one file per key under a directory.
///
/// Key names have their `:` separator replaced so they are valid file names
/// on all platforms. The directory is created on the first save.
#[derive(Debug)]
pub struct DirectoryStorage {
    dir: PathBuf,
}

impl DirectoryStorage {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', ".")))
    }
}

impl Storage for DirectoryStorage {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Some(bytes),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                tracing::warn!("could not read stored \"{key}\": {error}");
                None
            }
        }
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.path_for(key), bytes))
            .map_err(|error| Error::StorageWrite {
                key: key.to_owned(),
                reason: error.to_string(),
            })
    }
}
