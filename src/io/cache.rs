//! Skip-if-present table cache.
//!
//! A table stored under a key is never recomputed: if the key exists, its
//! contents are returned as-is. Deleting a stale table is the caller's job.
//!
//! The storage is behind `TableStore` so the contract can be tested without
//! touching the file system (`MemoryStore`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::AppError;
use crate::io::tables::{decode_rows, encode_rows};

/// Storage for keyed tables.
pub trait TableStore {
    fn contains(&self, key: &Path) -> bool;
    fn read<T: DeserializeOwned>(&self, key: &Path) -> Result<Vec<T>, AppError>;
    fn write<T: Serialize>(&self, key: &Path, rows: &[T]) -> Result<(), AppError>;
}

/// Whether a table came from the store or was computed by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Computed,
}

impl CacheStatus {
    pub fn label(self) -> &'static str {
        match self {
            CacheStatus::Hit => "cached",
            CacheStatus::Computed => "computed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub rows: Vec<T>,
    pub status: CacheStatus,
}

/// Return the table stored under `key`, or compute, store and return it.
pub fn load_or_compute<T, S, F>(store: &S, key: &Path, compute: F) -> Result<Cached<T>, AppError>
where
    T: Serialize + DeserializeOwned,
    S: TableStore,
    F: FnOnce() -> Result<Vec<T>, AppError>,
{
    if store.contains(key) {
        info!(path = %key.display(), "loading existing table");
        let rows = store.read(key)?;
        return Ok(Cached {
            rows,
            status: CacheStatus::Hit,
        });
    }

    let rows = compute()?;
    store.write(key, &rows)?;
    Ok(Cached {
        rows,
        status: CacheStatus::Computed,
    })
}

/// Tables as CSV files; keys are file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl TableStore for FsStore {
    fn contains(&self, key: &Path) -> bool {
        key.exists()
    }

    fn read<T: DeserializeOwned>(&self, key: &Path) -> Result<Vec<T>, AppError> {
        let file = File::open(key)
            .map_err(|e| AppError::new(3, format!("Failed to open table '{}': {e}", key.display())))?;
        decode_rows(file).map_err(|e| {
            AppError::new(
                3,
                format!("{}: {e} (delete the file to recompute it)", key.display()),
            )
        })
    }

    /// Writes to a sibling temp file and renames it into place, so an
    /// interrupted run never leaves a partial table under `key`.
    fn write<T: Serialize>(&self, key: &Path, rows: &[T]) -> Result<(), AppError> {
        if let Some(parent) = key.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new(3, format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }

        let tmp = temp_sibling(key);
        let file = File::create(&tmp)
            .map_err(|e| AppError::new(3, format!("Failed to create '{}': {e}", tmp.display())))?;
        encode_rows(BufWriter::new(file), rows)
            .map_err(|e| AppError::new(3, format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, key).map_err(|e| {
            AppError::new(
                3,
                format!("Failed to move '{}' to '{}': {e}", tmp.display(), key.display()),
            )
        })
    }
}

fn temp_sibling(key: &Path) -> PathBuf {
    let mut name = key.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    key.with_file_name(name)
}

/// In-memory store holding the encoded CSV bytes per key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<PathBuf, Vec<u8>>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl TableStore for MemoryStore {
    fn contains(&self, key: &Path) -> bool {
        self.tables.borrow().contains_key(key)
    }

    fn read<T: DeserializeOwned>(&self, key: &Path) -> Result<Vec<T>, AppError> {
        let tables = self.tables.borrow();
        let bytes = tables
            .get(key)
            .ok_or_else(|| AppError::new(3, format!("No table stored under '{}'", key.display())))?;
        decode_rows(bytes.as_slice())
    }

    fn write<T: Serialize>(&self, key: &Path, rows: &[T]) -> Result<(), AppError> {
        let mut bytes = Vec::new();
        encode_rows(&mut bytes, rows)?;
        self.tables.borrow_mut().insert(key.to_path_buf(), bytes);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
