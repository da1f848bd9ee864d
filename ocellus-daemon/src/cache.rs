//! On-disk animation table store
//!
//! Tables live at `<dir>/<hex key>.table`. Each write goes to its own
//! temporary file in the same directory and is renamed into place, so
//! readers only ever see whole files and concurrent writers never share
//! a scratch file. Any problem reading a file is logged and treated as a miss.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use log::{debug, info, warn};
use tempfile::NamedTempFile;
use ocellus_core::render::cache::{self, CacheError, TableKey};
use ocellus_core::render::table::{AnimationTable, TableKind};

pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &TableKey) -> PathBuf {
        self.dir.join(format!("{}.table", key.hex()))
    }

    /// Cached table for `key`, if present and intact
    pub fn load(
        &self,
        key: &TableKey,
        kind: TableKind,
        canvas_size: u32,
        frame_count: usize,
    ) -> Option<AnimationTable> {
        let path = self.path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("cache miss {:?}", key);
                return None;
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                return None;
            }
        };
        match cache::decode(&bytes, key, kind, canvas_size, frame_count) {
            Ok(table) => {
                info!("Loaded {:?} table from {}", kind, path.display());
                Some(table)
            }
            Err(e) => {
                warn!("Ignoring cached table {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write `table` under `key`
    pub fn store(&self, table: &AnimationTable, key: &TableKey) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = cache::encode(table, key)?;
        let path = self.path(key);
        // Removed on drop if anything below fails
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    /// Cached table, or `build` it and store the result
    ///
    /// A failed store is logged; the freshly built table is still returned.
    pub fn load_or_build<E>(
        &self,
        key: &TableKey,
        kind: TableKind,
        canvas_size: u32,
        frame_count: usize,
        build: impl FnOnce() -> Result<AnimationTable, E>,
    ) -> Result<AnimationTable, E> {
        if let Some(table) = self.load(key, kind, canvas_size, frame_count) {
            return Ok(table);
        }
        let table = build()?;
        if let Err(e) = self.store(&table, key) {
            warn!("Could not cache {:?} table: {}", kind, e);
        }
        Ok(table)
    }
}
