//! File-backed color memo for native front ends.
//!
//! The memo is a flat JSON object mapping canonical country names to hex
//! colors. A missing file is an empty memo.
//!
//! Writers serialize on an advisory lock held on a sibling `.lock` file
//! and replace the memo by renaming a fully written temporary file over
//! it, so a reader only ever sees a complete memo and concurrent sessions
//! never drop each other's entries.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use kuni_core::{ColorStore, StoreError};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Color memo stored in a JSON file.
///
/// Every access re-reads the file so that two processes sharing it see
/// each other's first assignments.
#[derive(Debug, Clone)]
pub struct JsonFileColorStore {
    path: PathBuf,
}

impl JsonFileColorStore {
    /// Use the memo at `path`. The file is created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the memo file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("memo"), OsString::from);
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn read_error(&self, e: &dyn std::fmt::Display) -> StoreError {
        StoreError::Read(format!("{}: {e}", self.path.display()))
    }

    fn write_error(&self, e: &dyn std::fmt::Display) -> StoreError {
        StoreError::Write(format!("{}: {e}", self.path.display()))
    }

    /// Entries are kept as raw JSON values so one malformed value does
    /// not make the rest of the memo unreadable.
    fn read_all(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| self.read_error(&e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.read_error(&e)),
        }
    }

    /// Exclusive advisory lock; released when the returned file drops.
    fn lock(&self) -> Result<File, StoreError> {
        fs::create_dir_all(self.dir()).map_err(|e| self.write_error(&e))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.write_error(&e))?;
        file.lock().map_err(|e| self.write_error(&e))?;
        Ok(file)
    }

    fn replace(&self, memo: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(memo).map_err(|e| self.write_error(&e))?;
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(|e| self.write_error(&e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| self.write_error(&e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(&e.error))?;
        Ok(())
    }
}

impl ColorStore for JsonFileColorStore {
    /// Non-string values come back as their JSON text, which the
    /// allocator treats as a corrupt entry.
    fn load(&self, country: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(country).map(|value| match value {
            Value::String(hex) => hex,
            other => other.to_string(),
        }))
    }

    fn save(&mut self, country: &str, hex: &str) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut memo = self.read_all()?;
        if memo.contains_key(country) {
            return Ok(());
        }
        memo.insert(country.to_owned(), Value::String(hex.to_owned()));
        self.replace(&memo)
    }
}
