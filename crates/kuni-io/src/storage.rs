//! Color memo backed by the browser's `localStorage`.
//!
//! Each country is stored under its own key, `kuni.color.<name>`, so two
//! tabs writing different countries never clobber each other. Writes
//! never replace an existing key.
//!
//! Requires a browser environment (`wasm32-unknown-unknown` target).

use kuni_core::{ColorStore, StoreError};
use wasm_bindgen::JsValue;

/// Key prefix for memoized colors.
pub const KEY_PREFIX: &str = "kuni.color.";

/// Errors reaching `localStorage`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No window, or storage disabled (private browsing, sandboxed frame).
    #[error("local storage unavailable")]
    Unavailable,

    /// A storage call threw.
    #[error("local storage error: {0}")]
    Js(String),
}

impl From<JsValue> for StorageError {
    fn from(value: JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

/// The storage key for `country`.
#[must_use]
pub fn storage_key(country: &str) -> String {
    format!("{KEY_PREFIX}{country}")
}

/// [`ColorStore`] over `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageColorStore;

impl LocalStorageColorStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()?
            .ok_or(StorageError::Unavailable)
    }

    fn get(country: &str) -> Result<Option<String>, StorageError> {
        Ok(Self::storage()?.get_item(&storage_key(country))?)
    }

    fn put_if_absent(country: &str, hex: &str) -> Result<(), StorageError> {
        let storage = Self::storage()?;
        let key = storage_key(country);
        if storage.get_item(&key)?.is_none() {
            storage.set_item(&key, hex)?;
        }
        Ok(())
    }
}

impl ColorStore for LocalStorageColorStore {
    fn load(&self, country: &str) -> Result<Option<String>, StoreError> {
        Self::get(country).map_err(|e| StoreError::Read(e.to_string()))
    }

    fn save(&mut self, country: &str, hex: &str) -> Result<(), StoreError> {
        Self::put_if_absent(country, hex).map_err(|e| StoreError::Write(e.to_string()))
    }
}
