//! Client-side key-value persistence and the favorites list built on it.

pub mod favorites;
pub mod file;
pub mod memory;

pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::error::StoreError;

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
