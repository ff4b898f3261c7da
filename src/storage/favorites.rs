//! Favorite tickers
//!
//! Stored under one key as a JSON array, read on every access and
//! rewritten on every toggle. A missing or malformed value reads as an
//! empty list.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::StoreError;

use super::KeyValueStore;

pub const FAVORITES_KEY: &str = "favorites";

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    // serializes read-modify-write in toggle
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Favorites in the order they were added
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let Some(raw) = self.store.get(FAVORITES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(tickers) => Ok(tickers),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed favorites value");
                Ok(Vec::new())
            }
        }
    }

    pub fn contains(&self, ticker: &str) -> Result<bool, StoreError> {
        Ok(self.list()?.iter().any(|t| t == ticker))
    }

    /// Add `ticker` if absent, remove it otherwise. Returns whether it is a
    /// favorite afterwards.
    pub fn toggle(&self, ticker: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut tickers = self.list()?;

        let now_favorite = if let Some(idx) = tickers.iter().position(|t| t == ticker) {
            tickers.remove(idx);
            false
        } else {
            tickers.push(ticker.to_string());
            true
        };

        self.store
            .set(FAVORITES_KEY, &serde_json::to_string(&tickers)?)?;
        info!(ticker = %ticker, favorite = now_favorite, "Favorite toggled");
        Ok(now_favorite)
    }
}
