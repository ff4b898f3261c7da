//! Per-fetch state tracking with latest-key-wins semantics
//!
//! A slot remembers which key it was last asked for. Completions carry
//! the ticket they were started with; a completion for a superseded
//! ticket is discarded.

use std::future::Future;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::MarketDataError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T, MarketDataError>> for FetchState<T> {
    fn from(result: Result<T, MarketDataError>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }
}

/// Handle for one in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket<K> {
    generation: u64,
    key: K,
}

impl<K> QueryTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

struct SlotInner<K, T> {
    generation: u64,
    key: Option<K>,
    state: FetchState<T>,
}

pub struct QuerySlot<K, T> {
    inner: RwLock<SlotInner<K, T>>,
}

impl<K, T> QuerySlot<K, T>
where
    K: Clone + PartialEq + std::fmt::Debug,
    T: Clone,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SlotInner {
                generation: 0,
                key: None,
                state: FetchState::Idle,
            }),
        }
    }

    /// Start a fetch for `key`, superseding any fetch already in flight
    pub async fn begin(&self, key: K) -> QueryTicket<K> {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.key = Some(key.clone());
        inner.state = FetchState::Loading;
        QueryTicket {
            generation: inner.generation,
            key,
        }
    }

    /// Apply a result. Returns `false` when the ticket was superseded.
    pub async fn complete(&self, ticket: QueryTicket<K>, result: Result<T, MarketDataError>) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != ticket.generation {
            debug!(key = ?ticket.key, "Discarding result for superseded query");
            return false;
        }
        inner.state = result.into();
        true
    }

    /// `begin`, await `fetch`, then `complete`
    pub async fn run<F, Fut>(&self, key: K, fetch: F) -> bool
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let ticket = self.begin(key).await;
        let result = fetch(ticket.key.clone()).await;
        self.complete(ticket, result).await
    }

    pub async fn state(&self) -> FetchState<T> {
        self.inner.read().await.state.clone()
    }

    pub async fn key(&self) -> Option<K> {
        self.inner.read().await.key.clone()
    }
}

impl<K, T> Default for QuerySlot<K, T>
where
    K: Clone + PartialEq + std::fmt::Debug,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
