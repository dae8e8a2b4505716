//! Per-connector lazy cache
//!
//! Values are computed at most once per key, even when several tasks ask
//! for the same key concurrently; a failed computation is not cached.

use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug)]
pub struct OnceCache<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for OnceCache<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> OnceCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value, or the result of `init` stored under `key`
    pub async fn get_or_try_init<F, Fut>(&self, key: &K, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(key.clone()).or_default().clone()
        };
        cell.get_or_try_init(init).await.cloned()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().await;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }
}
