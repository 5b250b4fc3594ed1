use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{LedgerError, LedgerFields, LedgerStore, Result};

/// In-memory ledger store implementation for testing and local runs.
///
/// This implementation keeps every collection in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    collections: Arc<RwLock<BTreeMap<String, BTreeMap<String, LedgerFields>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation on `collection` fail until reset.
    pub async fn set_fail_on_collection(&self, collection: &str, fail: bool) {
        let mut failing = self.failing.write().await;
        if fail {
            failing.insert(collection.to_string());
        } else {
            failing.remove(collection);
        }
    }

    /// Returns the number of records in a collection.
    pub async fn record_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Returns the total number of records across all collections.
    pub async fn total_records(&self) -> usize {
        self.collections
            .read()
            .await
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    async fn check_available(&self, collection: &str) -> Result<()> {
        if self.failing.read().await.contains(collection) {
            return Err(LedgerError::Unavailable {
                collection: collection.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn put(&self, collection: &str, key: &str, fields: LedgerFields) -> Result<()> {
        self.check_available(collection).await?;

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);

        metrics::counter!("ledger_writes_total", "collection" => collection.to_string())
            .increment(1);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<LedgerFields>> {
        self.check_available(collection).await?;

        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn list_collections(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .collections
            .read()
            .await
            .keys()
            .take(limit)
            .cloned()
            .collect())
    }
}
