use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Flat attribute set stored under one key.
pub type LedgerFields = BTreeMap<String, String>;

/// Builds a [`LedgerFields`] map from `(name, value)` pairs.
pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> LedgerFields
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Core trait for ledger store implementations.
///
/// All implementations must be thread-safe (Send + Sync) since one store is
/// shared by every concurrently running saga.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Writes a record, replacing any existing record with the same key.
    ///
    /// Writes are idempotent: repeating a put with the same fields leaves
    /// the collection unchanged.
    async fn put(&self, collection: &str, key: &str, fields: LedgerFields) -> Result<()>;

    /// Reads the record stored under `key`, if any.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<LedgerFields>>;

    /// Lists collection names in ascending order, at most `limit` of them.
    async fn list_collections(&self, limit: usize) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    async fn put(&self, collection: &str, key: &str, fields: LedgerFields) -> Result<()> {
        (**self).put(collection, key, fields).await
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<LedgerFields>> {
        (**self).get(collection, key).await
    }

    async fn list_collections(&self, limit: usize) -> Result<Vec<String>> {
        (**self).list_collections(limit).await
    }
}
