pub mod location;
pub mod meetup;
pub mod weather;

use anyhow::Result;

/// A cache table queried by an exact-match key.
///
/// Inserts are idempotent per natural key, so re-inserting rows that already
/// exist never produces duplicates. `insert` returns every row stored under
/// the key afterwards, in insertion order, with store-assigned ids.
#[async_trait::async_trait]
pub trait CacheTable: Send + Sync {
    type Key: ?Sized + Sync;
    type New: Sync;
    type Record: Send;

    async fn query_by_key(&self, key: &Self::Key) -> Result<Vec<Self::Record>>;

    async fn insert(&self, key: &Self::Key, rows: &[Self::New]) -> Result<Vec<Self::Record>>;
}
