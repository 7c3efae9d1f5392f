//! Store trait shared by the failover and snapshot tiers.

use super::CacheKey;
use crate::error::Result;

/// String store addressed by `CacheKey`.
///
/// Writes replace the whole value atomically; concurrent writers to the same
/// key are not coordinated, the last one wins. All operations are synchronous.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `None` if nothing was stored.
    fn read(&self, key: &CacheKey) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &CacheKey, value: &str) -> Result<()>;

    /// Check whether a value is stored under `key`.
    fn exists(&self, key: &CacheKey) -> Result<bool>;
}
