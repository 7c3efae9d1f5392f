//! Local key-value stores backing the resolver's failover and snapshot tiers.
//!
//! Both tiers share one abstraction:
//! - `KvStore` reads and writes string values by `CacheKey`
//! - `FileStore` keeps one file per key under a base directory
//!
//! The resolver only borrows the stores; creating and seeding them is the
//! caller's job.

mod file;
mod key;
mod traits;

pub use file::FileStore;
pub use key::CacheKey;
pub use traits::KvStore;
