//! Dubbo Client - Nacos service resolution and telnet invocation.
//!
//! This crate resolves Dubbo services registered in a Nacos naming registry
//! and calls their methods through the providers' telnet console.
//!
//! - `registry` resolves service listings (failover → registry → snapshot)
//!   and the methods healthy instances advertise
//! - `telnet` runs `invoke` commands against a provider and extracts the result
//! - `cache` holds the local stores the resolver falls back on
//!
//! # Example
//!
//! ```rust,ignore
//! use dubbo_client::{
//!     FileStore, MethodLookup, NamingHttpClient, ResolverOptions, RoleFilter,
//!     ServiceDirectoryResolver, ServiceListQuery, TextProtocolInvoker,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dubbo_client::Result<()> {
//!     let naming = Arc::new(NamingHttpClient::new("127.0.0.1:8848")?);
//!     let resolver = ServiceDirectoryResolver::new(
//!         naming.clone(),
//!         Arc::new(FileStore::failover_in("/var/cache/dubbo")),
//!         Arc::new(FileStore::snapshot_in("/var/cache/dubbo")),
//!         ResolverOptions::new("public"),
//!     );
//!
//!     let query = ServiceListQuery::new(RoleFilter::providers_only());
//!     if let Some(listing) = resolver.resolve(&query).await? {
//!         println!("{} providers registered", listing.len());
//!     }
//!
//!     let methods = MethodLookup::new(naming)
//!         .methods_of("providers:org.demo.UserService::", &[], None, None)
//!         .await?;
//!     println!("methods: {:?}", methods);
//!
//!     let result = TextProtocolInvoker::new("10.0.0.8:20880")?
//!         .invoke("org.demo.UserService", "getUser", "1")
//!         .await?;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod telnet;
pub mod util;

// Re-export commonly used types
pub use cache::{CacheKey, FileStore, KvStore};
pub use error::{DubboError, Result};
pub use registry::{
    FetchOutcome, Instance, InstanceList, InstanceQuery, ListingSource, MethodLookup, NamingApi,
    NamingHttpClient, PageRequest, PageResponse, ResolverOptions, RoleFilter,
    ServiceDirectoryResolver, ServiceListQuery, ServiceListing,
};
pub use telnet::{
    InvocationCommand, ServerAddress, TelnetSessionConfig, TextEncoding, TextProtocolInvoker,
};
