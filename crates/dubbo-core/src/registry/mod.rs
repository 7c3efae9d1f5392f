//! Naming registry access: service directory resolution and method lookup.
//!
//! This module provides:
//! - `NamingApi`, the seam to the registry, and its HTTP implementation
//! - `ServiceDirectoryResolver`, the failover → registry → snapshot pipeline
//! - `MethodLookup`, method names from healthy instance metadata

mod api;
mod client;
mod methods;
mod resolver;
mod types;

pub use api::NamingApi;
pub use client::{parse_server_addr, NamingHttpClient};
pub use methods::{collect_methods, MethodLookup};
pub use resolver::{FetchOutcome, ResolverOptions, ServiceDirectoryResolver};
pub use types::{
    Instance, InstanceList, InstanceQuery, ListingSource, PageRequest, PageResponse, RoleFilter,
    ServiceListQuery, ServiceListing,
};
