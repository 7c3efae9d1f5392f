//! Registry payloads and query types.

use crate::config::RegistryConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Which registration roles a listing should include.
///
/// The two flags are independent; both may be set, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleFilter {
    pub providers: bool,
    pub consumers: bool,
}

impl RoleFilter {
    pub const fn providers_only() -> Self {
        Self {
            providers: true,
            consumers: false,
        }
    }

    pub const fn consumers_only() -> Self {
        Self {
            providers: false,
            consumers: true,
        }
    }

    pub const fn both() -> Self {
        Self {
            providers: true,
            consumers: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            providers: false,
            consumers: false,
        }
    }

    /// Check whether a service identifier belongs to an enabled role.
    pub fn matches(&self, dom: &str) -> bool {
        (self.providers && dom.starts_with("providers"))
            || (self.consumers && dom.starts_with("consumers"))
    }

    /// Keep the identifiers of enabled roles, preserving order.
    pub fn filter(&self, doms: &[String]) -> Vec<String> {
        doms.iter().filter(|d| self.matches(d)).cloned().collect()
    }
}

impl Default for RoleFilter {
    fn default() -> Self {
        Self::providers_only()
    }
}

/// One page of the registry's service list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub group_name: String,
    pub namespace_id: String,
    pub page_no: u32,
    pub page_size: u32,
}

/// Registry answer to a `PageRequest`.
///
/// `count` is the total number of services across all pages. The same shape
/// is what the failover and snapshot stores hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub doms: Vec<String>,
    #[serde(default)]
    pub count: u64,
}

/// Parameters of a service directory lookup.
#[derive(Debug, Clone)]
pub struct ServiceListQuery {
    pub roles: RoleFilter,
    /// Namespace to query; falls back to the resolver's namespace.
    pub namespace_id: Option<String>,
    pub group_name: Option<String>,
    pub page_no: u32,
    pub page_size: u32,
    /// Per-request timeout; falls back to the registry client's default.
    pub timeout: Option<Duration>,
}

impl Default for ServiceListQuery {
    fn default() -> Self {
        Self {
            roles: RoleFilter::default(),
            namespace_id: None,
            group_name: None,
            page_no: RegistryConfig::DEFAULT_PAGE_NO,
            page_size: RegistryConfig::DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl ServiceListQuery {
    pub fn new(roles: RoleFilter) -> Self {
        Self {
            roles,
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = Some(namespace_id.into());
        self
    }

    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn with_page(mut self, page_no: u32, page_size: u32) -> Self {
        self.page_no = page_no;
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// First page to fetch, with zero treated as unset.
    pub(crate) fn effective_page_no(&self) -> u32 {
        if self.page_no == 0 {
            RegistryConfig::DEFAULT_PAGE_NO
        } else {
            self.page_no
        }
    }

    /// Page size, with zero treated as unset.
    pub(crate) fn effective_page_size(&self) -> u32 {
        if self.page_size == 0 {
            RegistryConfig::DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }
}

/// Tier a listing was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Failover,
    Server,
    Snapshot,
}

/// Role-filtered service identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceListing {
    pub doms: Vec<String>,
    pub source: ListingSource,
}

impl ServiceListing {
    pub fn new(doms: Vec<String>, source: ListingSource) -> Self {
        Self { doms, source }
    }

    pub fn len(&self) -> usize {
        self.doms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doms.is_empty()
    }
}

/// A registered service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(rename = "ip")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub healthy: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
}

impl Instance {
    pub const METHODS_KEY: &'static str = "methods";

    /// Method names advertised in the `methods` metadata entry.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .get(Self::METHODS_KEY)
            .map(String::as_str)
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Registry answer to an instance list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceList {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hosts: Vec<Instance>,
}

/// Parameters of an instance list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceQuery {
    pub service_name: String,
    pub clusters: Vec<String>,
    pub namespace_id: Option<String>,
    pub group_name: Option<String>,
    pub healthy_only: bool,
}
