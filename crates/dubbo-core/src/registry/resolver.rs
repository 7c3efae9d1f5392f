//! Service directory resolution with failover and snapshot tiers.
//!
//! Order of operations:
//! 1. Failover store (pre-seeded listings, the registry is never contacted)
//! 2. Registry, fetching every page of the service list
//! 3. Snapshot store (last listing fetched from the registry)
//!
//! Failover is preferred even when stale; availability wins over freshness.

use super::api::NamingApi;
use super::types::{ListingSource, PageRequest, PageResponse, ServiceListQuery, ServiceListing};
use crate::cache::{CacheKey, KvStore};
use crate::util::truncate;
use crate::{DubboError, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Resolver behaviour switches.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Namespace used for cache keys when a query names none.
    pub namespace: String,
    /// Require live data: registry failures surface and snapshots are
    /// neither written nor read.
    pub no_snapshot: bool,
    /// Skip saving a partial listing when a snapshot already exists, so an
    /// earlier complete listing is not replaced by a shorter one.
    pub keep_complete_snapshot: bool,
}

impl ResolverOptions {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            no_snapshot: false,
            keep_complete_snapshot: false,
        }
    }

    pub fn with_no_snapshot(mut self, no_snapshot: bool) -> Self {
        self.no_snapshot = no_snapshot;
        self
    }

    pub fn with_keep_complete_snapshot(mut self, keep: bool) -> Self {
        self.keep_complete_snapshot = keep;
        self
    }
}

/// Pages gathered from the registry, and what stopped the fetch early.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Identifiers from every fetched page, in page order.
    pub doms: Vec<String>,
    /// Total reported by the last fetched page.
    pub count: u64,
    pub pages_fetched: u32,
    /// Non-fatal error that ended pagination before the last page.
    pub error: Option<DubboError>,
}

impl FetchOutcome {
    /// Whether at least one page arrived.
    pub fn has_content(&self) -> bool {
        self.pages_fetched > 0
    }

    /// Whether every page arrived.
    pub fn is_complete(&self) -> bool {
        self.has_content() && self.error.is_none()
    }

    fn into_page(self) -> PageResponse {
        PageResponse {
            doms: self.doms,
            count: self.count,
        }
    }
}

/// Resolves registered service identifiers for a namespace.
pub struct ServiceDirectoryResolver {
    api: Arc<dyn NamingApi>,
    failover: Arc<dyn KvStore>,
    snapshot: Arc<dyn KvStore>,
    options: ResolverOptions,
}

impl ServiceDirectoryResolver {
    pub fn new(
        api: Arc<dyn NamingApi>,
        failover: Arc<dyn KvStore>,
        snapshot: Arc<dyn KvStore>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            api,
            failover,
            snapshot,
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve the service list for `query`.
    ///
    /// `Ok(None)` means the registry was unreachable and no snapshot exists:
    /// the listing is unknown, which is not the same as an empty one.
    pub async fn resolve(&self, query: &ServiceListQuery) -> Result<Option<ServiceListing>> {
        let namespace = query
            .namespace_id
            .as_deref()
            .unwrap_or(&self.options.namespace);
        let cache_key = CacheKey::new(query.roles, namespace);

        info!(
            "Resolving service list for namespace {:?}, group {:?}, page {} x {}",
            namespace,
            query.group_name,
            query.effective_page_no(),
            query.effective_page_size()
        );

        if let Some(page) = self.read_tier(self.failover.as_ref(), &cache_key, "failover") {
            return Ok(Some(ServiceListing::new(
                query.roles.filter(&page.doms),
                ListingSource::Failover,
            )));
        }
        debug!("No failover entry for {}, querying registry", cache_key);

        let outcome = self.fetch_all_pages(query, namespace).await?;

        if self.options.no_snapshot {
            return Ok(Some(ServiceListing::new(
                query.roles.filter(&outcome.doms),
                ListingSource::Server,
            )));
        }

        if outcome.has_content() {
            let complete = outcome.is_complete();
            let page = outcome.into_page();
            if complete || !self.keeps_existing_snapshot(&cache_key) {
                self.save_snapshot(&cache_key, &page);
            } else {
                warn!(
                    "Listing for {} is partial ({} of {} services), keeping previous snapshot",
                    cache_key,
                    page.doms.len(),
                    page.count
                );
            }
            return Ok(Some(ServiceListing::new(
                query.roles.filter(&page.doms),
                ListingSource::Server,
            )));
        }

        error!(
            "Failed to get service list from registry, trying snapshot for namespace {:?}",
            namespace
        );
        match self.read_tier(self.snapshot.as_ref(), &cache_key, "snapshot") {
            Some(page) => Ok(Some(ServiceListing::new(
                query.roles.filter(&page.doms),
                ListingSource::Snapshot,
            ))),
            None => {
                warn!("Snapshot does not exist for {}", cache_key);
                Ok(None)
            }
        }
    }

    /// Fetch pages until the reported count is covered or an error stops it.
    ///
    /// Returns `Err` for `Forbidden`, and for any other failure except
    /// `Conflict` when `no_snapshot` is set.
    pub async fn fetch_all_pages(
        &self,
        query: &ServiceListQuery,
        namespace: &str,
    ) -> Result<FetchOutcome> {
        let page_size = query.effective_page_size();
        let mut page_no = query.effective_page_no();
        let mut outcome = FetchOutcome::default();

        loop {
            let request = PageRequest {
                group_name: query.group_name.clone().unwrap_or_default(),
                namespace_id: namespace.to_string(),
                page_no,
                page_size,
            };

            match self.api.list_services(&request, query.timeout).await {
                Ok(page) => {
                    debug!(
                        "Fetched page {} with {} services (total {})",
                        page_no,
                        page.doms.len(),
                        page.count
                    );
                    outcome.count = page.count;
                    outcome.doms.extend(page.doms);
                    outcome.pages_fetched += 1;

                    if page.count > u64::from(page_size) * u64::from(page_no) {
                        page_no += 1;
                    } else {
                        break;
                    }
                }
                Err(e @ DubboError::Conflict { .. }) => {
                    error!(
                        "Service list is being modified concurrently for namespace {:?}",
                        namespace
                    );
                    outcome.error = Some(e);
                    break;
                }
                Err(e @ DubboError::Forbidden { .. }) => {
                    error!("No right to list services in namespace {:?}", namespace);
                    return Err(e);
                }
                Err(e) => {
                    error!(
                        "Failed to fetch page {} for namespace {:?}: {}",
                        page_no, namespace, e
                    );
                    if self.options.no_snapshot {
                        return Err(e);
                    }
                    outcome.error = Some(e);
                    break;
                }
            }
        }

        Ok(outcome)
    }

    fn read_tier(&self, store: &dyn KvStore, key: &CacheKey, tier: &str) -> Option<PageResponse> {
        let content = match store.read(key) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {} entry {}: {}", tier, key, e);
                return None;
            }
        };

        match serde_json::from_str::<PageResponse>(&content) {
            Ok(page) => {
                debug!(
                    "Got {} from {} directory, content is {}",
                    key,
                    tier,
                    truncate(&content)
                );
                Some(page)
            }
            Err(e) => {
                warn!("Ignoring unparseable {} entry {}: {}", tier, key, e);
                None
            }
        }
    }

    fn keeps_existing_snapshot(&self, key: &CacheKey) -> bool {
        self.options.keep_complete_snapshot && self.snapshot.exists(key).unwrap_or(false)
    }

    fn save_snapshot(&self, key: &CacheKey, page: &PageResponse) {
        let content = match serde_json::to_string(page) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize snapshot for {}: {}", key, e);
                return;
            }
        };

        info!(
            "Content from registry: {}, saving snapshot {}",
            truncate(&content),
            key
        );
        if let Err(e) = self.snapshot.write(key, &content) {
            warn!("Failed to save snapshot for {}: {}", key, e);
        }
    }
}
