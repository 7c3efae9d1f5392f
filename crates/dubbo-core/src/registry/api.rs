//! Transport seam between the resolver and the naming registry.

use super::types::{InstanceList, InstanceQuery, PageRequest, PageResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Read-only view of a naming registry.
///
/// Implementations map registry status codes onto `DubboError`: 409 to
/// `Conflict`, 403 to `Forbidden`, anything else non-2xx to `Registry`.
#[async_trait]
pub trait NamingApi: Send + Sync {
    /// Fetch one page of the service list.
    async fn list_services(
        &self,
        request: &PageRequest,
        timeout: Option<Duration>,
    ) -> Result<PageResponse>;

    /// Fetch the instances registered for a service.
    async fn list_instances(&self, query: &InstanceQuery) -> Result<InstanceList>;
}
