//! Invokable method discovery from instance metadata.

use super::api::NamingApi;
use super::types::{Instance, InstanceQuery};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Looks up the methods a service's healthy instances advertise.
pub struct MethodLookup {
    api: Arc<dyn NamingApi>,
}

impl MethodLookup {
    pub fn new(api: Arc<dyn NamingApi>) -> Self {
        Self { api }
    }

    /// Methods advertised by the healthy instances of `service_name`.
    ///
    /// Names are unique and keep the order they were first seen in.
    pub async fn methods_of(
        &self,
        service_name: &str,
        clusters: &[String],
        namespace_id: Option<&str>,
        group_name: Option<&str>,
    ) -> Result<Vec<String>> {
        let query = InstanceQuery {
            service_name: service_name.to_string(),
            clusters: clusters.to_vec(),
            namespace_id: namespace_id.map(str::to_string),
            group_name: group_name.map(str::to_string),
            healthy_only: true,
        };

        let instances = self.api.list_instances(&query).await?;
        let methods = collect_methods(&instances.hosts);
        debug!(
            "Service {} exposes {} methods across {} instances",
            service_name,
            methods.len(),
            instances.hosts.len()
        );
        Ok(methods)
    }
}

/// Merge the method lists of healthy instances, first occurrence wins.
pub fn collect_methods(instances: &[Instance]) -> Vec<String> {
    let mut methods: Vec<String> = Vec::new();
    for method in instances
        .iter()
        .filter(|i| i.healthy)
        .flat_map(|i| i.methods())
    {
        if !methods.iter().any(|m| m == method) {
            methods.push(method.to_string());
        }
    }
    methods
}
