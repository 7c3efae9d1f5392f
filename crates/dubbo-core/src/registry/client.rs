//! HTTP client for the Nacos naming API.
//!
//! Provides a wrapper around reqwest with:
//! - A base server address accepting `host:port` or a full URL
//! - Configurable default and per-request timeouts
//! - Mapping of registry status codes onto `DubboError`

use super::api::NamingApi;
use super::types::{InstanceList, InstanceQuery, PageRequest, PageResponse};
use crate::config::RegistryConfig;
use crate::{DubboError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Naming registry client over HTTP.
#[derive(Debug, Clone)]
pub struct NamingHttpClient {
    client: Client,
    base_url: Url,
    /// Default timeout for requests.
    default_timeout: Duration,
}

impl NamingHttpClient {
    /// Create a client for `server_addr` with the default timeout.
    pub fn new(server_addr: &str) -> Result<Self> {
        Self::with_timeout(server_addr, RegistryConfig::REQUEST_TIMEOUT)
    }

    /// Create a client for `server_addr` with a custom default timeout.
    pub fn with_timeout(server_addr: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_server_addr(server_addr)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(RegistryConfig::USER_AGENT)
            .build()
            .map_err(|e| DubboError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            base_url,
            default_timeout: timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Map a non-success registry status onto an error.
    pub fn status_error(status: StatusCode, namespace: &str, body: &str) -> DubboError {
        match status {
            StatusCode::CONFLICT => DubboError::Conflict {
                namespace: namespace.to_string(),
            },
            StatusCode::FORBIDDEN => DubboError::Forbidden {
                namespace: namespace.to_string(),
            },
            _ => DubboError::Registry {
                status: status.as_u16(),
                message: body.trim().to_string(),
            },
        }
    }

    async fn get_json<Q, T>(
        &self,
        path: &str,
        query: &Q,
        timeout: Option<Duration>,
        namespace: &str,
    ) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path).map_err(|e| DubboError::Validation {
            field: "path".to_string(),
            message: format!("Cannot join {} onto {}: {}", path, self.base_url, e),
        })?;
        let timeout = timeout.unwrap_or(self.default_timeout);

        debug!("GET {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        if !status.is_success() {
            return Err(Self::status_error(status, namespace, &body));
        }

        serde_json::from_str(&body).map_err(|e| DubboError::Json {
            message: format!("Failed to parse response from {}: {}", url, e),
            source: Some(e),
        })
    }
}

#[async_trait]
impl NamingApi for NamingHttpClient {
    async fn list_services(
        &self,
        request: &PageRequest,
        timeout: Option<Duration>,
    ) -> Result<PageResponse> {
        self.get_json(
            RegistryConfig::SERVICE_LIST_PATH,
            request,
            timeout,
            &request.namespace_id,
        )
        .await
    }

    async fn list_instances(&self, query: &InstanceQuery) -> Result<InstanceList> {
        let mut params = vec![
            ("serviceName", query.service_name.clone()),
            ("clusters", query.clusters.join(",")),
            ("healthyOnly", query.healthy_only.to_string()),
        ];
        if let Some(namespace_id) = &query.namespace_id {
            params.push(("namespaceId", namespace_id.clone()));
        }
        if let Some(group_name) = &query.group_name {
            params.push(("groupName", group_name.clone()));
        }

        let namespace = query.namespace_id.as_deref().unwrap_or_default();
        self.get_json(
            RegistryConfig::INSTANCE_LIST_PATH,
            params.as_slice(),
            None,
            namespace,
        )
        .await
    }
}

fn transport_error(err: reqwest::Error, url: &Url, timeout: Duration) -> DubboError {
    if err.is_timeout() {
        DubboError::Timeout(timeout)
    } else {
        DubboError::Network {
            message: format!("GET {} failed: {}", url, err),
            source: Some(err),
        }
    }
}

/// Parse a registry address, defaulting the scheme to `http`.
pub fn parse_server_addr(server_addr: &str) -> Result<Url> {
    let trimmed = server_addr.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| DubboError::Validation {
        field: "server_addr".to_string(),
        message: format!("{:?} is not a valid registry address: {}", server_addr, e),
    })?;

    if url.host_str().is_none() {
        return Err(DubboError::Validation {
            field: "server_addr".to_string(),
            message: format!("{:?} has no host", server_addr),
        });
    }

    Ok(url)
}
