//! Integration tests for the resolver and method lookup over HTTP.
//!
//! A small axum app stands in for the Nacos naming API so the real
//! `NamingHttpClient` is exercised end to end, including status mapping and
//! pagination parameters.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use dubbo_client::{
    CacheKey, DubboError, FileStore, KvStore, ListingSource, MethodLookup, NamingApi,
    NamingHttpClient, PageRequest, ResolverOptions, RoleFilter, ServiceDirectoryResolver,
    ServiceListQuery,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// State behind the fake registry.
#[derive(Default)]
struct RegistryState {
    services: Vec<String>,
    /// Status to answer with instead of a listing; 0 means succeed.
    fail_with: AtomicU16,
    list_calls: AtomicUsize,
    instances: serde_json::Value,
    last_instance_query: Mutex<Option<HashMap<String, String>>>,
}

async fn service_list(
    State(state): State<Arc<RegistryState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.list_calls.fetch_add(1, Ordering::SeqCst);

    let fail_with = state.fail_with.load(Ordering::SeqCst);
    if fail_with != 0 {
        let status = StatusCode::from_u16(fail_with).unwrap();
        return (status, "registry failure").into_response();
    }

    let page_no: usize = params.get("pageNo").and_then(|v| v.parse().ok()).unwrap_or(1);
    let page_size: usize = params
        .get("pageSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);
    let doms: Vec<&String> = state
        .services
        .iter()
        .skip((page_no - 1) * page_size)
        .take(page_size)
        .collect();

    Json(json!({ "doms": doms, "count": state.services.len() })).into_response()
}

async fn instance_list(
    State(state): State<Arc<RegistryState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    *state.last_instance_query.lock().unwrap() = Some(params);
    Json(state.instances.clone())
}

async fn start_registry(state: Arc<RegistryState>) -> SocketAddr {
    let app = Router::new()
        .route("/nacos/v1/ns/service/list", get(service_list))
        .route("/nacos/v1/ns/instance/list", get(instance_list))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake registry failed");
    });
    addr
}

/// An address nothing listens on.
async fn dead_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

struct Stores {
    _temp: TempDir,
    failover: Arc<FileStore>,
    snapshot: Arc<FileStore>,
}

impl Stores {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let temp = TempDir::new().expect("Failed to create temp dir");
        Self {
            failover: Arc::new(FileStore::failover_in(temp.path())),
            snapshot: Arc::new(FileStore::snapshot_in(temp.path())),
            _temp: temp,
        }
    }

    fn resolver(&self, addr: SocketAddr, no_snapshot: bool) -> ServiceDirectoryResolver {
        let naming = NamingHttpClient::new(&addr.to_string()).unwrap();
        ServiceDirectoryResolver::new(
            Arc::new(naming),
            self.failover.clone(),
            self.snapshot.clone(),
            ResolverOptions::new("ns1").with_no_snapshot(no_snapshot),
        )
    }
}

fn providers(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("providers:org.demo.Service{}::", i))
        .collect()
}

#[tokio::test]
async fn test_two_pages_then_snapshot_serves_server_down_run() {
    let stores = Stores::new();
    let mut services = providers(1500);
    services.push("consumers:org.demo.Service0::".to_string());
    let state = Arc::new(RegistryState {
        services,
        ..RegistryState::default()
    });
    let addr = start_registry(state.clone()).await;

    let query = ServiceListQuery::new(RoleFilter::providers_only())
        .with_namespace("ns1")
        .with_page(1, 1000);
    let listing = stores
        .resolver(addr, false)
        .resolve(&query)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(listing.source, ListingSource::Server);
    assert_eq!(listing.len(), 1500);
    assert_eq!(listing.doms[0], "providers:org.demo.Service0::");
    assert_eq!(listing.doms[1499], "providers:org.demo.Service1499::");
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 2);

    let key = CacheKey::new(RoleFilter::providers_only(), "ns1");
    assert!(stores.snapshot.exists(&key).unwrap());
    assert!(!stores.failover.exists(&key).unwrap());

    let offline = stores
        .resolver(dead_address().await, false)
        .resolve(&query)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offline.source, ListingSource::Snapshot);
    assert_eq!(offline.doms, listing.doms);
}

#[tokio::test]
async fn test_failover_entry_means_no_http_traffic() {
    let stores = Stores::new();
    let state = Arc::new(RegistryState {
        services: providers(3),
        ..RegistryState::default()
    });
    let addr = start_registry(state.clone()).await;

    let key = CacheKey::new(RoleFilter::providers_only(), "ns1");
    stores
        .failover
        .write(&key, r#"{"doms":["providers:org.demo.Frozen::"],"count":1}"#)
        .unwrap();

    let listing = stores
        .resolver(addr, false)
        .resolve(&ServiceListQuery::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(listing.source, ListingSource::Failover);
    assert_eq!(listing.doms, vec!["providers:org.demo.Frozen::"]);
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_http_forbidden_surfaces() {
    let stores = Stores::new();
    let state = Arc::new(RegistryState::default());
    state.fail_with.store(403, Ordering::SeqCst);
    let addr = start_registry(state).await;

    let err = stores
        .resolver(addr, false)
        .resolve(&ServiceListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DubboError::Forbidden { .. }));
}

#[tokio::test]
async fn test_http_conflict_is_not_fatal() {
    let stores = Stores::new();
    let state = Arc::new(RegistryState::default());
    state.fail_with.store(409, Ordering::SeqCst);
    let addr = start_registry(state).await;

    let listing = stores
        .resolver(addr, true)
        .resolve(&ServiceListQuery::default())
        .await
        .unwrap()
        .unwrap();
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_http_server_error_respects_mode() {
    let stores = Stores::new();
    let state = Arc::new(RegistryState::default());
    state.fail_with.store(500, Ordering::SeqCst);
    let addr = start_registry(state).await;

    let err = stores
        .resolver(addr, true)
        .resolve(&ServiceListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DubboError::Registry { status: 500, .. }));

    // With snapshots allowed and none saved, the listing is unknown.
    let result = stores
        .resolver(addr, false)
        .resolve(&ServiceListQuery::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_method_lookup_over_http() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let state = Arc::new(RegistryState {
        instances: json!({
            "name": "DEFAULT_GROUP@@providers:org.demo.UserService::",
            "hosts": [
                {"ip": "10.0.0.8", "port": 20880, "healthy": true,
                 "metadata": {"methods": "getUser,listUsers"}},
                {"ip": "10.0.0.9", "port": 20880, "healthy": true,
                 "metadata": {"methods": "listUsers,deleteUser"}},
                {"ip": "10.0.0.10", "port": 20880, "healthy": true, "metadata": {}}
            ]
        }),
        ..RegistryState::default()
    });
    let addr = start_registry(state.clone()).await;

    let naming = NamingHttpClient::new(&addr.to_string()).unwrap();
    let methods = MethodLookup::new(Arc::new(naming))
        .methods_of(
            "providers:org.demo.UserService::",
            &["DEFAULT".to_string()],
            Some("ns1"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(methods, vec!["getUser", "listUsers", "deleteUser"]);

    let params = state.last_instance_query.lock().unwrap().clone().unwrap();
    assert_eq!(params["serviceName"], "providers:org.demo.UserService::");
    assert_eq!(params["healthyOnly"], "true");
    assert_eq!(params["clusters"], "DEFAULT");
    assert_eq!(params["namespaceId"], "ns1");
    assert!(!params.contains_key("groupName"));
}

#[tokio::test]
async fn test_slow_registry_reports_configured_timeout() {
    let app = Router::new().route(
        "/nacos/v1/ns/service/list",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "doms": [], "count": 0 }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("slow registry failed");
    });

    let client =
        NamingHttpClient::with_timeout(&addr.to_string(), Duration::from_secs(10)).unwrap();
    let request = PageRequest {
        group_name: String::new(),
        namespace_id: "ns1".to_string(),
        page_no: 1,
        page_size: 1000,
    };

    let err = client
        .list_services(&request, Some(Duration::from_millis(200)))
        .await
        .unwrap_err();
    match err {
        DubboError::Timeout(timeout) => assert_eq!(timeout, Duration::from_millis(200)),
        other => panic!("Expected Timeout, got: {:?}", other),
    }
}
