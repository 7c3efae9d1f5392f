//! Centralized configuration for the Dubbo client.
//!
//! Defaults for the naming registry endpoints and the telnet session live here
//! as constants; runtime values are built from them by the owning modules.

use std::time::Duration;

/// Naming registry configuration.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const SERVICE_LIST_PATH: &'static str = "/nacos/v1/ns/service/list";
    pub const INSTANCE_LIST_PATH: &'static str = "/nacos/v1/ns/instance/list";
    pub const DEFAULT_PAGE_NO: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 1000;
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
    pub const USER_AGENT: &'static str = "dubbo-client/0.1";
    pub const FAILOVER_DIR_NAME: &'static str = "failover";
    pub const SNAPSHOT_DIR_NAME: &'static str = "snapshot";
}

/// Telnet session defaults.
pub struct TelnetConfig;

impl TelnetConfig {
    pub const DEFAULT_PORT: u16 = 20880;
    pub const FINISH_MARKER: &'static str = "dubbo>";
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
    pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);
    pub const READ_CHUNK_SIZE: usize = 4096;
}

/// Logging limits.
pub struct LogConfig;

impl LogConfig {
    /// Logged registry payloads are cut to this many characters.
    pub const MAX_PAYLOAD_CHARS: usize = 100;
}
