//! Telnet invocation client for Dubbo providers.
//!
//! One invocation runs one session over a fresh TCP connection:
//! connect, prime the prompt with a bare newline, send the command, read until
//! the prompt comes back, then pull the `result: {...}` fragment out of the
//! text. The socket is dropped afterwards without sending `exit`.
//!
//! Connection failures are logged and reported as `Ok(None)`. A response that
//! never reaches the prompt within the configured timeouts is a
//! `ProtocolTimeout` error.

use super::address::ServerAddress;
use super::session::{InvocationCommand, TelnetSessionConfig};
use crate::config::TelnetConfig;
use crate::{DubboError, Result};
use regex::Regex;
use std::io;
use std::sync::LazyLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

static RESULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"result:\s*(\{.*\})").expect("result pattern must compile")
});

/// Invokes provider methods through the telnet console.
#[derive(Debug, Clone)]
pub struct TextProtocolInvoker {
    address: ServerAddress,
    config: TelnetSessionConfig,
}

impl TextProtocolInvoker {
    /// Create an invoker for `host[:port]` with default session settings.
    pub fn new(address: &str) -> Result<Self> {
        Ok(Self::with_address(ServerAddress::parse(address)?))
    }

    pub fn with_address(address: ServerAddress) -> Self {
        Self {
            address,
            config: TelnetSessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TelnetSessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    pub fn config(&self) -> &TelnetSessionConfig {
        &self.config
    }

    /// Run `invoke <interface>.<method>(<param>)`.
    pub async fn invoke(
        &self,
        interface: &str,
        method: &str,
        param: &str,
    ) -> Result<Option<String>> {
        let command = InvocationCommand::new(interface, method, param);
        self.execute(&command.to_string()).await
    }

    /// Run a raw console command and return its result.
    ///
    /// Returns the `result: {...}` fragment when present, otherwise the whole
    /// response text. `Ok(None)` means the session could not be established or
    /// broke before the response completed.
    pub async fn execute(&self, command: &str) -> Result<Option<String>> {
        let Some(mut stream) = self.connect().await else {
            return Ok(None);
        };
        let marker = self.config.marker_bytes();

        if let Err(e) = self.prime_prompt(&mut stream, &marker).await {
            warn!("[{}] Session failed before command: {}", self.address, e);
            return Ok(None);
        }

        let mut line = self.config.encoding.encode(command);
        line.push(b'\n');
        if let Err(e) = stream.write_all(&line).await {
            warn!("[{}] Failed to send command: {}", self.address, e);
            return Ok(None);
        }
        debug!("[{}] Sent {:?}", self.address, command);

        let Some(buffer) = self.drain_response(&mut stream, &marker).await? else {
            return Ok(None);
        };

        let text = self.config.encoding.decode(&buffer);
        Ok(Some(extract_result(&text)))
    }

    async fn connect(&self) -> Option<TcpStream> {
        let target = (self.address.host.as_str(), self.address.port);
        match timeout(self.config.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => {
                debug!("Connected to {}", self.address);
                Some(stream)
            }
            Ok(Err(e)) => {
                warn!("[{}] {}", self.address, e);
                None
            }
            Err(_) => {
                warn!(
                    "[{}] Connect timed out after {:?}",
                    self.address, self.config.connect_timeout
                );
                None
            }
        }
    }

    /// Send a bare newline and wait for the prompt.
    ///
    /// Not seeing the prompt within `read_timeout` is tolerated; whatever was
    /// read here is discarded.
    async fn prime_prompt(&self, stream: &mut TcpStream, marker: &[u8]) -> io::Result<()> {
        stream.write_all(b"\n").await?;

        let deadline = Instant::now() + self.config.read_timeout;
        let mut seen = Vec::new();
        let mut chunk = vec![0u8; TelnetConfig::READ_CHUNK_SIZE];

        while !contains_marker(&seen, marker) {
            match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed before prompt",
                    ))
                }
                Ok(Ok(n)) => seen.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    debug!(
                        "[{}] No prompt within {:?}, sending command anyway",
                        self.address, self.config.read_timeout
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    /// Read until the prompt reappears.
    ///
    /// The whole drain waits at most `response_timeout`. Until the first byte
    /// arrives that is the only bound, so a slow method is not cut short;
    /// afterwards each read also waits at most `read_timeout`. Exceeding
    /// either is a `ProtocolTimeout`.
    async fn drain_response(
        &self,
        stream: &mut TcpStream,
        marker: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        let started = Instant::now();
        let deadline = started + self.config.response_timeout;
        let mut buffer = Vec::new();
        let mut chunk = vec![0u8; TelnetConfig::READ_CHUNK_SIZE];

        while !contains_marker(&buffer, marker) {
            let read_deadline = if buffer.is_empty() {
                deadline
            } else {
                deadline.min(Instant::now() + self.config.read_timeout)
            };
            match timeout_at(read_deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => {
                    warn!(
                        "[{}] Connection closed after {} bytes without prompt",
                        self.address,
                        buffer.len()
                    );
                    return Ok(None);
                }
                Ok(Ok(n)) => buffer.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => {
                    warn!("[{}] Read failed: {}", self.address, e);
                    return Ok(None);
                }
                Err(_) => {
                    return Err(DubboError::ProtocolTimeout {
                        marker: self.config.finish_marker.clone(),
                        elapsed: started.elapsed(),
                    });
                }
            }
        }

        Ok(Some(buffer))
    }
}

fn contains_marker(haystack: &[u8], marker: &[u8]) -> bool {
    marker.is_empty() || haystack.windows(marker.len()).any(|w| w == marker)
}

/// Pull the first `result: {...}` fragment out of a console response.
///
/// Responses without one are returned unchanged.
pub fn extract_result(response: &str) -> String {
    match RESULT_PATTERN.captures(response).and_then(|c| c.get(1)) {
        Some(fragment) => fragment.as_str().to_string(),
        None => {
            warn!("No result fragment in response, returning raw text");
            response.to_string()
        }
    }
}
