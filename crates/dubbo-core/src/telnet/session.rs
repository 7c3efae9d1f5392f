//! Telnet session settings and command formatting.

use crate::config::TelnetConfig;
use crate::{DubboError, Result};
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::time::Duration;

/// Text encoding used on the telnet session.
///
/// Only ASCII-compatible encodings are accepted: the prompt marker and the
/// `result:` label must survive a byte-level search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub fn utf8() -> Self {
        Self(UTF_8)
    }

    /// Look up an encoding by its WHATWG label, e.g. `gbk` or `latin1`.
    pub fn for_label(label: &str) -> Result<Self> {
        let encoding =
            Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| DubboError::Validation {
                field: "encoding".to_string(),
                message: format!("Unknown encoding label {:?}", label),
            })?;
        if !encoding.is_ascii_compatible() {
            return Err(DubboError::Validation {
                field: "encoding".to_string(),
                message: format!("{} is not ASCII-compatible", encoding.name()),
            });
        }
        Ok(Self(encoding))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Encode `text`; unmappable characters become numeric character
    /// references.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.0.encode(text);
        bytes.into_owned()
    }

    /// Decode `bytes`; malformed sequences are replaced.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.0.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

/// Settings for one telnet invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelnetSessionConfig {
    /// Prompt the provider prints when it is idle.
    pub finish_marker: String,
    pub encoding: TextEncoding,
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Bound on the initial prompt wait, and on silence between chunks once
    /// the response has started arriving.
    pub read_timeout: Duration,
    /// Bound on receiving the whole response after the command is sent,
    /// including the time the provider spends running the method.
    pub response_timeout: Duration,
}

impl Default for TelnetSessionConfig {
    fn default() -> Self {
        Self {
            finish_marker: TelnetConfig::FINISH_MARKER.to_string(),
            encoding: TextEncoding::default(),
            connect_timeout: TelnetConfig::CONNECT_TIMEOUT,
            read_timeout: TelnetConfig::READ_TIMEOUT,
            response_timeout: TelnetConfig::RESPONSE_TIMEOUT,
        }
    }
}

impl TelnetSessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finish_marker(mut self, marker: impl Into<String>) -> Self {
        self.finish_marker = marker.into();
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// The finish marker as it appears on the wire.
    pub(crate) fn marker_bytes(&self) -> Vec<u8> {
        self.encoding.encode(&self.finish_marker)
    }
}

/// An `invoke` command for the provider's telnet console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationCommand {
    pub interface: String,
    pub method: String,
    /// Argument list exactly as it goes between the parentheses.
    pub param_literal: String,
}

impl InvocationCommand {
    pub fn new(
        interface: impl Into<String>,
        method: impl Into<String>,
        param_literal: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            method: method.into(),
            param_literal: param_literal.into(),
        }
    }
}

impl fmt::Display for InvocationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invoke {}.{}({})",
            self.interface, self.method, self.param_literal
        )
    }
}
