//! `host[:port]` parsing for provider addresses.

use crate::config::TelnetConfig;
use crate::{DubboError, Result};
use std::fmt;
use std::str::FromStr;

/// Provider socket address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host`, `host:port`, `[v6]` or `[v6]:port`; the port defaults
    /// to 20880.
    ///
    /// IPv6 literals must be bracketed.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |message: &str| DubboError::InvalidAddress {
            input: input.to_string(),
            message: message.to_string(),
        };
        let parse_port = |port: &str| match port.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(invalid("port must be an integer between 1 and 65535")),
        };

        let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing closing bracket"))?;
            if !host.contains(':') {
                return Err(invalid("brackets are only allowed around IPv6 hosts"));
            }
            match tail {
                "" => (host, TelnetConfig::DEFAULT_PORT),
                _ => match tail.strip_prefix(':') {
                    Some(port) => (host, parse_port(port)?),
                    None => return Err(invalid("unexpected text after closing bracket")),
                },
            }
        } else {
            match trimmed.rsplit_once(':') {
                Some((host, _)) if host.contains(':') => {
                    return Err(invalid("IPv6 hosts must be written as [host]:port"));
                }
                Some((host, port)) => (host, parse_port(port)?),
                None => (trimmed, TelnetConfig::DEFAULT_PORT),
            }
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        Ok(Self::new(host, port))
    }
}

impl FromStr for ServerAddress {
    type Err = DubboError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
