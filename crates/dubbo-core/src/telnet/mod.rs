//! Telnet console client for Dubbo providers.
//!
//! Dubbo providers expose a line-oriented text console on their service port.
//! This module opens one session per call, synchronizes on the `dubbo>` prompt,
//! and extracts the `result: {...}` fragment from `invoke` responses.

mod address;
mod invoker;
mod session;

pub use address::ServerAddress;
pub use invoker::{extract_result, TextProtocolInvoker};
pub use session::{InvocationCommand, TelnetSessionConfig, TextEncoding};
