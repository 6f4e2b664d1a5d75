//! Error types for the DNS cache.

use std::net::SocketAddr;
use std::time::Duration;

/// A specialized Result type for cache and dial operations.
pub type Result<T> = std::result::Result<T, DnsCacheError>;

/// Errors produced by the caching resolver and the dial helper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnsCacheError {
    /// The lookup capability failed to resolve a hostname.
    #[error("failed to resolve '{host}': {message}")]
    Resolve { host: String, message: String },

    /// A bounded resolution did not finish in time.
    #[error("resolving '{host}' timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },

    /// Invalid backend configuration.
    #[error("invalid DNS configuration: {0}")]
    Config(String),

    /// No async runtime was available to run the refresh task.
    #[error("no tokio runtime available: {0}")]
    Runtime(String),

    /// The dial target is not a valid `host:port` pair.
    #[error("invalid address '{addr}': {message}")]
    InvalidAddress { addr: String, message: String },

    /// The cache holds no addresses for the dial target.
    #[error("no addresses found for hostname: {0}")]
    NoAddresses(String),

    /// Connecting to a resolved address failed.
    #[error("failed to connect to {addr}: {message}")]
    Connect { addr: SocketAddr, message: String },
}

impl DnsCacheError {
    /// Create a resolution error.
    pub fn resolve(host: impl Into<String>, message: impl ToString) -> Self {
        Self::Resolve {
            host: host.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid address error.
    pub fn invalid_address(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            addr: addr.into(),
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connect(addr: SocketAddr, message: impl ToString) -> Self {
        Self::Connect {
            addr,
            message: message.to_string(),
        }
    }

    /// Whether this error came from a resolution deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
