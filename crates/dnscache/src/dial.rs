//! Connection dialing through the DNS cache.
//!
//! [`CachingDialer`] resolves the host of a `host:port` target through a
//! shared [`CachingResolver`], then tries the cached addresses in random
//! order until one accepts a connection. Randomizing the order spreads
//! connections over every address of a host.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use dnscache::{CachingDialer, CachingResolver};
//!
//! let resolver = Arc::new(CachingResolver::new(Duration::from_secs(3), Duration::from_secs(5))?);
//! let dialer = CachingDialer::new(resolver);
//!
//! let stream = dialer.dial("api.example.com:443").await?;
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use http::uri::{Authority, InvalidUri};
use rand::seq::SliceRandom;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::dns::CachingResolver;
use crate::error::{DnsCacheError, Result};
use crate::logging::targets;

/// Opens a transport connection to a resolved socket address.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced.
    type Connection: Send;

    /// Connect to `addr`.
    fn connect(&self, addr: SocketAddr) -> BoxFuture<'_, io::Result<Self::Connection>>;
}

impl<T: Connector + ?Sized> Connector for Arc<T> {
    type Connection = T::Connection;

    fn connect(&self, addr: SocketAddr) -> BoxFuture<'_, io::Result<Self::Connection>> {
        (**self).connect(addr)
    }
}

/// Socket options for [`TcpConnector`].
#[derive(Clone, Debug)]
pub struct TcpConnectorConfig {
    /// Bound on each connection attempt. `None` means no timeout.
    pub connect_timeout: Option<Duration>,
    /// Enable TCP_NODELAY (disable Nagle's algorithm).
    pub no_delay: bool,
}

impl Default for TcpConnectorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(30)),
            no_delay: false,
        }
    }
}

impl TcpConnectorConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disable the connection timeout.
    pub fn no_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }

    /// Enable or disable TCP_NODELAY.
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.no_delay = enabled;
        self
    }
}

/// Plain TCP connector built on tokio's [`TcpStream`].
#[derive(Clone, Debug, Default)]
pub struct TcpConnector {
    config: TcpConnectorConfig,
}

impl TcpConnector {
    /// Create a connector with the given socket options.
    pub fn new(config: TcpConnectorConfig) -> Self {
        Self { config }
    }
}

impl Connector for TcpConnector {
    type Connection = TcpStream;

    fn connect(&self, addr: SocketAddr) -> BoxFuture<'_, io::Result<TcpStream>> {
        async move {
            let stream = match self.config.connect_timeout {
                Some(limit) => timeout(limit, TcpStream::connect(addr)).await.map_err(|_| {
                    io::Error::new(io::ErrorKind::TimedOut, "connection timed out")
                })??,
                None => TcpStream::connect(addr).await?,
            };
            stream.set_nodelay(self.config.no_delay)?;
            Ok(stream)
        }
        .boxed()
    }
}

/// Dials `host:port` targets using addresses from a [`CachingResolver`].
pub struct CachingDialer<C = TcpConnector> {
    resolver: Arc<CachingResolver>,
    connector: C,
}

impl CachingDialer<TcpConnector> {
    /// Create a dialer that opens plain TCP connections.
    pub fn new(resolver: Arc<CachingResolver>) -> Self {
        Self::with_connector(resolver, TcpConnector::default())
    }
}

impl<C: Connector> CachingDialer<C> {
    /// Create a dialer with a custom connector.
    pub fn with_connector(resolver: Arc<CachingResolver>, connector: C) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    /// The resolver addresses are taken from.
    pub fn resolver(&self) -> &Arc<CachingResolver> {
        &self.resolver
    }

    /// Connect to `addr`, given as `host:port` or `[v6-host]:port`.
    ///
    /// The host lookup is bounded by the resolver's lookup timeout. Every
    /// cached address is tried once in random order; if none connects, the
    /// first connection error is returned.
    pub async fn dial(&self, addr: &str) -> Result<C::Connection> {
        let (host, port) = split_host_port(addr)?;

        let mut ips = self
            .resolver
            .fetch_timeout(&host, self.resolver.lookup_timeout())
            .await?;
        if ips.is_empty() {
            return Err(DnsCacheError::NoAddresses(host));
        }
        ips.shuffle(&mut rand::thread_rng());

        let mut first_err = None;
        for ip in ips {
            let target = SocketAddr::new(ip, port);
            match self.connector.connect(target).await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    tracing::debug!(
                        target: targets::DIAL,
                        %target,
                        error = %e,
                        "connect attempt failed"
                    );
                    first_err.get_or_insert_with(|| DnsCacheError::connect(target, e));
                }
            }
        }

        Err(first_err.unwrap_or(DnsCacheError::NoAddresses(host)))
    }
}

impl<C> std::fmt::Debug for CachingDialer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingDialer")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Split `host:port` or `[v6-host]:port` into its parts.
fn split_host_port(addr: &str) -> Result<(String, u16)> {
    let authority: Authority = addr
        .parse()
        .map_err(|e: InvalidUri| DnsCacheError::invalid_address(addr, e.to_string()))?;
    if addr.contains('@') {
        return Err(DnsCacheError::invalid_address(addr, "unexpected userinfo in address"));
    }

    let host = authority.host();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(DnsCacheError::invalid_address(addr, "missing host in address"));
    }
    // Absent, non-numeric and out-of-range ports all read as `None`.
    let port = authority
        .port_u16()
        .ok_or_else(|| DnsCacheError::invalid_address(addr, "missing or invalid port"))?;

    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(addr: &str) -> (String, u16) {
        split_host_port(addr).unwrap()
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split("example.com:443"), ("example.com".to_string(), 443));
        assert_eq!(split("10.0.0.1:80"), ("10.0.0.1".to_string(), 80));
        assert_eq!(split("[::1]:8080"), ("::1".to_string(), 8080));
        assert_eq!(split("[2001:db8::7]:53"), ("2001:db8::7".to_string(), 53));
    }

    #[test]
    fn test_split_host_port_rejects_malformed() {
        for addr in [
            "example.com",
            "::1:80",
            "[::1]80",
            "[::1:80",
            ":80",
            "example.com:http",
            "example.com:70000",
            "user@example.com:80",
            "",
        ] {
            let err = split_host_port(addr).unwrap_err();
            assert!(
                matches!(err, DnsCacheError::InvalidAddress { .. }),
                "expected invalid address for {addr}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_connector_config_builder() {
        let config = TcpConnectorConfig::new()
            .connect_timeout(Duration::from_secs(5))
            .no_delay(true);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
        assert!(config.no_delay);

        let config = config.no_connect_timeout();
        assert_eq!(config.connect_timeout, None);
    }
}
