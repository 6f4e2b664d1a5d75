//! In-memory DNS cache with periodic background refresh.
//!
//! This crate sits in front of network clients that resolve the same
//! hostnames over and over:
//!
//! - **Caching resolver**: serves repeated lookups from memory and keeps
//!   every entry fresh with a background refresh task
//! - **Dial helper**: connects to `host:port` targets using cached
//!   addresses, trying them in random order
//!
//! # Caching Resolver
//!
//! ```ignore
//! use std::time::Duration;
//! use dnscache::CachingResolver;
//!
//! // Refresh every 3 seconds, bound each lookup to 5 seconds.
//! let resolver = CachingResolver::new(Duration::from_secs(3), Duration::from_secs(5))?;
//!
//! // Resolves on the first call, served from memory afterwards.
//! let addrs = resolver.fetch("api.example.com").await?;
//!
//! // Force a re-resolution of one name, or of every cached name.
//! resolver.lookup_and_store("api.example.com").await?;
//! resolver.refresh_all().await;
//!
//! // End background refresh. Safe to call more than once.
//! resolver.stop();
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! use dnscache::dns::{CachingResolver, HickoryLookup, ResolverConfig, UpstreamConfig};
//!
//! let config = ResolverConfig::default()
//!     .refresh_interval(Duration::from_secs(10))
//!     .lookup_timeout(Duration::from_secs(2))
//!     .cache_size(16)
//!     .refresh_concurrency(4)
//!     .name("backends");
//!
//! let lookup = HickoryLookup::new(UpstreamConfig::cloudflare())?;
//! let resolver = CachingResolver::with_config(config, lookup)?;
//! ```
//!
//! # Dialing
//!
//! ```ignore
//! use std::sync::Arc;
//! use dnscache::CachingDialer;
//!
//! let dialer = CachingDialer::new(Arc::new(resolver));
//! let stream = dialer.dial("api.example.com:443").await?;
//! ```
//!
//! # Logging
//!
//! Refresh failures and lifecycle events are reported through `tracing`
//! under the targets in [`logging::targets`].

pub mod dial;
pub mod dns;
mod error;
pub mod logging;

pub use error::{DnsCacheError, Result};

// Re-export commonly used types at the crate root
pub use dial::{CachingDialer, Connector, TcpConnector, TcpConnectorConfig};
pub use dns::{
    CachingResolver, HickoryLookup, Lookup, RefreshState, ResolverConfig, SystemLookup,
    UpstreamConfig,
};
