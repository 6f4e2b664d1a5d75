//! DNS caching with periodic background refresh.
//!
//! The [`CachingResolver`] keeps an in-memory map from hostname to the last
//! successfully resolved addresses. Hot paths call [`CachingResolver::fetch`],
//! which only goes to the network on a miss; a background task re-resolves
//! every cached hostname on a fixed interval so entries follow DNS changes.
//!
//! # Features
//!
//! - **Last-known-good serving**: a failed refresh never clears an entry
//! - **Failure isolation**: one broken hostname never stalls the others
//! - **Pluggable resolution**: anything implementing [`Lookup`], with
//!   [`SystemLookup`] and [`HickoryLookup`] provided
//! - **Deterministic lifecycle**: refresh runs from construction until
//!   [`CachingResolver::stop`], which is idempotent
//!
//! No TTL handling, negative caching, or eviction is done: every hostname
//! ever looked up stays cached. This suits a small, mostly static set of
//! upstream hosts.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use dnscache::dns::{CachingResolver, HickoryLookup, ResolverConfig, UpstreamConfig};
//!
//! let config = ResolverConfig::new(Duration::from_secs(5), Duration::from_secs(2))
//!     .name("upstreams")
//!     .on_refreshed(|| println!("refreshed"));
//!
//! let lookup = HickoryLookup::new(UpstreamConfig::google())?;
//! let resolver = CachingResolver::with_config(config, lookup)?;
//! let addrs = resolver.fetch("api.example.com").await?;
//! ```

mod cache;
mod config;
mod lookup;
mod resolver;
mod scheduler;

pub use config::{
    DEFAULT_CACHE_SIZE, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_REFRESH_INTERVAL, IpStrategy,
    NameserverSource, RefreshHook, ResolverConfig, UpstreamConfig,
};
pub use lookup::{HickoryLookup, Lookup, SystemLookup};
pub use resolver::CachingResolver;
pub use scheduler::RefreshState;
