//! Configuration types for the caching resolver and its lookup backends.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

/// Default time between automatic refresh cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Default bound on a single resolution.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default initial capacity of the cache map.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Observer invoked after every completed refresh cycle.
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration for a [`CachingResolver`](super::CachingResolver).
///
/// Zero values are never an error: they fall back to the documented
/// defaults when the resolver is built.
#[derive(Clone)]
pub struct ResolverConfig {
    /// Time between automatic refresh cycles.
    pub refresh_interval: Duration,

    /// Bound on each resolution made by a refresh cycle. Also the
    /// default bound used by dial helpers for their cache lookups.
    pub lookup_timeout: Duration,

    /// Initial capacity hint for the cache. Not a limit.
    pub cache_size: usize,

    /// How many hostnames a refresh cycle re-resolves at once.
    pub refresh_concurrency: usize,

    /// Label attached to this resolver's log records.
    pub name: Option<String>,

    /// Called on the refresh task after each cycle completes.
    pub on_refreshed: Option<RefreshHook>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            cache_size: DEFAULT_CACHE_SIZE,
            refresh_concurrency: 1,
            name: None,
            on_refreshed: None,
        }
    }
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("refresh_interval", &self.refresh_interval)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("cache_size", &self.cache_size)
            .field("refresh_concurrency", &self.refresh_concurrency)
            .field("name", &self.name)
            .field("on_refreshed", &self.on_refreshed.is_some())
            .finish()
    }
}

impl ResolverConfig {
    /// Create a configuration with the given interval and timeout.
    pub fn new(refresh_interval: Duration, lookup_timeout: Duration) -> Self {
        Self {
            refresh_interval,
            lookup_timeout,
            ..Default::default()
        }
    }

    /// Set the refresh interval.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the per-lookup timeout.
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set the initial cache capacity.
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set how many hostnames a refresh cycle resolves concurrently.
    pub fn refresh_concurrency(mut self, limit: usize) -> Self {
        self.refresh_concurrency = limit;
        self
    }

    /// Set the label used in log records.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the observer called after every refresh cycle.
    ///
    /// The hook runs on the refresh task, so it must return quickly.
    pub fn on_refreshed<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_refreshed = Some(Arc::new(hook));
        self
    }

    /// Replace zero values with their defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.refresh_interval.is_zero() {
            self.refresh_interval = DEFAULT_REFRESH_INTERVAL;
        }
        if self.lookup_timeout.is_zero() {
            self.lookup_timeout = DEFAULT_LOOKUP_TIMEOUT;
        }
        if self.cache_size == 0 {
            self.cache_size = DEFAULT_CACHE_SIZE;
        }
        if self.refresh_concurrency == 0 {
            self.refresh_concurrency = 1;
        }
        self
    }
}

/// Where a [`HickoryLookup`](super::HickoryLookup) sends its queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NameserverSource {
    /// The platform's configured nameservers (`/etc/resolv.conf` on Unix).
    #[default]
    System,
    /// These nameservers, each queried over UDP with TCP fallback.
    Explicit(Vec<SocketAddr>),
}

/// Upstream settings for [`HickoryLookup`](super::HickoryLookup).
///
/// Only address resolution is configured here. Response caching belongs
/// to the [`CachingResolver`](super::CachingResolver) in front of it.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub source: NameserverSource,
    /// Answer from the hosts file before querying nameservers.
    pub hosts_file: bool,
    pub ip_strategy: IpStrategy,
    /// Query attempts per nameserver before giving up.
    pub attempts: usize,
    pub query_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            source: NameserverSource::System,
            hosts_file: true,
            ip_strategy: IpStrategy::default(),
            attempts: 2,
            query_timeout: Duration::from_secs(5),
        }
    }
}

impl UpstreamConfig {
    pub fn system() -> Self {
        Self::default()
    }

    /// Query `nameservers` instead of the platform's.
    pub fn nameservers(nameservers: Vec<SocketAddr>) -> Self {
        Self {
            source: NameserverSource::Explicit(nameservers),
            ..Default::default()
        }
    }

    /// Google Public DNS.
    pub fn google() -> Self {
        Self::nameservers(vec![port_53([8, 8, 8, 8]), port_53([8, 8, 4, 4])])
    }

    /// Cloudflare's 1.1.1.1.
    pub fn cloudflare() -> Self {
        Self::nameservers(vec![port_53([1, 1, 1, 1]), port_53([1, 0, 0, 1])])
    }

    pub fn hosts_file(mut self, enabled: bool) -> Self {
        self.hosts_file = enabled;
        self
    }

    pub fn ip_strategy(mut self, strategy: IpStrategy) -> Self {
        self.ip_strategy = strategy;
        self
    }

    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Bound each individual query sent to a nameserver.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}

fn port_53(octets: [u8; 4]) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::from(octets)), 53)
}

/// Which address families a lookup asks for, and in what order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IpStrategy {
    Ipv4Only,
    Ipv6Only,
    /// A records first, AAAA only if there are none.
    #[default]
    Ipv4ThenIpv6,
    /// AAAA records first, A only if there are none.
    Ipv6ThenIpv4,
    /// Both families, queried concurrently.
    Ipv4AndIpv6,
}
