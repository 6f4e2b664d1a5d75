//! Hostname resolution backends.

use std::net::IpAddr;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfig, ResolveHosts, ResolverConfig as HickoryConfig,
    ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};

use crate::dns::config::{IpStrategy, NameserverSource, UpstreamConfig};
use crate::error::{DnsCacheError, Result};

/// The capability of resolving a hostname to its addresses.
///
/// Implementations may be slow or fail; an empty list is a valid result.
/// Callers bound the call by dropping the returned future, so
/// implementations must be cancel-safe.
pub trait Lookup: Send + Sync + 'static {
    /// Resolve `host` to an ordered list of addresses.
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>>;
}

impl<T: Lookup + ?Sized> Lookup for Arc<T> {
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        (**self).lookup_ip(host)
    }
}

/// Resolves through the platform resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl SystemLookup {
    /// Create a system lookup.
    pub fn new() -> Self {
        Self
    }
}

impl Lookup for SystemLookup {
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move {
            let addrs = tokio::net::lookup_host((host, 0))
                .await
                .map_err(|e| DnsCacheError::resolve(host, e))?;

            let mut ips: Vec<IpAddr> = Vec::new();
            for addr in addrs {
                if !ips.contains(&addr.ip()) {
                    ips.push(addr.ip());
                }
            }
            Ok(ips)
        }
        .boxed()
    }
}

/// Resolves by querying DNS servers directly with hickory-resolver.
///
/// Hickory's own response cache is disabled; the caching resolver
/// above this backend owns caching.
///
/// # Example
///
/// ```ignore
/// use dnscache::dns::{CachingResolver, HickoryLookup, ResolverConfig, UpstreamConfig};
///
/// let lookup = HickoryLookup::new(UpstreamConfig::cloudflare())?;
/// let resolver = CachingResolver::with_config(ResolverConfig::default(), lookup)?;
/// ```
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    /// Create a lookup with the given upstream configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let (resolver_config, resolver_opts) = build_resolver_config(&config)?;

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(resolver_opts)
                .build();

        Ok(Self { resolver })
    }

    /// Create a lookup using system DNS settings.
    ///
    /// On Unix, this reads `/etc/resolv.conf`. On Windows, this uses the
    /// system's configured DNS servers.
    pub fn system() -> Result<Self> {
        Self::new(UpstreamConfig::system())
    }
}

impl std::fmt::Debug for HickoryLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryLookup").finish_non_exhaustive()
    }
}

impl Lookup for HickoryLookup {
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        async move {
            let response = self
                .resolver
                .lookup_ip(host)
                .await
                .map_err(|e| DnsCacheError::resolve(host, e))?;

            Ok(response.iter().collect())
        }
        .boxed()
    }
}

/// Translate an [`UpstreamConfig`] into hickory's configuration.
fn build_resolver_config(config: &UpstreamConfig) -> Result<(HickoryConfig, ResolverOpts)> {
    let (resolver_config, mut opts) = match &config.source {
        NameserverSource::System => hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| DnsCacheError::Config(e.to_string()))?,
        NameserverSource::Explicit(addrs) if addrs.is_empty() => {
            return Err(DnsCacheError::Config("no nameservers configured".to_string()));
        }
        NameserverSource::Explicit(addrs) => {
            let mut resolver_config = HickoryConfig::new();
            for addr in addrs {
                resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
                resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
            }
            (resolver_config, ResolverOpts::default())
        }
    };

    // Entries are cached one layer up.
    opts.cache_size = 0;
    opts.use_hosts_file = if config.hosts_file {
        ResolveHosts::Auto
    } else {
        ResolveHosts::Never
    };
    opts.attempts = config.attempts;
    opts.timeout = config.query_timeout;
    opts.ip_strategy = lookup_strategy(config.ip_strategy);

    Ok((resolver_config, opts))
}

fn lookup_strategy(strategy: IpStrategy) -> LookupIpStrategy {
    match strategy {
        IpStrategy::Ipv4Only => LookupIpStrategy::Ipv4Only,
        IpStrategy::Ipv6Only => LookupIpStrategy::Ipv6Only,
        IpStrategy::Ipv4ThenIpv6 => LookupIpStrategy::Ipv4thenIpv6,
        IpStrategy::Ipv6ThenIpv4 => LookupIpStrategy::Ipv6thenIpv4,
        IpStrategy::Ipv4AndIpv6 => LookupIpStrategy::Ipv4AndIpv6,
    }
}
