//! Caching resolver with periodic background refresh.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::Instrument;

use super::cache::CacheStore;
use super::config::ResolverConfig;
use super::lookup::{Lookup, SystemLookup};
use super::scheduler::{RefreshState, Scheduler};
use crate::error::{DnsCacheError, Result};
use crate::logging::targets;

/// State shared between a resolver handle and its refresh task.
pub(crate) struct Shared {
    cache: CacheStore,
    lookup: Box<dyn Lookup>,
    lookup_timeout: Duration,
    refresh_concurrency: usize,
    name: Option<String>,
}

impl Shared {
    async fn lookup_and_store(&self, host: &str) -> Result<Vec<IpAddr>> {
        // Resolve without holding the cache lock; only the store takes it.
        let addrs = self.lookup.lookup_ip(host).await?;
        self.cache.insert(host, addrs.clone());
        Ok(addrs)
    }

    async fn lookup_and_store_timeout(
        &self,
        host: &str,
        timeout: Duration,
    ) -> Result<Vec<IpAddr>> {
        match tokio::time::timeout(timeout, self.lookup_and_store(host)).await {
            Ok(result) => result,
            Err(_) => Err(DnsCacheError::Timeout {
                host: host.to_string(),
                timeout,
            }),
        }
    }

    /// Re-resolve every cached hostname, logging failures.
    pub(crate) async fn refresh_all(&self) {
        let hosts = self.cache.keys();
        if hosts.is_empty() {
            return;
        }

        let span = tracing::debug_span!(
            target: targets::REFRESH,
            "refresh_cycle",
            resolver = self.name.as_deref().unwrap_or("default"),
            hosts = hosts.len()
        );

        async {
            // Owned names keep the cycle future `Send` for the spawned task.
            let outcomes: Vec<bool> = stream::iter(hosts)
                .map(|host| async move { self.refresh_one(&host).await })
                .buffer_unordered(self.refresh_concurrency)
                .collect()
                .await;

            let failed = outcomes.iter().filter(|ok| !**ok).count();
            tracing::debug!(
                target: targets::REFRESH,
                refreshed = outcomes.len() - failed,
                failed,
                "refresh cycle complete"
            );
        }
        .instrument(span)
        .await
    }

    async fn refresh_one(&self, host: &str) -> bool {
        match self.lookup_and_store_timeout(host, self.lookup_timeout).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    target: targets::REFRESH,
                    host,
                    error = %e,
                    "failed to refresh DNS cache entry"
                );
                false
            }
        }
    }
}

/// An in-memory DNS cache that keeps its entries fresh in the background.
///
/// Every hostname looked up through the resolver stays cached until the
/// resolver is stopped. A background task re-resolves all cached names on
/// a fixed interval; a failed re-resolution keeps serving the previous
/// addresses. The refresh task is started on construction and ends on
/// [`stop`](Self::stop), [`shutdown`](Self::shutdown), or drop.
///
/// Concurrent resolutions of the same hostname are not serialized: the
/// cache holds whichever result was stored last.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use dnscache::dns::CachingResolver;
///
/// let resolver = CachingResolver::new(Duration::from_secs(3), Duration::from_secs(5))?;
///
/// // First call resolves, later calls are served from the cache.
/// let addrs = resolver.fetch("example.com").await?;
///
/// resolver.stop();
/// ```
pub struct CachingResolver {
    shared: Arc<Shared>,
    scheduler: Scheduler,
    refresh_interval: Duration,
}

impl CachingResolver {
    /// Create a resolver backed by the system resolver.
    ///
    /// Zero durations fall back to the defaults (3s interval, 10s timeout).
    /// Must be called within a tokio runtime.
    pub fn new(refresh_interval: Duration, lookup_timeout: Duration) -> Result<Self> {
        Self::with_config(
            ResolverConfig::new(refresh_interval, lookup_timeout),
            SystemLookup::new(),
        )
    }

    /// Create a resolver with the given configuration and lookup capability.
    ///
    /// Must be called within a tokio runtime.
    pub fn with_config(config: ResolverConfig, lookup: impl Lookup) -> Result<Self> {
        let config = config.normalized();

        let shared = Arc::new(Shared {
            cache: CacheStore::with_capacity(config.cache_size),
            lookup: Box::new(lookup),
            lookup_timeout: config.lookup_timeout,
            refresh_concurrency: config.refresh_concurrency,
            name: config.name,
        });

        let scheduler = Scheduler::start(
            Arc::clone(&shared),
            config.refresh_interval,
            config.on_refreshed,
        )?;

        Ok(Self {
            shared,
            scheduler,
            refresh_interval: config.refresh_interval,
        })
    }

    /// Get the addresses of `host`, resolving only on a cache miss.
    pub async fn fetch(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Some(addrs) = self.shared.cache.get(host) {
            return Ok(addrs);
        }
        tracing::trace!(target: targets::CACHE, host, "cache miss");
        self.shared.lookup_and_store(host).await
    }

    /// Like [`fetch`](Self::fetch), but a miss must resolve within `timeout`.
    pub async fn fetch_timeout(&self, host: &str, timeout: Duration) -> Result<Vec<IpAddr>> {
        if let Some(addrs) = self.shared.cache.get(host) {
            return Ok(addrs);
        }
        tracing::trace!(target: targets::CACHE, host, "cache miss");
        self.shared.lookup_and_store_timeout(host, timeout).await
    }

    /// Resolve `host` and store the result, replacing any cached value.
    ///
    /// On failure the cached value, if any, is left as it was.
    pub async fn lookup_and_store(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.shared.lookup_and_store(host).await
    }

    /// Like [`lookup_and_store`](Self::lookup_and_store), bounded by `timeout`.
    pub async fn lookup_and_store_timeout(
        &self,
        host: &str,
        timeout: Duration,
    ) -> Result<Vec<IpAddr>> {
        self.shared.lookup_and_store_timeout(host, timeout).await
    }

    /// Re-resolve every cached hostname now.
    ///
    /// Each hostname is bounded by the lookup timeout. Failures are logged
    /// and leave that hostname's previous value in place.
    pub async fn refresh_all(&self) {
        self.shared.refresh_all().await
    }

    /// Stop background refresh. Calling this again has no effect.
    ///
    /// Cached entries stay readable after stopping.
    pub fn stop(&self) {
        let _ = self.scheduler.stop();
    }

    /// Stop background refresh and wait for the refresh task to exit.
    pub async fn shutdown(&self) {
        if let Some(task) = self.scheduler.stop() {
            if let Err(e) = task.await {
                tracing::warn!(target: targets::REFRESH, error = %e, "refresh task failed");
            }
        }
    }

    /// Current lifecycle state of the refresh task.
    pub fn state(&self) -> RefreshState {
        self.scheduler.state()
    }

    /// Whether background refresh is still running.
    pub fn is_running(&self) -> bool {
        self.state() == RefreshState::Running
    }

    /// Bound applied to each refresh resolution.
    pub fn lookup_timeout(&self) -> Duration {
        self.shared.lookup_timeout
    }

    /// Time between refresh cycles.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Get the cached addresses for `host` without resolving.
    pub fn cached(&self, host: &str) -> Option<Vec<IpAddr>> {
        self.shared.cache.get(host)
    }

    /// Hostnames currently cached.
    pub fn hosts(&self) -> Vec<String> {
        self.shared.cache.keys()
    }

    /// Number of cached hostnames.
    pub fn len(&self) -> usize {
        self.shared.cache.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.shared.cache.is_empty()
    }
}

impl std::fmt::Debug for CachingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingResolver")
            .field("name", &self.shared.name)
            .field("refresh_interval", &self.refresh_interval)
            .field("lookup_timeout", &self.shared.lookup_timeout)
            .field("entries", &self.shared.cache.len())
            .field("state", &self.state())
            .finish()
    }
}
