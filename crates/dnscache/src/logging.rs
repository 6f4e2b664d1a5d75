//! Logging facilities for the DNS cache.
//!
//! The crate is instrumented with `tracing`. Nothing is printed unless the
//! application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("dnscache::refresh=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Cache reads and writes.
    pub const CACHE: &str = "dnscache::cache";
    /// Background refresh scheduler.
    pub const REFRESH: &str = "dnscache::refresh";
    /// Dial helper.
    pub const DIAL: &str = "dnscache::dial";
}

