//! Optional tracing bootstrap.
//!
//! Everything the engine reports (scheme trials, fallback recoveries) is
//! emitted as `tracing` events; installing a subscriber stays with the
//! host. `init_default_tracing` is a shortcut for binaries that just want
//! those events on stderr while debugging an axis.

/// Installs a compact stderr subscriber honouring `RUST_LOG`, defaulting
/// to `tickplan=debug` so scheme selection is visible.
///
/// Returns `false` when the `telemetry` feature is off or the host has
/// already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tickplan=debug"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
