//! Tracing setup for applications embedding `bandchart-rs`.
//!
//! The engine only emits `tracing` events. Installing a subscriber is left to
//! the host, or to the helpers below when the `telemetry` feature is on.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "bandchart_rs=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the feature is disabled or the host already set a
/// global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Like [`init_default_tracing`] with an explicit fallback directive, e.g.
/// `"bandchart_rs=trace"` to see per-point coercion and orientation decisions.
#[must_use]
pub fn init_tracing_with_filter(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
