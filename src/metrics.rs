//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Process-wide launchpad and swap metrics
pub struct Metrics {
    registry: Registry,

    // Token launch flow
    pub token_flows_started: IntCounter,
    pub token_flows_created: IntCounter,
    pub token_flows_failed: IntCounter,
    pub orphaned_mints: IntCounter,

    // Swap
    pub quotes_requested: IntCounter,
    pub quotes_failed: IntCounter,
    pub swaps_submitted: IntCounter,
    pub swaps_failed: IntCounter,

    // Histograms
    pub rpc_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let token_flows_started = IntCounter::with_opts(Opts::new(
            "token_flows_started",
            "Token launch flows that began execution",
        ))?;

        let token_flows_created = IntCounter::with_opts(Opts::new(
            "token_flows_created",
            "Token launch flows that completed all three steps",
        ))?;

        let token_flows_failed =
            IntCounter::with_opts(Opts::new("token_flows_failed", "Token launch flows that failed"))?;

        let orphaned_mints = IntCounter::with_opts(Opts::new(
            "orphaned_mints",
            "Mints created on-chain whose flow failed afterwards",
        ))?;

        let quotes_requested = IntCounter::with_opts(Opts::new(
            "quotes_requested",
            "Quote requests sent to the aggregator",
        ))?;

        let quotes_failed =
            IntCounter::with_opts(Opts::new("quotes_failed", "Quote requests that failed"))?;

        let swaps_submitted = IntCounter::with_opts(Opts::new(
            "swaps_submitted",
            "Swap transactions broadcast by the wallet",
        ))?;

        let swaps_failed = IntCounter::with_opts(Opts::new(
            "swaps_failed",
            "Swap confirmations that failed to build or submit",
        ))?;

        let rpc_latency = Histogram::with_opts(
            HistogramOpts::new("rpc_latency_seconds", "RPC call latency")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;

        registry.register(Box::new(token_flows_started.clone()))?;
        registry.register(Box::new(token_flows_created.clone()))?;
        registry.register(Box::new(token_flows_failed.clone()))?;
        registry.register(Box::new(orphaned_mints.clone()))?;
        registry.register(Box::new(quotes_requested.clone()))?;
        registry.register(Box::new(quotes_failed.clone()))?;
        registry.register(Box::new(swaps_submitted.clone()))?;
        registry.register(Box::new(swaps_failed.clone()))?;
        registry.register(Box::new(rpc_latency.clone()))?;

        Ok(Self {
            registry,
            token_flows_started,
            token_flows_created,
            token_flows_failed,
            orphaned_mints,
            quotes_requested,
            quotes_failed,
            swaps_submitted,
            swaps_failed,
            rpc_latency,
        })
    }

    /// Prometheus text exposition of everything registered
    pub fn gather_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.elapsed_secs());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
