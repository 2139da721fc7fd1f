//! # FEY Probe
//!
//! Ordered fallback probing: a list of strategies is tried strictly in
//! order and the first plausible value wins.
//!
//! ## Features
//!
//! - **Plausibility Bounds**: every strategy classifies its raw value
//! - **Per-Attempt Timeout**: a stalled strategy counts as a failure
//! - **Sentinel Result**: exhausting the list yields [`ProbeResult::none`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use fey_probe::{launchpad_probes, FallbackProber};
//!
//! let prober = FallbackProber::new(launchpad_probes(rpc, explorer));
//! let result = prober.run(LAUNCHPAD_ADDRESS).await;
//! println!("{} tokens (via {})", result.value, result.source);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use fey_core::constants::DEFAULT_REQUEST_TIMEOUT_SECONDS;
use fey_core::types::ProbeResult;

mod strategies;

pub use strategies::{
    launchpad_probes, ContractCreationProbe, LogTxProbe, SelectorProbe, StorageSlotProbe,
    SuccessfulTxProbe,
};

/// What a single strategy attempt produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A value inside the strategy's bounds
    Plausible(u64),
    /// A value the strategy does not trust
    Implausible(u64),
    /// The attempt errored, returned nothing or timed out
    Failed(String),
}

/// Exclusive plausibility bounds: `min_exclusive < value < max_exclusive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    /// Values at or below this are rejected
    pub min_exclusive: u64,
    /// Values at or above this are rejected
    pub max_exclusive: u64,
}

impl Bounds {
    /// Creates bounds.
    pub const fn new(min_exclusive: u64, max_exclusive: u64) -> Self {
        Self {
            min_exclusive,
            max_exclusive,
        }
    }

    /// Returns true if `value` lies strictly between the bounds.
    pub fn contains(&self, value: u64) -> bool {
        value > self.min_exclusive && value < self.max_exclusive
    }

    /// Classifies a raw value.
    pub fn classify(&self, value: u64) -> ProbeOutcome {
        if self.contains(value) {
            ProbeOutcome::Plausible(value)
        } else {
            ProbeOutcome::Implausible(value)
        }
    }
}

/// One way of estimating a count for an address.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Label recorded as the result's source when this probe wins.
    fn source(&self) -> &str;

    /// Runs the strategy once. Never panics; every problem is a `Failed` outcome.
    async fn attempt(&self, address: &str) -> ProbeOutcome;
}

/// Runs probes in order until one yields a plausible value.
pub struct FallbackProber {
    probes: Vec<Box<dyn Probe>>,
    attempt_timeout: Duration,
}

impl FallbackProber {
    /// Creates a prober with the default per-attempt timeout.
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self {
            probes,
            attempt_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    /// Sets the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Returns true if there are no strategies.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Source labels in priority order.
    pub fn sources(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.source()).collect()
    }

    /// Tries each strategy in turn and returns the first plausible value,
    /// or [`ProbeResult::none`] if none produced one.
    #[instrument(skip(self), fields(strategies = self.probes.len()))]
    pub async fn run(&self, address: &str) -> ProbeResult {
        let start = Instant::now();

        for (attempted, probe) in self.probes.iter().enumerate() {
            let outcome = match tokio::time::timeout(self.attempt_timeout, probe.attempt(address)).await {
                Ok(outcome) => outcome,
                Err(_) => ProbeOutcome::Failed(format!("timed out after {:?}", self.attempt_timeout)),
            };

            match outcome {
                ProbeOutcome::Plausible(value) => {
                    info!(
                        source = probe.source(),
                        value,
                        attempts = attempted + 1,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Probe succeeded"
                    );
                    return ProbeResult::new(value, probe.source());
                }
                ProbeOutcome::Implausible(value) => {
                    debug!(source = probe.source(), value, "Probe value out of bounds");
                }
                ProbeOutcome::Failed(reason) => {
                    debug!(source = probe.source(), %reason, "Probe failed");
                }
            }
        }

        warn!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "All probes failed"
        );
        ProbeResult::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CannedProbe {
        source: &'static str,
        outcome: ProbeOutcome,
        delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl CannedProbe {
        fn boxed(source: &'static str, outcome: ProbeOutcome) -> (Box<dyn Probe>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let probe = Self {
                source,
                outcome,
                delay: None,
                calls: calls.clone(),
            };
            (Box::new(probe), calls)
        }

        fn slow(source: &'static str, outcome: ProbeOutcome, delay: Duration) -> Box<dyn Probe> {
            Box::new(Self {
                source,
                outcome,
                delay: Some(delay),
                calls: Arc::new(AtomicUsize::new(0)),
            })
        }
    }

    #[async_trait]
    impl Probe for CannedProbe {
        fn source(&self) -> &str {
            self.source
        }

        async fn attempt(&self, _address: &str) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let bounds = Bounds::new(1, 50_000);
        assert_eq!(bounds.classify(1), ProbeOutcome::Implausible(1));
        assert_eq!(bounds.classify(2), ProbeOutcome::Plausible(2));
        assert_eq!(bounds.classify(49_999), ProbeOutcome::Plausible(49_999));
        assert_eq!(bounds.classify(50_000), ProbeOutcome::Implausible(50_000));
    }

    #[tokio::test]
    async fn test_first_plausible_wins() {
        let (a, a_calls) = CannedProbe::boxed("a", ProbeOutcome::Failed("boom".into()));
        let (b, b_calls) = CannedProbe::boxed("b", ProbeOutcome::Implausible(0));
        let (c, c_calls) = CannedProbe::boxed("c", ProbeOutcome::Plausible(42));
        let (d, d_calls) = CannedProbe::boxed("d", ProbeOutcome::Plausible(7));

        let prober = FallbackProber::new(vec![a, b, c, d]);
        let result = prober.run("0xlaunchpad").await;

        assert_eq!(result, ProbeResult::new(42, "c"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 1);
        assert_eq!(d_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failing_yields_sentinel() {
        let (a, _) = CannedProbe::boxed("a", ProbeOutcome::Failed("down".into()));
        let (b, _) = CannedProbe::boxed("b", ProbeOutcome::Implausible(u64::MAX));

        let result = FallbackProber::new(vec![a, b]).run("0xlaunchpad").await;

        assert_eq!(result, ProbeResult::none());
        assert!(result.is_none());
        assert_eq!(result.value, 0);
        assert_eq!(result.source, "none");
    }

    #[tokio::test]
    async fn test_empty_prober_yields_sentinel() {
        let prober = FallbackProber::new(Vec::new());
        assert!(prober.is_empty());
        assert!(prober.run("0xlaunchpad").await.is_none());
    }

    #[tokio::test]
    async fn test_stalled_probe_times_out_and_falls_through() {
        let slow = CannedProbe::slow("slow", ProbeOutcome::Plausible(99), Duration::from_secs(5));
        let (fast, _) = CannedProbe::boxed("fast", ProbeOutcome::Plausible(12));

        let prober =
            FallbackProber::new(vec![slow, fast]).with_attempt_timeout(Duration::from_millis(50));

        let start = Instant::now();
        let result = prober.run("0xlaunchpad").await;

        assert_eq!(result, ProbeResult::new(12, "fast"));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_sources_in_order() {
        let (a, _) = CannedProbe::boxed("a", ProbeOutcome::Plausible(1));
        let (b, _) = CannedProbe::boxed("b", ProbeOutcome::Plausible(2));
        let prober = FallbackProber::new(vec![a, b]);
        assert_eq!(prober.sources(), vec!["a", "b"]);
        assert_eq!(prober.len(), 2);
    }
}
