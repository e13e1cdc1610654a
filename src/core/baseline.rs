//! "Unknown host" baseline acquisition and refresh scheduling

use crate::core::probe::{Fingerprint, Prober, Target};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Takes baselines with hostnames that cannot be real candidates.
pub struct BaselineManager<P> {
    prober: Arc<P>,
}

impl<P: Prober> BaselineManager<P> {
    pub fn new(prober: Arc<P>) -> Self {
        Self { prober }
    }

    /// Probe `target` with a random hostname, optionally nested under
    /// `context` so suffix-routed servers see a plausible name.
    pub async fn take(
        &self,
        target: &Target,
        path: &str,
        context: Option<&str>,
    ) -> Result<Fingerprint> {
        let host = synthetic_host(context);
        debug!(%target, path, host = %host, "taking baseline");
        self.prober.probe(target, path, &host).await
    }
}

/// Random 122-bit label, dotted onto `context` when one is given.
pub fn synthetic_host(context: Option<&str>) -> String {
    let label = Uuid::new_v4().simple().to_string();
    match context {
        Some(domain) if !domain.is_empty() => format!("{}.{}", label, domain),
        _ => label,
    }
}

/// When to retake the baseline while walking a candidate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval: Option<usize>,
}

impl RefreshPolicy {
    /// `percent` of `total` candidates between baselines, rounded up and never
    /// below one candidate. `None` or zero disables refreshing.
    pub fn new(percent: Option<u8>, total: usize) -> Self {
        let interval = percent
            .filter(|p| *p > 0)
            .map(|p| (usize::from(p) * total).div_ceil(100).max(1));
        Self { interval }
    }

    pub fn interval(&self) -> Option<usize> {
        self.interval
    }

    /// True when a baseline is due before dispatching candidate `index`.
    /// Index 0 is always a checkpoint when refreshing is on.
    pub fn is_checkpoint(&self, index: usize) -> bool {
        match self.interval {
            Some(n) => index % n == 0,
            None => false,
        }
    }
}
