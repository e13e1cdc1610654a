//! Cross-check of findings against the publicly routed response

use crate::core::probe::{Fingerprint, Prober};
use crate::core::similarity::{compare_blocking, Comparator, PUBLIC_MATCH_THRESHOLD};
use std::sync::Arc;
use tracing::warn;

pub struct Verifier<P, C> {
    prober: Arc<P>,
    comparator: Arc<C>,
    tls: bool,
}

impl<P: Prober, C: Comparator + 'static> Verifier<P, C> {
    pub fn new(prober: Arc<P>, comparator: Arc<C>, tls: bool) -> Self {
        Self {
            prober,
            comparator,
            tls,
        }
    }

    /// True when `candidate` is a genuine vhost difference, i.e. it does
    /// not match what `domain` serves publicly.
    ///
    /// An unreachable public endpoint cannot disprove a finding, so fetch
    /// failures count as genuine.
    pub async fn verify(&self, domain: &str, path: &str, candidate: Arc<Fingerprint>) -> bool {
        let public = match self.prober.fetch_public(domain, path, self.tls).await {
            Ok(fingerprint) => Arc::new(fingerprint),
            Err(e) => {
                warn!(domain, path, error = %e.reason(), "public fetch failed, keeping finding");
                return true;
            }
        };

        let comparator = Arc::clone(&self.comparator);
        match compare_blocking(comparator, public, candidate, PUBLIC_MATCH_THRESHOLD).await {
            Ok(different) => different,
            Err(e) => {
                let error = e.reason();
                warn!(domain, path, %error, "public comparison failed, keeping finding");
                true
            }
        }
    }
}
