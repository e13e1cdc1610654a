//! Fuzzy comparison of raw HTTP responses

use crate::core::probe::Fingerprint;
use crate::error::Result;
use similar::{capture_diff_slices_deadline, get_diff_ratio, Algorithm};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Dissimilarity cutoff used when comparing against the public response
pub const PUBLIC_MATCH_THRESHOLD: f64 = 0.50;

/// Upper bound on time spent diffing one pair of responses
const DIFF_DEADLINE: Duration = Duration::from_millis(250);

/// Decides which candidate texts are different enough from a reference.
pub trait Comparator: Send + Sync {
    /// Candidates whose dissimilarity to `reference` exceeds `threshold`.
    ///
    /// `threshold` is a fraction in [0, 1]; lower values are stricter about
    /// what counts as the same response.
    fn differing<'a>(&self, reference: &str, candidates: &[&'a str], threshold: f64) -> Vec<&'a str>;

    fn is_different(&self, reference: &str, candidate: &str, threshold: f64) -> bool {
        !self.differing(reference, &[candidate], threshold).is_empty()
    }
}

/// `comparator.is_different` on tokio's blocking pool; the diff is CPU bound.
pub async fn compare_blocking<C: Comparator + 'static>(
    comparator: Arc<C>,
    reference: Arc<Fingerprint>,
    candidate: Arc<Fingerprint>,
    threshold: f64,
) -> Result<bool> {
    let different = tokio::task::spawn_blocking(move || {
        comparator.is_different(&reference.raw_text, &candidate.raw_text, threshold)
    })
    .await?;
    Ok(different)
}

/// Diff ratio over whitespace-separated tokens, computed with `similar`.
///
/// Whitespace is not a token: otherwise any two prose bodies share every
/// space between their words and look half alike.
///
/// The head (status line and headers) and the body are scored apart and the
/// body carries most of the weight, so a short page cannot be outvoted by
/// the headers around it.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDiffComparator;

/// Share of the score taken by the status line and headers
const HEAD_WEIGHT: f64 = 0.2;

impl TextDiffComparator {
    /// 0.0 for identical texts, 1.0 for texts sharing nothing.
    pub fn dissimilarity(reference: &str, candidate: &str) -> f64 {
        if reference == candidate {
            return 0.0;
        }
        let (ref_head, ref_body) = split_head(reference);
        let (cand_head, cand_body) = split_head(candidate);

        let parts = [
            (ref_head, cand_head, HEAD_WEIGHT),
            (ref_body, cand_body, 1.0 - HEAD_WEIGHT),
        ];
        let mut score = 0.0;
        let mut weight = 0.0;
        for (old, new, w) in parts {
            // a part absent from both sides says nothing either way
            if old.trim().is_empty() && new.trim().is_empty() {
                continue;
            }
            score += w * token_dissimilarity(old, new);
            weight += w;
        }
        if weight == 0.0 {
            0.0
        } else {
            score / weight
        }
    }
}

/// Head and body of a captured response. Text without a blank line is all body.
fn split_head(text: &str) -> (&str, &str) {
    text.split_once("\r\n\r\n").unwrap_or(("", text))
}

fn token_dissimilarity(reference: &str, candidate: &str) -> f64 {
    let old: Vec<&str> = reference.split_whitespace().collect();
    let new: Vec<&str> = candidate.split_whitespace().collect();
    let deadline = Instant::now() + DIFF_DEADLINE;
    let ops = capture_diff_slices_deadline(Algorithm::Myers, &old, &new, Some(deadline));
    1.0 - f64::from(get_diff_ratio(&ops, old.len(), new.len()))
}

impl Comparator for TextDiffComparator {
    fn differing<'a>(
        &self,
        reference: &str,
        candidates: &[&'a str],
        threshold: f64,
    ) -> Vec<&'a str> {
        candidates
            .iter()
            .copied()
            .filter(|candidate| Self::dissimilarity(reference, candidate) > threshold)
            .collect()
    }
}
