//! Classified results flowing from the workers to the writer

use crate::core::Target;
use std::fmt;

/// How a candidate (or a baseline attempt) turned out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Response differs from the baseline (and from the public response when verifying)
    Found { status: u16, size: Option<u64> },
    /// Differs from the baseline but matches what the hostname serves publicly
    Suppressed { status: u16, size: Option<u64> },
    /// Indistinguishable from the baseline
    Indistinct { status: u16, size: Option<u64> },
    ProbeFailed { reason: String },
    /// `forced` when enumeration continues against an empty baseline
    BaselineFailed { reason: String, forced: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanEvent {
    pub target: Target,
    pub path: String,
    /// Candidate hostname; empty for baseline events
    pub host: String,
    pub outcome: Outcome,
}

impl ScanEvent {
    pub fn baseline_failed(target: &Target, path: &str, reason: String, forced: bool) -> Self {
        Self {
            target: target.clone(),
            path: path.to_string(),
            host: String::new(),
            outcome: Outcome::BaselineFailed { reason, forced },
        }
    }

    pub fn marker(&self) -> &'static str {
        match self.outcome {
            Outcome::Found { .. } => "[+]",
            Outcome::Suppressed { .. } | Outcome::Indistinct { .. } => "[-]",
            Outcome::ProbeFailed { .. } | Outcome::BaselineFailed { .. } => "[!]",
        }
    }

    /// Whether this event corresponds to one dispatched candidate.
    pub fn is_job(&self) -> bool {
        !matches!(self.outcome, Outcome::BaselineFailed { .. })
    }

    /// Negatives are only shown in verbose mode.
    pub fn is_visible(&self, verbose: bool) -> bool {
        verbose || !matches!(self.outcome, Outcome::Indistinct { .. })
    }

    /// Line body without the marker.
    pub fn detail(&self) -> String {
        let location = format!("[{}{}]", self.target, self.path);
        match &self.outcome {
            Outcome::Found { status, size } => {
                format!("{} {} {}", self.host, location, stats(*status, *size))
            }
            Outcome::Suppressed { status, size } => format!(
                "{} {} {} - different from baseline but matches public response",
                self.host,
                location,
                stats(*status, *size)
            ),
            Outcome::Indistinct { status, size } => format!(
                "{} {} {} - not different from baseline",
                self.host,
                location,
                stats(*status, *size)
            ),
            Outcome::ProbeFailed { reason } => format!("{} {} - {}", self.host, location, reason),
            Outcome::BaselineFailed { reason, forced } => format!(
                "baseline {} - {} ({})",
                location,
                reason,
                if *forced {
                    "continuing with empty baseline"
                } else {
                    "skipping"
                }
            ),
        }
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker(), self.detail())
    }
}

fn stats(status: u16, size: Option<u64>) -> String {
    match size {
        Some(size) => format!("(Status: {}) [Size: {}]", status, size),
        None => format!("(Status: {}) [Size: -1]", status),
    }
}
