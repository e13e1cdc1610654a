//! Single writer draining the result channel

use crate::output::console::{print_error, render_event};
use crate::output::event::{Outcome, ScanEvent};
use crate::output::file::{OutputHandler, VhostResult};
use crate::output::progress::ProgressTracker;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Totals collected while draining the result channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub completed: u64,
    pub found: u64,
    pub suppressed: u64,
    pub indistinct: u64,
    pub errors: u64,
    pub baseline_failures: u64,
}

/// Print (and optionally persist) every event until all senders are gone.
pub async fn report(
    mut events: UnboundedReceiver<ScanEvent>,
    progress: ProgressTracker,
    output: Arc<OutputHandler>,
    verbose: bool,
) -> Summary {
    let mut summary = Summary::default();

    while let Some(event) = events.recv().await {
        if event.is_job() {
            summary.completed += 1;
            progress.inc();
        }

        match &event.outcome {
            Outcome::Found { status, size } => {
                summary.found += 1;
                progress.inc_found();
                if let Some(writer) = output.file_writer() {
                    let result = VhostResult {
                        host: event.host.clone(),
                        ip: event.target.ip.clone(),
                        port: event.target.port,
                        path: event.path.clone(),
                        status: *status,
                        size: *size,
                    };
                    if let Err(e) = writer.write_result(&result).await {
                        print_error(&format!("failed to write result: {}", e));
                    }
                }
            }
            Outcome::Suppressed { .. } => summary.suppressed += 1,
            Outcome::Indistinct { .. } => summary.indistinct += 1,
            Outcome::ProbeFailed { .. } => {
                summary.errors += 1;
                progress.inc_error();
            }
            Outcome::BaselineFailed { .. } => summary.baseline_failures += 1,
        }

        if event.is_visible(verbose) {
            progress.println(&render_event(&event));
        }
    }

    summary
}
