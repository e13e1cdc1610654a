//! Virtual host enumeration mode

use crate::cli::Cli;
use crate::config::RunConfig;
use crate::core::{build_client, permute, Enumerator, HttpProber, TextDiffComparator};
use crate::error::{Result, VhunterError};
use crate::output::{
    print_banner, print_info, print_warning, report, OutputHandler, ProgressTracker, Summary,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Run virtual host enumeration
pub async fn run(cli: &Cli) -> Result<Summary> {
    let config = Arc::new(RunConfig::load(cli).await?);
    let quiet = cli.global.quiet;

    // nothing to print or write when there is nothing to test
    if permute(&config.wordlist, &config.domains).is_empty() {
        return Err(VhunterError::NoCandidates);
    }

    if !quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_info(&format!(
            "Finding vhosts on {} IP(s), {} port(s), {} path(s), {} word(s)",
            config.ips.len(),
            config.ports.len(),
            config.paths.len(),
            config.wordlist.len()
        ));
    }

    if config.threshold >= 1.0 {
        print_warning("threshold of 100% never reports a finding");
    }

    // Build HTTP client, shared by every worker
    let client = build_client(&config.http)?;
    let prober = Arc::new(HttpProber::new(client, config.headers.clone()));
    let enumerator = Enumerator::new(Arc::clone(&config), prober, Arc::new(TextDiffComparator));

    let progress = ProgressTracker::new(
        enumerator.planned_jobs() as u64,
        quiet || cli.global.no_progress,
    );
    let output = Arc::new(OutputHandler::new(cli.global.output.as_deref()).await?);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(report(
        events_rx,
        progress.clone(),
        Arc::clone(&output),
        config.verbose,
    ));

    let stats = enumerator.run(events_tx).await;
    // the writer ends once every worker has dropped its sender
    let summary = writer.await.unwrap_or_default();
    progress.finish();
    output.finalize().await?;

    let stats = stats?;
    debug!(?stats, "run finished");

    if !quiet {
        print_info(&format!(
            "Done: {} found, {} suppressed, {} errors, {}/{} jobs completed",
            summary.found, summary.suppressed, summary.errors, stats.completed, stats.dispatched
        ));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn empty_wordlist_fails_before_the_result_file_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("words.txt");
        tokio::fs::write(&words, "# nothing but comments\n\n").await.unwrap();
        let results = dir.path().join("results.txt");

        let cli = Cli::parse_from([
            "vhunter",
            "--ip",
            "127.0.0.1",
            "-w",
            words.to_str().unwrap(),
            "-o",
            results.to_str().unwrap(),
            "-q",
        ]);

        let err = run(&cli).await.unwrap_err();
        assert!(matches!(err, VhunterError::NoCandidates));
        assert!(!results.exists());
    }
}
