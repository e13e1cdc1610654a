//! Job scheduling and the worker pool

use crate::config::RunConfig;
use crate::core::baseline::{BaselineManager, RefreshPolicy};
use crate::core::permute::permute;
use crate::core::probe::{Fingerprint, Prober, Target, Throttled};
use crate::core::similarity::{compare_blocking, Comparator};
use crate::core::verify::Verifier;
use crate::error::{Result, VhunterError};
use crate::output::{Outcome, ScanEvent};
use async_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// One candidate to probe against one target/path.
#[derive(Debug)]
pub struct Job {
    pub target: Target,
    pub path: String,
    pub domain: String,
    /// Baseline active when the job was created; never replaced afterwards
    pub baseline: Arc<Fingerprint>,
}

/// Totals for a finished run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub candidates: usize,
    pub dispatched: usize,
    pub completed: usize,
}

pub struct Enumerator<P, C> {
    config: Arc<RunConfig>,
    prober: Arc<Throttled<P>>,
    comparator: Arc<C>,
}

impl<P, C> Enumerator<P, C>
where
    P: Prober + 'static,
    C: Comparator + 'static,
{
    /// All requests made through this enumerator share `config.threads` permits.
    pub fn new(config: Arc<RunConfig>, prober: Arc<P>, comparator: Arc<C>) -> Self {
        let threads = config.threads;
        Self {
            config,
            prober: Arc::new(Throttled::new(prober, threads)),
            comparator,
        }
    }

    /// Number of jobs a run will dispatch if every baseline succeeds.
    pub fn planned_jobs(&self) -> usize {
        let candidates = permute(&self.config.wordlist, &self.config.domains).len();
        candidates * self.config.ips.len() * self.config.ports.len() * self.config.paths.len()
    }

    /// Run the whole enumeration, sending one event per classified job (plus
    /// one per baseline failure) to `events`. Returns once every dispatched
    /// job has been classified.
    pub async fn run(&self, events: UnboundedSender<ScanEvent>) -> Result<RunStats> {
        let candidates = permute(&self.config.wordlist, &self.config.domains);
        if candidates.is_empty() {
            return Err(VhunterError::NoCandidates);
        }

        let threads = self.config.threads.max(1);
        let (jobs_tx, jobs_rx) = async_channel::bounded::<Job>(threads);
        let completed = Arc::new(AtomicUsize::new(0));

        let mut workers = JoinSet::new();
        for id in 0..threads {
            let worker = Worker {
                id,
                config: Arc::clone(&self.config),
                prober: Arc::clone(&self.prober),
                comparator: Arc::clone(&self.comparator),
                verifier: Verifier::new(
                    Arc::clone(&self.prober),
                    Arc::clone(&self.comparator),
                    self.config.tls,
                ),
                events: events.clone(),
                completed: Arc::clone(&completed),
            };
            workers.spawn(worker.run(jobs_rx.clone()));
        }
        drop(jobs_rx);

        let baselines = BaselineManager::new(Arc::clone(&self.prober));
        let dispatch = self
            .dispatch_all(&baselines, &candidates, &jobs_tx, &events)
            .await;

        // closing the queue lets workers exit once it is drained
        drop(jobs_tx);
        while workers.join_next().await.is_some() {}

        let dispatched = dispatch?;
        Ok(RunStats {
            candidates: candidates.len(),
            dispatched,
            completed: completed.load(Ordering::SeqCst),
        })
    }

    async fn dispatch_all(
        &self,
        baselines: &BaselineManager<Throttled<P>>,
        candidates: &[String],
        jobs: &Sender<Job>,
        events: &UnboundedSender<ScanEvent>,
    ) -> Result<usize> {
        let mut dispatched = 0;
        for ip in &self.config.ips {
            for port in &self.config.ports {
                let target = Target::new(ip.clone(), *port, self.config.tls);
                for path in &self.config.paths {
                    dispatched += self
                        .dispatch_path(baselines, &target, path, candidates, jobs, events)
                        .await?;
                }
            }
        }
        Ok(dispatched)
    }

    /// Baseline then dispatch every candidate for one target/path.
    async fn dispatch_path(
        &self,
        baselines: &BaselineManager<Throttled<P>>,
        target: &Target,
        path: &str,
        candidates: &[String],
        jobs: &Sender<Job>,
        events: &UnboundedSender<ScanEvent>,
    ) -> Result<usize> {
        let policy = RefreshPolicy::new(self.config.refresh_percent, candidates.len());
        let context = self
            .config
            .baseline_context
            .then(|| self.config.domains.first().map(String::as_str))
            .flatten();

        let mut baseline = match self
            .acquire_baseline(baselines, target, path, context, events)
            .await
        {
            Some(baseline) => baseline,
            None => return Ok(0),
        };
        info!(%target, path, status = baseline.status, "baseline taken");

        let mut dispatched = 0;
        for (index, domain) in candidates.iter().enumerate() {
            if index > 0 && policy.is_checkpoint(index) {
                let context = self
                    .config
                    .baseline_context
                    .then(|| candidates[index - 1].as_str());
                debug!(%target, path, index, "refreshing baseline");
                baseline = match self
                    .acquire_baseline(baselines, target, path, context, events)
                    .await
                {
                    Some(baseline) => baseline,
                    None => break,
                };
            }

            let job = Job {
                target: target.clone(),
                path: path.to_string(),
                domain: domain.clone(),
                baseline: Arc::clone(&baseline),
            };
            jobs.send(job).await.map_err(|_| VhunterError::QueueClosed)?;
            dispatched += 1;
        }

        Ok(dispatched)
    }

    /// A fresh baseline, the zero baseline in force mode, or `None` when
    /// dispatching for this target/path has to stop.
    async fn acquire_baseline(
        &self,
        baselines: &BaselineManager<Throttled<P>>,
        target: &Target,
        path: &str,
        context: Option<&str>,
        events: &UnboundedSender<ScanEvent>,
    ) -> Option<Arc<Fingerprint>> {
        match baselines.take(target, path, context).await {
            Ok(fingerprint) => Some(Arc::new(fingerprint)),
            Err(e) => {
                let forced = self.config.force;
                let event = ScanEvent::baseline_failed(target, path, e.reason(), forced);
                let _ = events.send(event);
                forced.then(|| Arc::new(Fingerprint::zero()))
            }
        }
    }
}

struct Worker<P, C> {
    id: usize,
    config: Arc<RunConfig>,
    prober: Arc<Throttled<P>>,
    comparator: Arc<C>,
    verifier: Verifier<Throttled<P>, C>,
    events: UnboundedSender<ScanEvent>,
    completed: Arc<AtomicUsize>,
}

impl<P: Prober, C: Comparator + 'static> Worker<P, C> {
    async fn run(self, jobs: Receiver<Job>) {
        while let Ok(job) = jobs.recv().await {
            let event = self.process(job).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            // the writer may already be gone if the caller stopped listening
            let _ = self.events.send(event);
        }
        debug!(worker = self.id, "job queue closed, worker exiting");
    }

    /// probe -> compare -> (verify) -> classify
    async fn process(&self, job: Job) -> ScanEvent {
        let outcome = match self.prober.probe(&job.target, &job.path, &job.domain).await {
            Err(e) => Outcome::ProbeFailed { reason: e.reason() },
            Ok(response) => {
                let response = Arc::new(response);
                let status = response.status;
                let size = response.content_length;
                let different = compare_blocking(
                    Arc::clone(&self.comparator),
                    Arc::clone(&job.baseline),
                    Arc::clone(&response),
                    self.config.threshold,
                )
                .await;

                match different {
                    Err(e) => Outcome::ProbeFailed { reason: e.reason() },
                    Ok(false) => Outcome::Indistinct { status, size },
                    Ok(true) => {
                        let genuine = !self.config.verify
                            || self.verifier.verify(&job.domain, &job.path, response).await;
                        if genuine {
                            Outcome::Found { status, size }
                        } else {
                            Outcome::Suppressed { status, size }
                        }
                    }
                }
            }
        };

        ScanEvent {
            target: job.target,
            path: job.path,
            host: job.domain,
            outcome,
        }
    }
}
