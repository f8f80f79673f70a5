//! Cooperative fixed-interval job runner (§4.F).
//!
//! Each registered job runs on its own `tokio::time::interval`. A tick is
//! skipped (and logged) if the previous run of that same job is still in
//! flight — the interval itself is the retry cadence on failure, there is
//! no separate retry loop here.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::Result;

type JobFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type JobFn = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Point-in-time status of one registered job, surfaced via [`crate::metrics`].
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub running: bool,
}

struct RegisteredJob {
    name: &'static str,
    interval: Duration,
    run: JobFn,
    in_flight: Arc<AtomicBool>,
}

/// Owns the set of registered jobs and their last-run status, exposed to the
/// CLI `status` subcommand and to `crate::metrics`.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<RegisteredJob>,
    status: Arc<RwLock<HashMap<&'static str, JobStatus>>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self { jobs: Vec::new(), status: Arc::new(RwLock::new(HashMap::new())) }
    }

    #[must_use]
    pub fn status_snapshot(&self) -> HashMap<&'static str, JobStatus> {
        self.status.read().clone()
    }

    /// Registers a job to run every `interval`, starting with an immediate
    /// first tick (matching `tokio::time::interval`'s default behavior).
    pub fn register<F, Fut>(&mut self, name: &'static str, interval: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.status.write().insert(name, JobStatus::default());
        self.jobs.push(RegisteredJob {
            name,
            interval,
            run: Arc::new(move || Box::pin(job())),
            in_flight: Arc::new(AtomicBool::new(false)),
        });
    }

    /// Spawns one task per registered job and runs until `shutdown` fires.
    /// Returns once every job task has observed the shutdown signal.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::with_capacity(self.jobs.len());

        for job in &self.jobs {
            let name = job.name;
            let run = Arc::clone(&job.run);
            let in_flight = Arc::clone(&job.in_flight);
            let status = Arc::clone(&self.status);
            let mut shutdown = shutdown.clone();
            let mut ticker = tokio::time::interval(job.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            handles.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            if *shutdown.borrow() {
                                info!(job = name, "scheduler job stopping on shutdown");
                                return;
                            }
                        }
                        _ = ticker.tick() => {
                            if in_flight.swap(true, Ordering::SeqCst) {
                                warn!(job = name, "skipping tick, previous run still in flight");
                                continue;
                            }
                            run_one(name, &run, &status).await;
                            in_flight.store(false, Ordering::SeqCst);
                        }
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn run_one(name: &'static str, run: &JobFn, status: &Arc<RwLock<HashMap<&'static str, JobStatus>>>) {
    let started = Utc::now();
    match run().await {
        Ok(()) => {
            info!(job = name, "job tick succeeded");
            let mut guard = status.write();
            let entry = guard.entry(name).or_default();
            entry.last_success_at = Some(started);
            entry.running = false;
        }
        Err(err) => {
            warn!(job = name, error = %err, "job tick failed, will retry on next interval");
            let mut guard = status.write();
            let entry = guard.entry(name).or_default();
            entry.last_failure_at = Some(started);
            entry.last_error = Some(err.to_string());
            entry.running = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn skips_tick_when_previous_run_still_executing() {
        let mut scheduler = Scheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        scheduler.register("slow_job", Duration::from_millis(10), move || {
            let calls = Arc::clone(&calls_clone);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            }
        });

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { scheduler.run(rx).await });
        tokio::time::sleep(Duration::from_millis(55)).await;
        tx.send(true).unwrap();
        let _ = handle.await;

        assert!(calls.load(Ordering::SeqCst) <= 2);
    }
}
