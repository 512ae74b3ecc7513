//! Job polling controller.
//!
//! [`PollingController`] tracks at most one in-flight generation job. It
//! checks the job's status on a fixed interval until the backend reports
//! a terminal status, then merges the returned images into the shared
//! [`HierarchyStore`] and hands a [`PollOutcome`] to the caller through
//! the [`PollHandle`] returned by [`PollingController::start`].
//!
//! Starting a new poll cancels the previous one. A status response that
//! arrives after its poll was cancelled or superseded is discarded: the
//! "still active" check and the merge happen under the controller's lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use designflow_core::hierarchy::HierarchyStore;
use designflow_core::image::GeneratedImage;
use designflow_core::job::{GenerationJob, JobStatus, UnknownStatus};
use designflow_core::types::{ImageId, JobId};

use crate::api::DesignApiError;
use crate::backend::DesignBackend;
use crate::messages::JobStatusResponse;
use crate::outcome::{PollError, PollOutcome};

/// Default delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How long [`PollingController::shutdown`] waits for the poll task.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Message reported when a failed job carries no error text.
const UNKNOWN_JOB_ERROR: &str = "Unknown error";

/// The hierarchy store shared between the poller and its owner.
pub type SharedStore = Arc<RwLock<HierarchyStore>>;

/// Tunable polling parameters.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks. The first check happens one interval
    /// after [`PollingController::start`].
    pub interval: Duration,
    /// Give up with [`PollOutcome::TimedOut`] after this many
    /// non-terminal checks. `None` polls until a terminal status.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Observable state of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    AwaitingJob { job_id: JobId, attempts: u32 },
    Resolved { job_id: JobId },
    Failed { job_id: JobId },
    TimedOut { job_id: JobId },
}

/// Receives the outcome of one poll.
#[derive(Debug)]
pub struct PollHandle {
    job_id: JobId,
    outcome: oneshot::Receiver<PollOutcome>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Wait for the poll to finish.
    ///
    /// Returns `None` if the poll was cancelled or superseded.
    pub async fn outcome(self) -> Option<PollOutcome> {
        self.outcome.await.ok()
    }
}

/// Polls one generation job at a time and merges its result.
pub struct PollingController {
    backend: Arc<dyn DesignBackend>,
    store: SharedStore,
    config: PollConfig,
    inner: Arc<Mutex<PollInner>>,
    /// Parent of every per-poll token; cancelled on drop.
    teardown: CancellationToken,
}

struct PollInner {
    state: PollState,
    active: Option<ActivePoll>,
    next_generation: u64,
}

/// Bookkeeping for the poll currently in flight.
struct ActivePoll {
    /// Distinguishes this poll from any earlier poll of the same job id.
    generation: u64,
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingController {
    pub fn new(backend: Arc<dyn DesignBackend>, store: SharedStore, config: PollConfig) -> Self {
        Self {
            backend,
            store,
            config,
            inner: Arc::new(Mutex::new(PollInner {
                state: PollState::Idle,
                active: None,
                next_generation: 0,
            })),
            teardown: CancellationToken::new(),
        }
    }

    /// Start polling `job_id`, cancelling any poll already in flight.
    ///
    /// When the job succeeds its images are merged under `parent_id`
    /// (`None` for root results).
    pub async fn start(&self, job_id: impl Into<JobId>, parent_id: Option<ImageId>) -> PollHandle {
        let job_id = job_id.into();
        let mut inner = self.inner.lock().await;

        if let Some(previous) = inner.active.take() {
            tracing::info!(
                job_id = %previous.job_id,
                superseded_by = %job_id,
                "Cancelling superseded poll",
            );
            previous.cancel.cancel();
        }

        inner.next_generation += 1;
        let generation = inner.next_generation;
        let cancel = self.teardown.child_token();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let task = PollTask {
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
            generation,
            cancel: cancel.clone(),
            job: GenerationJob::new(job_id.clone(), parent_id),
        };

        tracing::info!(
            job_id = %job_id,
            parent_id = ?task.job.parent_id,
            interval_ms = self.config.interval.as_millis() as u64,
            "Polling generation job",
        );

        let handle = tokio::spawn(task.run(outcome_tx));

        inner.state = PollState::AwaitingJob {
            job_id: job_id.clone(),
            attempts: 0,
        };
        inner.active = Some(ActivePoll {
            generation,
            job_id: job_id.clone(),
            cancel,
            task: handle,
        });

        PollHandle {
            job_id,
            outcome: outcome_rx,
        }
    }

    /// Stop the active poll, if any. Returns `true` if one was cancelled.
    ///
    /// A status request already in flight is allowed to complete; its
    /// response is discarded.
    pub async fn cancel(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.active.take() {
            Some(active) => {
                tracing::info!(job_id = %active.job_id, "Poll cancelled");
                active.cancel.cancel();
                inner.state = PollState::Idle;
                true
            }
            None => false,
        }
    }

    /// Cancel the active poll and wait for its task to exit.
    pub async fn shutdown(&self) {
        let active = {
            let mut inner = self.inner.lock().await;
            inner.state = PollState::Idle;
            inner.active.take()
        };
        if let Some(active) = active {
            tracing::info!(job_id = %active.job_id, "Stopping poll task");
            active.cancel.cancel();
            let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, active.task).await;
        }
    }

    pub async fn state(&self) -> PollState {
        self.inner.lock().await.state.clone()
    }

    pub async fn active_job_id(&self) -> Option<JobId> {
        self.inner
            .lock()
            .await
            .active
            .as_ref()
            .map(|active| active.job_id.clone())
    }

    pub async fn is_polling(&self) -> bool {
        self.inner.lock().await.active.is_some()
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

// ---------------------------------------------------------------------------
// Poll task
// ---------------------------------------------------------------------------

/// Result of interpreting one status response.
enum Step {
    Continue(JobStatus),
    Finish(Finished),
}

enum Finished {
    Succeeded(Vec<GeneratedImage>),
    Failed(PollError),
    TimedOut,
}

struct PollTask {
    backend: Arc<dyn DesignBackend>,
    store: SharedStore,
    inner: Arc<Mutex<PollInner>>,
    config: PollConfig,
    generation: u64,
    cancel: CancellationToken,
    job: GenerationJob,
}

impl PollTask {
    async fn run(mut self, outcome_tx: oneshot::Sender<PollOutcome>) {
        let start = Instant::now() + self.config.interval;
        let mut ticker = tokio::time::interval_at(start, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::debug!(job_id = %self.job.job_id, "Poll task exiting after cancellation");
                    return;
                }
                _ = ticker.tick() => {}
            }

            self.job.attempts += 1;
            let response = self.backend.check_status(&self.job.job_id).await;

            match self.interpret(response) {
                Step::Continue(status) => {
                    self.job.status = status;
                    tracing::debug!(
                        job_id = %self.job.job_id,
                        attempt = self.job.attempts,
                        status = %status,
                        "Job still running",
                    );
                    if self
                        .config
                        .max_attempts
                        .is_some_and(|max| self.job.attempts >= max)
                    {
                        self.finish(Finished::TimedOut, outcome_tx).await;
                        return;
                    }
                    self.record_attempt().await;
                }
                Step::Finish(finished) => {
                    self.finish(finished, outcome_tx).await;
                    return;
                }
            }
        }
    }

    fn interpret(&self, response: Result<JobStatusResponse, DesignApiError>) -> Step {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(job_id = %self.job.job_id, error = %e, "Status check failed");
                return Step::Finish(Finished::Failed(PollError::Transport(e.to_string())));
            }
        };

        match response.parsed_status() {
            Ok(status @ (JobStatus::Pending | JobStatus::Processing)) => Step::Continue(status),
            Ok(JobStatus::Succeeded) => match response.images {
                Some(images) => Step::Finish(Finished::Succeeded(images)),
                None => {
                    tracing::error!(
                        job_id = %self.job.job_id,
                        "Backend reported success without images",
                    );
                    Step::Finish(Finished::Failed(PollError::MissingImages))
                }
            },
            Ok(JobStatus::Failed) => {
                let message = response
                    .error
                    .unwrap_or_else(|| UNKNOWN_JOB_ERROR.to_string());
                tracing::warn!(job_id = %self.job.job_id, error = %message, "Generation failed");
                Step::Finish(Finished::Failed(PollError::JobFailed(message)))
            }
            Err(UnknownStatus(raw)) => {
                tracing::error!(job_id = %self.job.job_id, status = %raw, "Unknown job status");
                Step::Finish(Finished::Failed(PollError::UnknownStatus(raw)))
            }
        }
    }

    /// Publish the attempt count while this poll is still the active one.
    async fn record_attempt(&self) {
        let mut inner = self.inner.lock().await;
        if self.is_current(&inner) {
            inner.state = PollState::AwaitingJob {
                job_id: self.job.job_id.clone(),
                attempts: self.job.attempts,
            };
        }
    }

    /// Apply a terminal result, unless this poll has been cancelled or
    /// superseded in the meantime.
    async fn finish(self, finished: Finished, outcome_tx: oneshot::Sender<PollOutcome>) {
        let mut inner = self.inner.lock().await;
        if !self.is_current(&inner) {
            tracing::warn!(
                job_id = %self.job.job_id,
                "Discarding status response for a cancelled poll",
            );
            return;
        }
        inner.active = None;

        let job_id = self.job.job_id.clone();
        let outcome = match finished {
            Finished::Succeeded(images) => {
                let image_ids = images.iter().map(|image| image.id.clone()).collect();
                let report = self.store.write().await.merge(
                    &job_id,
                    images,
                    self.job.parent_id.as_deref(),
                );
                tracing::info!(
                    job_id = %job_id,
                    added = report.added,
                    attempts = self.job.attempts,
                    elapsed_ms = self.job.elapsed_ms(),
                    "Generation job resolved",
                );
                inner.state = PollState::Resolved {
                    job_id: job_id.clone(),
                };
                PollOutcome::Resolved {
                    job_id,
                    parent_id: self.job.parent_id.clone(),
                    image_ids,
                    report,
                }
            }
            Finished::Failed(error) => {
                inner.state = PollState::Failed {
                    job_id: job_id.clone(),
                };
                PollOutcome::Failed { job_id, error }
            }
            Finished::TimedOut => {
                tracing::warn!(
                    job_id = %job_id,
                    attempts = self.job.attempts,
                    last_status = %self.job.status,
                    elapsed_ms = self.job.elapsed_ms(),
                    "Polling gave up after max attempts",
                );
                inner.state = PollState::TimedOut {
                    job_id: job_id.clone(),
                };
                PollOutcome::TimedOut {
                    job_id,
                    attempts: self.job.attempts,
                }
            }
        };
        drop(inner);

        // The receiver may have been dropped; nobody is waiting then.
        let _ = outcome_tx.send(outcome);
    }

    fn is_current(&self, inner: &PollInner) -> bool {
        !self.cancel.is_cancelled()
            && inner
                .active
                .as_ref()
                .is_some_and(|active| active.generation == self.generation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
