//! Single-flight render job queue.
//!
//! A worker task owns the running job, the FIFO of waiting jobs, the render
//! cache and the last failure. Everything else talks to it through a
//! [`RenderControls`] handle. At most one job runs at a time; completion,
//! failure and cancellation all advance the queue. Cancelling drops the
//! in-flight request future. Failed jobs are kept for an explicit retry and
//! never retried automatically. The running job holds the busy indicator
//! until it finishes, fails or is cancelled.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use shotlist_common::error::{ShotlistError, ShotlistResult};
use shotlist_sequence_model::{RenderData, RenderParams, Segment};

use crate::backend::{Backend, BackendError};
use crate::busy::{BusyGuard, BusyIndicator};
use crate::signature::{render_signature, RenderCache, Signature};

/// Render fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Leading segments, visual only.
    Preview,
    /// Whole sequence, muxed with narration, music and subtitles.
    Full,
    /// One segment, visual only.
    Single,
}

impl RenderMode {
    /// Preview-class renders ask for and return the combined artifact and
    /// are cacheable.
    pub fn is_preview(self) -> bool {
        !matches!(self, Self::Full)
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Preview => "preview",
            Self::Full => "full",
            Self::Single => "single",
        })
    }
}

/// Where a stored job is in its lifecycle. Successful and cancelled jobs are
/// not kept; their [`JobOutcome`] goes to the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Failed,
}

/// A render request captured at submission time.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub id: u64,
    pub signature: Signature,
    pub mode: RenderMode,
    /// Immutable snapshot; later edits never leak into a queued job.
    pub segments: Arc<Vec<Segment>>,
    /// Params object sent on the wire, if any.
    pub params: Option<Arc<Value>>,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
}

/// What the caller hands to [`RenderControls::submit`].
#[derive(Debug, Clone)]
pub struct RenderSubmission {
    pub mode: RenderMode,
    pub segments: Arc<Vec<Segment>>,
    pub params: Option<Arc<Value>>,
    pub signature: Signature,
}

impl RenderSubmission {
    /// Build a submission, signing the snapshot with the resolved params.
    pub fn new(
        mode: RenderMode,
        segments: Arc<Vec<Segment>>,
        resolved: &RenderParams,
        wire_params: Option<Value>,
    ) -> serde_json::Result<Self> {
        let signature = render_signature(&segments, resolved)?;
        Ok(Self {
            mode,
            segments,
            params: wire_params.map(Arc::new),
            signature,
        })
    }
}

/// Terminal outcome of one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// `url` is `None` when the backend answered without the expected
    /// artifact.
    Succeeded { url: Option<String> },
    Failed { error: String, retryable: bool },
    Cancelled,
}

/// Handle to a queued job.
#[derive(Debug)]
pub struct JobTicket {
    pub job_id: u64,
    /// Jobs ahead of this one, including the running one.
    pub position: usize,
    done: oneshot::Receiver<JobOutcome>,
}

impl JobTicket {
    /// Wait for the job to finish.
    pub async fn wait(self) -> JobOutcome {
        self.done.await.unwrap_or(JobOutcome::Cancelled)
    }
}

/// Result of a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Served from the cache without touching the network.
    Cached { url: String },
    Queued(JobTicket),
}

/// Notifications emitted by the worker, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    CacheHit {
        job_id: Option<u64>,
        mode: RenderMode,
        url: String,
    },
    Queued {
        job_id: u64,
        mode: RenderMode,
        position: usize,
    },
    Started {
        job_id: u64,
        mode: RenderMode,
    },
    Completed {
        job_id: u64,
        mode: RenderMode,
        url: Option<String>,
    },
    Failed {
        job_id: u64,
        mode: RenderMode,
        error: String,
    },
    Cancelled {
        job_id: u64,
        mode: RenderMode,
    },
}

/// Snapshot of the last failure, enough to resubmit it verbatim.
#[derive(Debug, Clone)]
pub struct FailedRender {
    pub job: RenderJob,
    pub error: String,
}

/// Observable queue state.
#[derive(Debug, Clone, Default)]
pub struct QueueState {
    pub running: Option<(u64, RenderMode)>,
    pub queued: usize,
    pub last_preview_url: Option<String>,
    pub last_failed: Option<FailedRender>,
    pub cached: usize,
}

impl QueueState {
    pub fn is_rendering(&self) -> bool {
        self.running.is_some()
    }

    pub fn running_mode(&self) -> Option<RenderMode> {
        self.running.map(|(_, mode)| mode)
    }
}

enum Command {
    Submit {
        submission: RenderSubmission,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    Cancel {
        reply: oneshot::Sender<bool>,
    },
    RetryLastFailed {
        reply: oneshot::Sender<Option<JobTicket>>,
    },
    UseBusy(BusyIndicator),
}

/// Capability handle for the render queue. Dropping it stops the worker
/// once the running job has been abandoned.
#[derive(Debug)]
pub struct RenderControls {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<QueueState>,
    worker: JoinHandle<()>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit { submission, .. } => f
                .debug_struct("Submit")
                .field("mode", &submission.mode)
                .field("signature", &submission.signature.short())
                .finish(),
            Self::Cancel { .. } => f.write_str("Cancel"),
            Self::RetryLastFailed { .. } => f.write_str("RetryLastFailed"),
            Self::UseBusy(_) => f.write_str("UseBusy"),
        }
    }
}

impl RenderControls {
    /// Spawn the worker on the current runtime. Running jobs mark the
    /// process-wide [`BusyIndicator`].
    pub fn spawn(
        backend: Arc<dyn Backend>,
        task_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<RenderEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(QueueState::default());

        let worker = Worker {
            backend,
            task_id: task_id.into(),
            cache: RenderCache::new(),
            waiting: VecDeque::new(),
            running: None,
            last_failed: None,
            last_preview_url: None,
            busy: BusyIndicator::global().clone(),
            next_id: 1,
            events: event_tx,
            state: state_tx,
        };
        let worker = tokio::spawn(worker.run(command_rx));

        (
            Self {
                commands: command_tx,
                state: state_rx,
                worker,
            },
            event_rx,
        )
    }

    pub async fn submit(&self, submission: RenderSubmission) -> ShotlistResult<SubmitOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { submission, reply })?;
        rx.await.map_err(|_| worker_gone())
    }

    /// Abort the running job. Returns `false` when nothing was running.
    pub async fn cancel(&self) -> ShotlistResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Cancel { reply })?;
        rx.await.map_err(|_| worker_gone())
    }

    /// Resubmit the last failed job through the queue.
    pub async fn retry_last_failed(&self) -> ShotlistResult<Option<JobTicket>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RetryLastFailed { reply })?;
        rx.await.map_err(|_| worker_gone())
    }

    /// Mark `busy` instead while jobs started from now on are running.
    pub fn set_busy_indicator(&self, busy: BusyIndicator) -> ShotlistResult<()> {
        self.send(Command::UseBusy(busy))
    }

    pub fn state(&self) -> QueueState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<QueueState> {
        self.state.clone()
    }

    pub fn is_rendering(&self) -> bool {
        self.state.borrow().is_rendering()
    }

    pub fn last_preview_url(&self) -> Option<String> {
        self.state.borrow().last_preview_url.clone()
    }

    /// Stop the worker, dropping any running or waiting jobs.
    pub fn shutdown(self) {
        self.worker.abort();
    }

    fn send(&self, command: Command) -> ShotlistResult<()> {
        self.commands.send(command).map_err(|_| worker_gone())
    }
}

fn worker_gone() -> ShotlistError {
    ShotlistError::render("render worker is not running")
}

type RenderFuture = Pin<Box<dyn Future<Output = Result<RenderData, BackendError>> + Send>>;

struct Waiting {
    job: RenderJob,
    done: oneshot::Sender<JobOutcome>,
}

struct Running {
    job: RenderJob,
    done: oneshot::Sender<JobOutcome>,
    request: RenderFuture,
    _busy: BusyGuard,
}

struct Worker {
    backend: Arc<dyn Backend>,
    task_id: String,
    cache: RenderCache,
    waiting: VecDeque<Waiting>,
    running: Option<Running>,
    last_failed: Option<FailedRender>,
    last_preview_url: Option<String>,
    busy: BusyIndicator,
    next_id: u64,
    events: mpsc::UnboundedSender<RenderEvent>,
    state: watch::Sender<QueueState>,
}

/// Resolves with the running request's result, or never when idle.
async fn next_result(slot: &mut Option<Running>) -> Result<RenderData, BackendError> {
    match slot {
        Some(running) => (&mut running.request).await,
        None => std::future::pending().await,
    }
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!(task_id = %self.task_id, "Render worker started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                result = next_result(&mut self.running) => self.finish(result),
            }
            self.start_next();
            self.publish();
        }
        if let Some(running) = self.running.take() {
            let _ = running.done.send(JobOutcome::Cancelled);
        }
        tracing::debug!(task_id = %self.task_id, "Render worker stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit { submission, reply } => {
                let outcome = self.submit(submission);
                let _ = reply.send(outcome);
            }
            Command::Cancel { reply } => {
                let _ = reply.send(self.cancel_running());
            }
            Command::RetryLastFailed { reply } => {
                let ticket = self.last_failed.take().map(|failed| {
                    tracing::info!(
                        job_id = failed.job.id,
                        mode = %failed.job.mode,
                        "Retrying last failed render"
                    );
                    self.enqueue(
                        failed.job.mode,
                        failed.job.segments,
                        failed.job.params,
                        failed.job.signature,
                    )
                });
                let _ = reply.send(ticket);
            }
            Command::UseBusy(busy) => self.busy = busy,
        }
    }

    fn submit(&mut self, submission: RenderSubmission) -> SubmitOutcome {
        if submission.mode.is_preview() {
            if let Some(url) = self.cache.get(&submission.signature) {
                let url = url.to_string();
                tracing::info!(
                    mode = %submission.mode,
                    signature = submission.signature.short(),
                    "Render served from cache"
                );
                self.last_preview_url = Some(url.clone());
                self.emit(RenderEvent::CacheHit {
                    job_id: None,
                    mode: submission.mode,
                    url: url.clone(),
                });
                return SubmitOutcome::Cached { url };
            }
        }
        SubmitOutcome::Queued(self.enqueue(
            submission.mode,
            submission.segments,
            submission.params,
            submission.signature,
        ))
    }

    fn enqueue(
        &mut self,
        mode: RenderMode,
        segments: Arc<Vec<Segment>>,
        params: Option<Arc<Value>>,
        signature: Signature,
    ) -> JobTicket {
        let id = self.next_id;
        self.next_id += 1;
        let job = RenderJob {
            id,
            signature,
            mode,
            segments,
            params,
            status: JobStatus::Queued,
            submitted_at: Utc::now(),
        };
        let position = self.waiting.len() + usize::from(self.running.is_some());
        let (done, rx) = oneshot::channel();
        self.waiting.push_back(Waiting { job, done });
        tracing::debug!(job_id = id, %mode, position, "Render job queued");
        self.emit(RenderEvent::Queued {
            job_id: id,
            mode,
            position,
        });
        JobTicket {
            job_id: id,
            position,
            done: rx,
        }
    }

    fn cancel_running(&mut self) -> bool {
        let Some(Running {
            job,
            done,
            request,
            _busy: busy,
        }) = self.running.take()
        else {
            return false;
        };
        // Dropping the request future aborts the HTTP call.
        drop(request);
        drop(busy);
        tracing::info!(job_id = job.id, mode = %job.mode, "Render job cancelled");
        self.emit(RenderEvent::Cancelled {
            job_id: job.id,
            mode: job.mode,
        });
        let _ = done.send(JobOutcome::Cancelled);
        true
    }

    fn start_next(&mut self) {
        while self.running.is_none() {
            let Some(Waiting { mut job, done }) = self.waiting.pop_front() else {
                return;
            };

            // An identical preview may have completed while this one waited.
            if job.mode.is_preview() {
                if let Some(url) = self.cache.get(&job.signature).map(str::to_string) {
                    self.last_preview_url = Some(url.clone());
                    self.emit(RenderEvent::CacheHit {
                        job_id: Some(job.id),
                        mode: job.mode,
                        url: url.clone(),
                    });
                    let _ = done.send(JobOutcome::Succeeded { url: Some(url) });
                    continue;
                }
            }

            tracing::info!(
                job_id = job.id,
                mode = %job.mode,
                segments = job.segments.len(),
                signature = job.signature.short(),
                "Render job started"
            );
            self.emit(RenderEvent::Started {
                job_id: job.id,
                mode: job.mode,
            });
            job.status = JobStatus::Running;
            let request = self.request_for(&job);
            self.running = Some(Running {
                job,
                done,
                request,
                _busy: self.busy.acquire("render"),
            });
        }
    }

    fn request_for(&self, job: &RenderJob) -> RenderFuture {
        let backend = Arc::clone(&self.backend);
        let task_id = self.task_id.clone();
        let segments = Arc::clone(&job.segments);
        let params = job.params.clone();
        let preview = job.mode.is_preview();
        Box::pin(async move {
            backend
                .render_segments(&task_id, &segments, params.as_deref(), preview)
                .await
        })
    }

    fn finish(&mut self, result: Result<RenderData, BackendError>) {
        let Some(Running {
            mut job,
            done,
            request,
            _busy: busy,
        }) = self.running.take()
        else {
            return;
        };
        drop(request);
        drop(busy);
        match result {
            Ok(data) => {
                let url = if job.mode.is_preview() {
                    data.combined()
                } else {
                    data.final_output()
                }
                .map(str::to_string);

                match &url {
                    Some(url) if job.mode.is_preview() => {
                        self.cache.insert(job.signature.clone(), url.clone());
                        self.last_preview_url = Some(url.clone());
                    }
                    Some(_) => {}
                    None => tracing::warn!(
                        job_id = job.id,
                        mode = %job.mode,
                        "Render finished without the expected artifact"
                    ),
                }
                self.last_failed = None;
                tracing::info!(job_id = job.id, mode = %job.mode, url = ?url, "Render job completed");
                self.emit(RenderEvent::Completed {
                    job_id: job.id,
                    mode: job.mode,
                    url: url.clone(),
                });
                let _ = done.send(JobOutcome::Succeeded { url });
            }
            Err(err) => {
                let error = err.to_string();
                let retryable = err.is_retryable();
                tracing::warn!(job_id = job.id, mode = %job.mode, error = %error, "Render job failed");
                self.emit(RenderEvent::Failed {
                    job_id: job.id,
                    mode: job.mode,
                    error: error.clone(),
                });
                job.status = JobStatus::Failed;
                self.last_failed = Some(FailedRender {
                    job,
                    error: error.clone(),
                });
                let _ = done.send(JobOutcome::Failed { error, retryable });
            }
        }
    }

    fn emit(&self, event: RenderEvent) {
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.state.send_replace(QueueState {
            running: self.running.as_ref().map(|r| (r.job.id, r.job.mode)),
            queued: self.waiting.len(),
            last_preview_url: self.last_preview_url.clone(),
            last_failed: self.last_failed.clone(),
            cached: self.cache.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_modes() {
        assert!(RenderMode::Preview.is_preview());
        assert!(RenderMode::Single.is_preview());
        assert!(!RenderMode::Full.is_preview());
        assert_eq!(RenderMode::Single.to_string(), "single");
    }

    #[test]
    fn submission_signature_matches_direct_signature() {
        let segments = Arc::new(vec![Segment::new("a", 1.0)]);
        let params = RenderParams::default();
        let sub = RenderSubmission::new(RenderMode::Preview, Arc::clone(&segments), &params, None)
            .unwrap();
        assert_eq!(sub.signature, render_signature(&segments, &params).unwrap());
        assert!(sub.params.is_none());
    }

    #[test]
    fn queue_state_helpers() {
        let state = QueueState {
            running: Some((3, RenderMode::Full)),
            ..QueueState::default()
        };
        assert!(state.is_rendering());
        assert_eq!(state.running_mode(), Some(RenderMode::Full));
        assert!(!QueueState::default().is_rendering());
    }
}
