use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use archive_core::TaskState;
use engine_logging::{job_error, job_warn, JobLogger};

use crate::{JobEvent, JobReport};

/// Receives progress from the worker. Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: JobEvent);
}

/// Forwards events into a channel the caller owns. Once the caller drops the
/// receiver, events are discarded.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<JobEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<JobEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: JobEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: JobEvent) {}
}

/// Called once on the worker with the terminal report.
pub type CompletionCallback = Box<dyn FnOnce(&JobReport) + Send + 'static>;

/// Cooperative stop flag. Setting it never interrupts a fetch or a write;
/// the worker notices it before the next page.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) fn emit_guarded(sink: &dyn ProgressSink, event: JobEvent, logger: &JobLogger) {
    if catch_unwind(AssertUnwindSafe(|| sink.emit(event))).is_err() {
        job_warn!(logger, "Progress observer failed; ignoring");
    }
}

/// Caller-side handle of the single background worker running a job.
pub struct JobHandle {
    stop: StopHandle,
    done_rx: mpsc::Receiver<JobReport>,
    worker: Option<JoinHandle<()>>,
    state: TaskState,
    report: Option<JobReport>,
}

impl JobHandle {
    /// Starts `work` on a dedicated thread. The completion callback runs on
    /// that thread after `work` returns; a panicking callback is logged and
    /// does not change the report.
    pub(crate) fn spawn<W>(
        stop: StopHandle,
        logger: JobLogger,
        on_complete: Option<CompletionCallback>,
        work: W,
    ) -> io::Result<Self>
    where
        W: FnOnce() -> JobReport + Send + 'static,
    {
        let (done_tx, done_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("archive-worker".into())
            .spawn(move || {
                let report = work();
                if let Some(callback) = on_complete {
                    if catch_unwind(AssertUnwindSafe(|| callback(&report))).is_err() {
                        job_error!(logger, "Completion callback failed; job result unaffected");
                    }
                }
                logger.flush();
                let _ = done_tx.send(report);
            })?;

        let state = TaskState::Idle
            .advance(TaskState::Running)
            .unwrap_or(TaskState::Running);
        Ok(Self {
            stop,
            done_rx,
            worker: Some(worker),
            state,
            report: None,
        })
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn report(&self) -> Option<&JobReport> {
        self.report.as_ref()
    }

    /// Requests a stop, then waits up to `timeout` (forever with `None`)
    /// for the worker to finish. Returns `None` if it is still running.
    pub fn join(&mut self, timeout: Option<Duration>) -> Option<&JobReport> {
        self.stop.request_stop();
        self.wait(timeout)
    }

    /// Waits like [`JobHandle::join`] without requesting a stop.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Option<&JobReport> {
        if self.report.is_none() {
            let received = match timeout {
                Some(timeout) => match self.done_rx.recv_timeout(timeout) {
                    Ok(report) => Some(report),
                    Err(mpsc::RecvTimeoutError::Timeout) => return None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => None,
                },
                None => self.done_rx.recv().ok(),
            };
            // A closed channel without a report means the worker panicked.
            let report = received.unwrap_or_else(|| JobReport {
                state: TaskState::Failed,
                error: Some("worker exited without a report".into()),
                ..JobReport::default()
            });
            self.settle(report);
        }
        self.report.as_ref()
    }

    fn settle(&mut self, report: JobReport) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.state = self.state.advance(report.state).unwrap_or(report.state);
        self.report = Some(report);
    }
}

impl Drop for JobHandle {
    /// A dropped handle leaves the worker to finish on its own, stopping at
    /// the next page boundary.
    fn drop(&mut self) {
        if self.report.is_none() {
            self.stop.request_stop();
        }
    }
}
