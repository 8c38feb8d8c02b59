// src/poll/poll_loop.rs
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::payload::RawSamplePayload;
use super::source::PollSource;
use crate::chart::{ApplyOutcome, ColorChart, RenderBridge};
use crate::error::{SinkError, ValidationError};
use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Fetching,
    Applying,
    Failed,
}

/// What one poll cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Replaced(usize),
    Unchanged(usize),
    /// Fetched fine, but the columns did not line up.
    Rejected,
    Failed,
}

/// Snapshot published after every transition, for whoever draws the status bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStatus {
    pub state: PollState,
    pub cycles: u64,
    pub last_outcome: Option<CycleOutcome>,
    /// Set by a failed fetch, cleared by the next successful one.
    pub last_error: Option<String>,
}

/// Receives fetched payloads. `deliver` must not return until the payload
/// has been applied (or rejected), because the loop arms its next timer
/// right after.
#[async_trait]
pub trait PollSink: Send {
    async fn deliver(&mut self, payload: RawSamplePayload) -> Result<ApplyOutcome, SinkError>;
}

#[async_trait]
impl<R: RenderBridge + Send> PollSink for ColorChart<R> {
    async fn deliver(&mut self, payload: RawSamplePayload) -> Result<ApplyOutcome, SinkError> {
        Ok(self.apply_polled(payload)?)
    }
}

/// A payload on its way to the app loop, with the callback that releases
/// the poll loop once it has been applied.
#[derive(Debug)]
pub struct PollMessage {
    pub payload: RawSamplePayload,
    ack: oneshot::Sender<Result<ApplyOutcome, ValidationError>>,
}

impl PollMessage {
    pub fn complete(self, result: Result<ApplyOutcome, ValidationError>) {
        let _ = self.ack.send(result);
    }

    /// Apply to `chart` and acknowledge in one go.
    pub fn apply_to<R: RenderBridge>(self, chart: &mut ColorChart<R>) -> Result<ApplyOutcome, ValidationError> {
        let PollMessage { payload, ack } = self;
        let result = chart.apply_polled(payload);
        let _ = ack.send(result.clone());
        result
    }
}

/// Sink for when the chart lives in another task (the terminal app).
#[derive(Debug, Clone)]
pub struct ChartChannel {
    tx: mpsc::UnboundedSender<PollMessage>,
}

impl ChartChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PollMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl PollSink for ChartChannel {
    async fn deliver(&mut self, payload: RawSamplePayload) -> Result<ApplyOutcome, SinkError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(PollMessage { payload, ack })
            .map_err(|_| SinkError::Closed)?;

        match done.await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SinkError::Closed),
        }
    }
}

/// Fetch, apply or log, wait, repeat. Strictly one fetch at a time.
pub struct PollLoop<S: PollSource> {
    source: S,
    interval: Duration,
    status: watch::Sender<PollStatus>,
}

impl<S: PollSource> PollLoop<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        let (status, _) = watch::channel(PollStatus::default());
        Self { source, interval, status }
    }

    pub fn state(&self) -> PollState {
        self.status.borrow().state
    }

    pub fn status(&self) -> watch::Receiver<PollStatus> {
        self.status.subscribe()
    }

    fn set_state(&self, state: PollState) {
        self.status.send_modify(|s| s.state = state);
    }

    /// One full cycle. Only errors when the sink has gone away.
    pub async fn cycle<K: PollSink + ?Sized>(&mut self, sink: &mut K) -> Result<CycleOutcome, SinkError> {
        self.set_state(PollState::Fetching);

        let (outcome, error) = match self.source.fetch().await {
            Ok(payload) => {
                self.set_state(PollState::Applying);
                let fetched = payload.len();
                match sink.deliver(payload).await {
                    Ok(ApplyOutcome::Replaced(len)) => {
                        log_debug!("Buffer replaced with {} samples", len);
                        (CycleOutcome::Replaced(len), None)
                    }
                    Ok(ApplyOutcome::Unchanged(len)) => (CycleOutcome::Unchanged(len), None),
                    Err(SinkError::Validation(e)) => {
                        log_error!("Rejected payload of {} samples: {}", fetched, e);
                        (CycleOutcome::Rejected, None)
                    }
                    Err(SinkError::Closed) => {
                        self.set_state(PollState::Idle);
                        return Err(SinkError::Closed);
                    }
                }
            }
            Err(e) => {
                self.set_state(PollState::Failed);
                log_warn!("Fetch failed: {}", e);
                (CycleOutcome::Failed, Some(e.to_string()))
            }
        };

        self.status.send_modify(|s| {
            s.state = PollState::Idle;
            s.cycles += 1;
            s.last_outcome = Some(outcome);
            if outcome != CycleOutcome::Failed {
                s.last_error = None;
            } else {
                s.last_error = error;
            }
        });
        tracing::debug!(cycle = self.status.borrow().cycles, ?outcome, "poll cycle finished");
        Ok(outcome)
    }

    /// Run until `shutdown` flips to true (or its sender is dropped), or the
    /// sink goes away. The first cycle starts immediately; after that each
    /// cycle starts `interval` after the previous one finished.
    pub async fn run<K: PollSink + ?Sized>(&mut self, sink: &mut K, mut shutdown: watch::Receiver<bool>) {
        log_info!("Polling every {:?}", self.interval);
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                result = self.cycle(sink) => {
                    if result.is_err() {
                        log_info!("Chart closed, stopping poll loop");
                        break;
                    }
                }
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        self.set_state(PollState::Idle);
    }
}

impl<S: PollSource + 'static> PollLoop<S> {
    /// Move the loop and its sink into a task.
    pub fn spawn<K: PollSink + 'static>(mut self, mut sink: K) -> PollHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            self.run(&mut sink, shutdown_rx).await;
        });
        PollHandle { shutdown, task: Some(task) }
    }
}

/// Teardown handle for a spawned [`PollLoop`]. Dropping it aborts the task.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Ask the loop to stop. An in-flight fetch is abandoned.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
