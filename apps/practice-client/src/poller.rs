//! Background polling of a quiz's import job until it settles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use practice_core::{ImportProgress, ImportSource, ServiceError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Time source for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Upper bound on the whole poll, in-flight fetches included.
    pub timeout: Duration,
}

impl From<&ClientConfig> for PollConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        }
    }
}

/// How a poll ended. Each variant carries the last progress observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Settled(ImportProgress),
    TimedOut(Option<ImportProgress>),
    Stopped(Option<ImportProgress>),
}

impl PollOutcome {
    pub fn last_progress(&self) -> Option<&ImportProgress> {
        match self {
            Self::Settled(progress) => Some(progress),
            Self::TimedOut(progress) | Self::Stopped(progress) => progress.as_ref(),
        }
    }
}

/// Polls an [`ImportSource`] on a fixed interval.
pub struct ImportPoller<S, C = TokioClock> {
    source: Arc<S>,
    clock: Arc<C>,
    config: PollConfig,
}

impl<S, C> Clone for ImportPoller<S, C> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<S: ImportSource> ImportPoller<S, TokioClock> {
    pub fn new(source: S, config: PollConfig) -> Self {
        Self::with_clock(source, TokioClock, config)
    }
}

impl<S: ImportSource, C: Clock> ImportPoller<S, C> {
    pub fn with_clock(source: S, clock: C, config: PollConfig) -> Self {
        Self {
            source: Arc::new(source),
            clock: Arc::new(clock),
            config,
        }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Poll until the job is terminal, the timeout passes, or `stop` turns true.
    ///
    /// Fetch failures are logged and retried on the next tick. A closed
    /// `stop` channel counts as a stop request. Both the timeout and `stop`
    /// also cut off a fetch that is still in flight.
    pub async fn poll_until_settled<F>(
        &self,
        quiz_id: i64,
        mut stop: watch::Receiver<bool>,
        mut on_progress: F,
    ) -> PollOutcome
    where
        F: FnMut(&ImportProgress) + Send,
    {
        let started = self.clock.now();
        let mut last: Option<ImportProgress> = None;

        loop {
            if *stop.borrow() {
                return PollOutcome::Stopped(last);
            }
            let Some(remaining) = self.remaining(started) else {
                return self.timed_out(quiz_id, last);
            };

            let fetched = tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return PollOutcome::Stopped(last);
                    }
                    continue;
                }
                fetched = self.source.fetch_progress(quiz_id) => fetched,
                _ = self.clock.sleep(remaining) => return self.timed_out(quiz_id, last),
            };

            match fetched {
                Ok(progress) => {
                    tracing::debug!(quiz_id, status = %progress.status, "Import status polled");
                    on_progress(&progress);
                    if progress.is_terminal() {
                        tracing::info!(quiz_id, status = %progress.status, "Import settled");
                        return PollOutcome::Settled(progress);
                    }
                    last = Some(progress);
                }
                Err(e) => {
                    tracing::warn!(quiz_id, error = %e, "Failed to poll import status");
                }
            }

            let Some(remaining) = self.remaining(started) else {
                return self.timed_out(quiz_id, last);
            };
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return PollOutcome::Stopped(last);
                    }
                }
                _ = self.clock.sleep(self.config.interval.min(remaining)) => {}
            }
        }
    }

    /// Time left before the timeout, or `None` once it has passed.
    fn remaining(&self, started: Instant) -> Option<Duration> {
        let elapsed = self.clock.now().duration_since(started);
        self.config
            .timeout
            .checked_sub(elapsed)
            .filter(|left| !left.is_zero())
    }

    fn timed_out(&self, quiz_id: i64, last: Option<ImportProgress>) -> PollOutcome {
        tracing::warn!(quiz_id, timeout = ?self.config.timeout, "Import poll timed out");
        PollOutcome::TimedOut(last)
    }

    /// Ask the service to cancel the quiz's import job.
    ///
    /// A running poll observes the `cancelled` status on its next tick.
    pub async fn cancel_processing(&self, quiz_id: i64) -> std::result::Result<(), ServiceError> {
        self.source.cancel(quiz_id).await
    }
}

impl<S, C> ImportPoller<S, C>
where
    S: ImportSource + 'static,
    C: Clock + 'static,
{
    /// Run [`Self::poll_until_settled`] as a background task.
    ///
    /// Dropping the returned handle stops the task.
    pub fn spawn(&self, quiz_id: i64) -> PollHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (progress_tx, progress_rx) = watch::channel(None);
        let poller = self.clone();

        let task = tokio::spawn(async move {
            poller
                .poll_until_settled(quiz_id, stop_rx, |progress| {
                    progress_tx.send_replace(Some(progress.clone()));
                })
                .await
        });

        PollHandle {
            quiz_id,
            stop_tx,
            progress_rx,
            task,
        }
    }
}

/// Owner handle of a spawned poll.
pub struct PollHandle {
    quiz_id: i64,
    stop_tx: watch::Sender<bool>,
    progress_rx: watch::Receiver<Option<ImportProgress>>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    /// Latest progress observed by the task.
    pub fn progress(&self) -> Option<ImportProgress> {
        self.progress_rx.borrow().clone()
    }

    /// Receiver that is notified on every observed progress.
    pub fn subscribe(&self) -> watch::Receiver<Option<ImportProgress>> {
        self.progress_rx.clone()
    }

    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to end.
    pub async fn join(self) -> Result<PollOutcome> {
        self.task
            .await
            .map_err(|e| ClientError::Task(e.to_string()))
    }
}
