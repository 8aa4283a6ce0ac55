use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::model::FileSnapshot;

pub struct ExecutionController<B> {
    backend: B,
    timeouts: ExecTimeouts,
    epoch: AtomicU64,
    disposed: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
    state: watch::Sender<ExecState>,
}

impl<B: ExecBackend> ExecutionController<B> {
    pub fn new(backend: B, timeouts: ExecTimeouts) -> Self {
        let (state, _) = watch::channel(ExecState::idle());
        Self {
            backend,
            timeouts,
            epoch: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            cancel: Mutex::new(None),
            state,
        }
    }

    pub fn timeouts(&self) -> ExecTimeouts {
        self.timeouts
    }

    pub fn state(&self) -> ExecState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecState> {
        self.state.subscribe()
    }

    /// Run `file` against `host` and return the state the run settled in.
    ///
    /// Returns once the call resolved or was cancelled; a soft timeout is
    /// published to subscribers as soon as it fires.
    pub async fn run(&self, file: FileSnapshot, host: &str) -> ExecState {
        if self.disposed.load(Ordering::SeqCst) {
            return self.state();
        }
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let host = host.trim().to_string();

        if host.is_empty() {
            let failed = Outcome::failed(DeskError::InvalidInput(
                "target host is required".to_string(),
            ));
            self.publish(epoch, |_| Some(failed.into_state("", Duration::ZERO)));
            return self.state();
        }

        let token = CancellationToken::new();
        if let Ok(mut guard) = self.cancel.lock() {
            if let Some(previous) = guard.replace(token.clone()) {
                previous.cancel();
            }
        }

        tracing::debug!(file = %file.name, service = %file.service, host = %host, "run started");
        let started = Instant::now();
        let request = RunCodeRequest {
            code: file.content,
            ip_address: host.clone(),
        };
        let mut running = ExecState::idle();
        running.status = ExecStatus::Running;
        running.host = host.clone();
        self.publish(epoch, |_| Some(running));

        let call = self.backend.run_code(&request);
        tokio::pin!(call);
        let soft = tokio::time::sleep(self.timeouts.soft);
        tokio::pin!(soft);
        let hard = tokio::time::sleep(self.timeouts.hard);
        tokio::pin!(hard);
        let mut ticker = tokio::time::interval(self.timeouts.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut soft_fired = false;

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    tracing::debug!(host = %host, "run cancelled");
                    let elapsed = started.elapsed();
                    self.publish_if_running(epoch, || {
                        Outcome::failed(DeskError::Cancelled).into_state(&host, elapsed)
                    }, ExecStatus::Aborted);
                    break;
                }

                _ = &mut hard => {
                    tracing::warn!(host = %host, after = ?self.timeouts.hard, "run aborted");
                    let elapsed = started.elapsed();
                    self.publish_if_running(epoch, || {
                        Outcome::failed(timeout_error(self.timeouts.hard)).into_state(&host, elapsed)
                    }, ExecStatus::Aborted);
                    break;
                }

                _ = &mut soft, if !soft_fired => {
                    soft_fired = true;
                    tracing::debug!(host = %host, after = ?self.timeouts.soft, "soft timeout");
                    let elapsed = started.elapsed();
                    self.publish_if_running(epoch, || {
                        Outcome::failed(timeout_error(self.timeouts.soft)).into_state(&host, elapsed)
                    }, ExecStatus::SoftTimeout);
                }

                reply = &mut call => {
                    let elapsed = started.elapsed();
                    let outcome = classify_reply(reply);
                    let status = outcome.status;
                    if !self.publish_if_running(epoch, || outcome.into_state(&host, elapsed), status) {
                        tracing::debug!(host = %host, "late reply ignored");
                    }
                    break;
                }

                _ = ticker.tick(), if !soft_fired => {
                    let elapsed = started.elapsed();
                    self.publish(epoch, |s| {
                        (s.status == ExecStatus::Running).then(|| ExecState { elapsed, ..s.clone() })
                    });
                }
            }
        }

        if let Ok(mut guard) = self.cancel.lock() {
            *guard = None;
        }
        self.state()
    }

    /// Cancel the running request. No-op when nothing is running.
    pub fn cancel(&self) {
        if let Ok(guard) = self.cancel.lock()
            && let Some(token) = guard.as_ref()
        {
            token.cancel();
        }
    }

    /// Stop reacting to anything still in flight. The state is frozen from here on.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel();
    }

    fn publish_if_running(
        &self,
        epoch: u64,
        next: impl FnOnce() -> ExecState,
        status: ExecStatus,
    ) -> bool {
        self.publish(epoch, |s| {
            (s.status == ExecStatus::Running).then(|| ExecState { status, ..next() })
        })
    }

    fn publish(&self, epoch: u64, update: impl FnOnce(&ExecState) -> Option<ExecState>) -> bool {
        if self.disposed.load(Ordering::SeqCst) || self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        self.state.send_if_modified(|current| match update(current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        })
    }
}

fn timeout_error(after: Duration) -> DeskError {
    DeskError::Timeout(format!(
        "no result after {:.1}s",
        after.as_secs_f64()
    ))
}

impl<B> Drop for ExecutionController<B> {
    fn drop(&mut self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Ok(guard) = self.cancel.lock()
            && let Some(token) = guard.as_ref()
        {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "../tests/exec/controller_tests.rs"]
mod tests;
