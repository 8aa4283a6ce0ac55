//! Lifecycle of a single "run this file against this host" request.
//!
//! A run races the backend call against two clocks: the soft timeout reports a
//! timeout while leaving the call open, the hard abort drops (cancels) it. Every
//! state write carries the run's epoch so a stale timer or a late reply can
//! never overwrite a newer or terminal state.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, DeskResult};
use crate::model::ExecConfig;

mod classify;
mod controller;

pub use self::classify::{TIMEOUT_STATUS, classify_reply};
pub use self::controller::ExecutionController;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCodeRequest {
    pub code: String,
    pub ip_address: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RunCodeResponse {
    #[serde(default)]
    pub output: String,

    #[serde(default)]
    pub error: Option<String>,
}

/// Raw HTTP reply; classification happens in the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure (connect, read, client-side deadline).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    pub timed_out: bool,
    pub message: String,
}

pub trait ExecBackend: Send + Sync {
    fn run_code(
        &self,
        request: &RunCodeRequest,
    ) -> impl Future<Output = Result<HttpReply, TransportError>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecTimeouts {
    soft: Duration,
    hard: Duration,
    tick: Duration,
}

impl ExecTimeouts {
    pub fn new(soft: Duration, hard: Duration, tick: Duration) -> DeskResult<Self> {
        if hard <= soft {
            return Err(DeskError::Config(format!(
                "hard abort ({:?}) must exceed soft timeout ({:?})",
                hard, soft
            )));
        }
        if tick.is_zero() {
            return Err(DeskError::Config("tick interval must be non-zero".to_string()));
        }
        Ok(Self { soft, hard, tick })
    }

    pub fn from_config(cfg: &ExecConfig) -> DeskResult<Self> {
        Self::new(
            Duration::from_millis(cfg.soft_timeout_ms),
            Duration::from_millis(cfg.hard_abort_ms),
            Duration::from_millis(cfg.tick_ms),
        )
    }

    pub fn soft(&self) -> Duration {
        self.soft
    }

    pub fn hard(&self) -> Duration {
        self.hard
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl Default for ExecTimeouts {
    fn default() -> Self {
        Self {
            soft: Duration::from_secs(5),
            hard: Duration::from_secs(6),
            tick: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecStatus {
    Idle,
    Running,
    SoftTimeout,
    Succeeded,
    Failed,
    Aborted,
}

impl ExecStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecStatus::Idle | ExecStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecStatus::Idle => "idle",
            ExecStatus::Running => "running",
            ExecStatus::SoftTimeout => "soft-timeout",
            ExecStatus::Succeeded => "succeeded",
            ExecStatus::Failed => "failed",
            ExecStatus::Aborted => "aborted",
        }
    }
}

/// Observable state of the current run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecState {
    pub status: ExecStatus,
    pub host: String,
    pub elapsed: Duration,
    pub output: String,
    /// Error text reported by the backend alongside a successful run.
    pub error: Option<String>,
    /// Classification of a failed, timed-out or aborted run.
    pub failure: Option<DeskError>,
}

impl ExecState {
    pub fn idle() -> Self {
        Self {
            status: ExecStatus::Idle,
            host: String::new(),
            elapsed: Duration::ZERO,
            output: String::new(),
            error: None,
            failure: None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.failure.as_ref().is_some_and(DeskError::is_timeout)
    }
}

/// What a resolved call turns into, before it is stamped with host/elapsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub status: ExecStatus,
    pub output: String,
    pub error: Option<String>,
    pub failure: Option<DeskError>,
}

impl Outcome {
    pub fn failed(failure: DeskError) -> Self {
        Self {
            status: ExecStatus::Failed,
            output: String::new(),
            error: None,
            failure: Some(failure),
        }
    }

    pub(crate) fn into_state(self, host: &str, elapsed: Duration) -> ExecState {
        ExecState {
            status: self.status,
            host: host.to_string(),
            elapsed,
            output: self.output,
            error: self.error,
            failure: self.failure,
        }
    }
}
