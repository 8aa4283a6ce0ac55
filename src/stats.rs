//! Capture statistics, polled on a fixed interval.
//!
//! A failed poll keeps the last snapshot; the poller never surfaces an error.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::DeskResult;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagStat {
    pub ip: String,
    pub service: String,
    pub flags: u64,
    #[serde(default)]
    pub last_capture: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub service: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub flag_stats: Vec<FlagStat>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<StatsEvent>,
    #[serde(default)]
    pub total_flags: u64,
}

fn null_as_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

pub trait StatsSource: Send + Sync {
    fn fetch_statistics(&self) -> impl Future<Output = DeskResult<StatsSnapshot>> + Send;
}

pub struct StatsPoller<S> {
    source: S,
    last: StatsSnapshot,
    last_update: Option<OffsetDateTime>,
    failures: u64,
}

impl<S: StatsSource> StatsPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last: StatsSnapshot::default(),
            last_update: None,
            failures: 0,
        }
    }

    pub fn snapshot(&self) -> &StatsSnapshot {
        &self.last
    }

    /// Time of the last successful poll.
    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.last_update
    }

    /// Consecutive failed polls since the last success.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub async fn poll_once(&mut self) -> &StatsSnapshot {
        match self.source.fetch_statistics().await {
            Ok(snapshot) => {
                self.last = snapshot;
                self.last_update = Some(OffsetDateTime::now_utc());
                self.failures = 0;
            }
            Err(err) => {
                self.failures += 1;
                tracing::warn!(error = %err, failures = self.failures, "poll statistics; keeping last values");
            }
        }
        &self.last
    }

    /// Poll forever on `interval`, handing every snapshot to `on_update`.
    pub async fn run(&mut self, interval: Duration, mut on_update: impl FnMut(&StatsSnapshot)) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let snapshot = self.poll_once().await;
            on_update(snapshot);
        }
    }
}

#[cfg(test)]
#[path = "tests/stats_tests.rs"]
mod tests;
