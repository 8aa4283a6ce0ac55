use serde::{Deserialize, Serialize};

use crate::error::{DeskError, DeskResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeskConfig {
    pub version: u32,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub exec: ExecConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            version: 1,
            backend: BackendConfig::default(),
            ai: AiConfig::default(),
            exec: ExecConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl DeskConfig {
    pub fn validate(&self) -> DeskResult<()> {
        if self.version != 1 {
            return Err(DeskError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(DeskError::Config("backend.base_url is empty".to_string()));
        }
        if self.backend.request_timeout_ms == 0 {
            return Err(DeskError::Config(
                "backend.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.ai.request_timeout_ms == 0 {
            return Err(DeskError::Config(
                "ai.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.exec.validate()?;
        if self.stats.interval_secs == 0 {
            return Err(DeskError::Config(
                "stats.interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the exploit runner API, without trailing slash.
    pub base_url: String,

    /// Upper bound for every runner API call except `run-code`.
    #[serde(default = "default_backend_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337/api".to_string(),
            request_timeout_ms: default_backend_timeout_ms(),
        }
    }
}

fn default_backend_timeout_ms() -> u64 {
    10_000
}

fn default_ai_timeout_ms() -> u64 {
    60_000
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiConfig {
    /// Chat-completion endpoint.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,

    #[serde(default = "default_ai_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            request_timeout_ms: default_ai_timeout_ms(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecConfig {
    /// After this long a run is reported as timed out; the call stays open.
    pub soft_timeout_ms: u64,

    /// After this long the outstanding call is cancelled. Must exceed the soft timeout.
    pub hard_abort_ms: u64,

    /// Progress tick interval.
    pub tick_ms: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            soft_timeout_ms: 5_000,
            hard_abort_ms: 6_000,
            tick_ms: 100,
        }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> DeskResult<()> {
        if self.tick_ms == 0 {
            return Err(DeskError::Config(
                "exec.tick_ms must be greater than zero".to_string(),
            ));
        }
        if self.hard_abort_ms <= self.soft_timeout_ms {
            return Err(DeskError::Config(format!(
                "exec.hard_abort_ms ({}) must exceed exec.soft_timeout_ms ({})",
                self.hard_abort_ms, self.soft_timeout_ms
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsConfig {
    pub interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}
