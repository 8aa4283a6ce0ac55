use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::{DeskError, DeskResult};
use crate::model::{AiConfig, BackendConfig};

mod http_client;

mod types;
pub use self::types::*;
mod ai;
mod run;
mod stats;
mod sync;

/// HTTP client for the exploit runner API and the AI completion endpoint.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    request_timeout: Duration,
    ai: AiConfig,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(backend: &BackendConfig, ai: &AiConfig) -> Result<Self> {
        let request_timeout = Duration::from_millis(backend.request_timeout_ms);
        let client = reqwest::Client::builder()
            .user_agent("sploitdesk")
            .connect_timeout(request_timeout)
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            request_timeout,
            ai: ai.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
