#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use sploitdesk::model::DeskConfig;
use sploitdesk::workspace::Workspace;

#[derive(Clone, Debug)]
pub enum RunMode {
    Output(String),
    Timeout,
    Crash { output: String, error: String },
    Hang,
}

pub struct Stub {
    pub services: Mutex<Option<Vec<String>>>,
    pub reject_updates: Mutex<bool>,
    pub updates: Mutex<Vec<Value>>,
    pub run_mode: Mutex<RunMode>,
    pub run_calls: Mutex<Vec<Value>>,
    pub api_key: Mutex<Option<String>>,
    pub ai_reply: Mutex<String>,
    pub ai_calls: Mutex<Vec<(Option<String>, Value)>>,
    pub stats: Mutex<Value>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            services: Mutex::new(Some(vec!["Service 1".to_string(), "Service 2".to_string()])),
            reject_updates: Mutex::new(false),
            updates: Mutex::new(Vec::new()),
            run_mode: Mutex::new(RunMode::Output("flag{ok}\n".to_string())),
            run_calls: Mutex::new(Vec::new()),
            api_key: Mutex::new(Some("sk-test".to_string())),
            ai_reply: Mutex::new(String::new()),
            ai_calls: Mutex::new(Vec::new()),
            stats: Mutex::new(json!({ "flagStats": [], "events": [], "totalFlags": 0 })),
        }
    }
}

pub struct StubGuard {
    pub base_url: String,
    pub stub: Arc<Stub>,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for StubGuard {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub async fn spawn_stub() -> Result<StubGuard> {
    let stub = Arc::new(Stub::default());
    let app = Router::new()
        .route("/api/services", get(services))
        .route("/api/update-exploit", post(update_exploit))
        .route("/api/run-code", post(run_code))
        .route("/api/ai-api-key", get(ai_api_key))
        .route("/api/statistics", get(statistics))
        .route("/v1/chat/completions", post(chat))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind stub listener")?;
    let addr = listener.local_addr().context("stub local addr")?;
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(StubGuard {
        base_url: format!("http://{}", addr),
        stub,
        server,
    })
}

/// A listener that accepts connections and never answers.
pub struct SilentGuard {
    pub base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for SilentGuard {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub async fn spawn_silent() -> Result<SilentGuard> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind silent listener")?;
    let addr = listener.local_addr().context("silent local addr")?;
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Ok(SilentGuard {
        base_url: format!("http://{}", addr),
        server,
    })
}

/// Config pointing at the stub, with short run timeouts.
pub fn stub_config(guard: &StubGuard) -> DeskConfig {
    let mut cfg = DeskConfig::default();
    cfg.backend.base_url = format!("{}/api", guard.base_url);
    cfg.ai.endpoint = format!("{}/v1/chat/completions", guard.base_url);
    cfg.exec.soft_timeout_ms = 300;
    cfg.exec.hard_abort_ms = 600;
    cfg.exec.tick_ms = 50;
    cfg
}

pub fn init_workspace(guard: &StubGuard) -> Result<(tempfile::TempDir, Workspace)> {
    let dir = tempfile::tempdir().context("create workspace tempdir")?;
    let ws = Workspace::init_with_config(dir.path(), stub_config(guard), false)?;
    Ok((dir, ws))
}

async fn services(State(stub): State<Arc<Stub>>) -> (StatusCode, Json<Value>) {
    match stub.services.lock().expect("lock").clone() {
        Some(list) => (StatusCode::OK, Json(json!(list))),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "services unavailable" })),
        ),
    }
}

async fn update_exploit(
    State(stub): State<Arc<Stub>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if *stub.reject_updates.lock().expect("lock") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "disk full" })),
        );
    }
    stub.updates.lock().expect("lock").push(body);
    (StatusCode::OK, Json(json!({ "message": "Exploit updated" })))
}

async fn run_code(
    State(stub): State<Arc<Stub>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.run_calls.lock().expect("lock").push(body);
    let mode = stub.run_mode.lock().expect("lock").clone();
    match mode {
        RunMode::Output(output) => (StatusCode::OK, Json(json!({ "output": output }))),
        RunMode::Timeout => (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Execution timed out" })),
        ),
        RunMode::Crash { output, error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "output": output, "error": error })),
        ),
        RunMode::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            (StatusCode::OK, Json(json!({ "output": "too late" })))
        }
    }
}

async fn ai_api_key(State(stub): State<Arc<Stub>>) -> (StatusCode, Json<Value>) {
    match stub.api_key.lock().expect("lock").clone() {
        Some(key) => (StatusCode::OK, Json(json!({ "apiKey": key }))),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to get API key" })),
        ),
    }
}

async fn statistics(State(stub): State<Arc<Stub>>) -> Json<Value> {
    Json(stub.stats.lock().expect("lock").clone())
}

async fn chat(
    State(stub): State<Arc<Stub>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let auth = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.ai_calls.lock().expect("lock").push((auth, body));
    let reply = stub.ai_reply.lock().expect("lock").clone();
    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] }))
}
