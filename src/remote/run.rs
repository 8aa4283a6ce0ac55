use super::*;
use crate::exec::{ExecBackend, HttpReply, RunCodeRequest, TransportError};

impl ExecBackend for BackendClient {
    async fn run_code(&self, request: &RunCodeRequest) -> Result<HttpReply, TransportError> {
        let resp = self
            .client
            .post(self.url("/run-code"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_error)?;
        Ok(HttpReply { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    TransportError {
        timed_out: err.is_timeout(),
        message: format!("run code: {}", err),
    }
}
