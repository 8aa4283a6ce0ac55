use super::*;

impl BackendClient {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET against the runner API, bounded by the request timeout.
    pub(super) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).timeout(self.request_timeout)
    }

    /// POST against the runner API, bounded by the request timeout.
    pub(super) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).timeout(self.request_timeout)
    }

    /// Read a non-2xx reply and turn it into an error.
    ///
    /// A body carrying `{error}` is a structured backend error; anything else
    /// counts as a transport/parse failure.
    pub(super) async fn error_from(resp: reqwest::Response, label: &str) -> DeskError {
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(err) => return DeskError::Network(format!("{}: read body: {}", label, err)),
        };
        match error_message(&body) {
            Some(msg) => DeskError::Backend(msg),
            None => DeskError::Network(format!("{}: unexpected status {}", label, status)),
        }
    }
}

/// Pull a message out of `{"error": "..."}` or `{"error": {"message": "..."}}`.
pub(super) fn error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let err = v.get("error")?;
    if let Some(s) = err.as_str() {
        return Some(s.to_string());
    }
    err.get("message")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

pub(super) fn transport(label: &str, err: reqwest::Error) -> DeskError {
    if err.is_timeout() {
        DeskError::Timeout(format!("{}: {}", label, err))
    } else {
        DeskError::Network(format!("{}: {}", label, err))
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
