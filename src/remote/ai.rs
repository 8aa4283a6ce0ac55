//! AI credential fetch and chat-completion call.

use super::*;
use crate::rewrite::RewriteBackend;

impl RewriteBackend for BackendClient {
    async fn fetch_credential(&self) -> DeskResult<String> {
        let resp = self
            .get("/ai-api-key")
            .send()
            .await
            .map_err(|err| http_client::transport("fetch AI key", err))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .text()
                .await
                .ok()
                .and_then(|body| http_client::error_message(&body))
                .unwrap_or_else(|| format!("status {}", status.as_u16()));
            return Err(DeskError::CredentialUnavailable(detail));
        }

        let body: ApiKeyResponse = resp
            .json()
            .await
            .map_err(|err| DeskError::Network(format!("parse AI key response: {}", err)))?;
        match body.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DeskError::CredentialUnavailable(
                "API key is not set on the server".to_string(),
            )),
        }
    }

    async fn complete(&self, credential: &str, messages: &[ChatMessage]) -> DeskResult<String> {
        let body = ChatRequest {
            model: &self.ai.model,
            messages,
            temperature: self.ai.temperature,
        };
        let resp = self
            .client
            .post(&self.ai.endpoint)
            .timeout(Duration::from_millis(self.ai.request_timeout_ms))
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await
            .map_err(|err| http_client::transport("AI rewrite", err))?;

        if !resp.status().is_success() {
            return Err(Self::error_from(resp, "AI rewrite").await);
        }

        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|err| DeskError::Network(format!("parse AI response: {}", err)))?;
        out.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| DeskError::Backend("no content in AI response".to_string()))
    }
}
