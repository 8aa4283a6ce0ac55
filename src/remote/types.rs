//! DTOs for the runner API and the chat-completion endpoint.

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateExploitRequest<'a> {
    pub(super) service_name: &'a str,
    pub(super) file_name: &'a str,
    pub(super) code: &'a str,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct UpdateExploitResponse {
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ApiKeyResponse {
    #[serde(default, rename = "apiKey")]
    pub(super) api_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(super) struct ChatRequest<'a> {
    pub(super) model: &'a str,
    pub(super) messages: &'a [ChatMessage],
    pub(super) temperature: f32,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub(super) choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ChatChoice {
    pub(super) message: Option<ChatMessage>,
}
