//! Service list pull and file mirror push.

use super::*;
use crate::model::{FileMutation, remote_file_name};

impl BackendClient {
    /// Fetch the canonical, ordered service list. Any failure is `Unavailable`.
    pub async fn pull_services(&self) -> DeskResult<Vec<String>> {
        let resp = self
            .get("/services")
            .send()
            .await
            .map_err(|err| DeskError::Unavailable(format!("list services: {}", err)))?;

        if !resp.status().is_success() {
            return Err(DeskError::Unavailable(format!(
                "list services: status {}",
                resp.status()
            )));
        }

        let services: Option<Vec<String>> = resp
            .json()
            .await
            .map_err(|err| DeskError::Unavailable(format!("parse services: {}", err)))?;
        // The runner answers `null` when it has no services configured.
        Ok(services.unwrap_or_default())
    }

    /// Mirror one create/update (non-empty content) or delete (empty content).
    pub async fn push_file_mutation(&self, mutation: &FileMutation) -> DeskResult<String> {
        let body = UpdateExploitRequest {
            service_name: &mutation.service,
            file_name: remote_file_name(&mutation.name),
            code: &mutation.content,
        };
        let resp = self
            .post("/update-exploit")
            .json(&body)
            .send()
            .await
            .map_err(|err| http_client::transport("update exploit", err))?;

        if !resp.status().is_success() {
            return Err(Self::error_from(resp, "update exploit").await);
        }

        let out: UpdateExploitResponse = resp
            .json()
            .await
            .map_err(|err| DeskError::Network(format!("parse update exploit response: {}", err)))?;
        tracing::debug!(
            service = %mutation.service,
            file = %mutation.name,
            delete = mutation.is_delete(),
            message = %out.message,
            "mirrored file"
        );
        Ok(out.message)
    }
}
