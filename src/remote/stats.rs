use super::*;
use crate::stats::{StatsSnapshot, StatsSource};

impl StatsSource for BackendClient {
    async fn fetch_statistics(&self) -> DeskResult<StatsSnapshot> {
        let resp = self
            .get("/statistics")
            .send()
            .await
            .map_err(|err| http_client::transport("fetch statistics", err))?;

        if !resp.status().is_success() {
            return Err(Self::error_from(resp, "fetch statistics").await);
        }

        resp.json()
            .await
            .map_err(|err| DeskError::Network(format!("parse statistics: {}", err)))
    }
}
