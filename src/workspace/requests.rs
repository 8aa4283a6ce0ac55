//! Service refresh, runs, rewrites and statistics.

use super::*;

impl Workspace {
    /// Pull the service list. When the remote is unreachable the cached list stays as is.
    pub async fn refresh_services(&mut self) -> MirrorReport {
        match self.client.pull_services().await {
            Ok(services) => {
                tracing::debug!(count = services.len(), "services refreshed");
                self.store.refresh_services(services);
                MirrorReport::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, cached = self.store.list_services().len(), "using cached services");
                MirrorReport { warning: Some(err) }
            }
        }
    }

    pub fn execution_controller(&self) -> DeskResult<ExecutionController<BackendClient>> {
        let timeouts = ExecTimeouts::from_config(&self.config.exec)?;
        Ok(ExecutionController::new(self.client.clone(), timeouts))
    }

    /// Run a file against `host` on a fresh controller.
    pub async fn run_file(&self, id: FileId, host: &str) -> DeskResult<ExecState> {
        let file = self
            .store
            .file(id)
            .ok_or_else(|| DeskError::InvalidInput(format!("no file with id {}", id)))?;
        let controller = self.execution_controller()?;
        Ok(controller.run(file.snapshot(), host).await)
    }

    pub fn rewrite_session(&self) -> RewriteController<BackendClient> {
        RewriteController::new(self.client.clone())
    }

    /// Apply a ready rewrite to the active file `id` and mirror it.
    pub async fn apply_rewrite(
        &mut self,
        session: RewriteController<BackendClient>,
        id: FileId,
    ) -> DeskResult<MirrorReport> {
        if self.store.active_id() != Some(id) {
            return Err(DeskError::InvalidState(format!(
                "file {} is not the active file",
                id
            )));
        }
        match session.apply(&mut self.store, id)? {
            Some(mutation) => Ok(self.mirror(Some(id), mutation).await),
            None => Err(DeskError::InvalidState(format!("file {} not found", id))),
        }
    }

    pub fn stats_poller(&self) -> StatsPoller<BackendClient> {
        StatsPoller::new(self.client.clone())
    }
}
