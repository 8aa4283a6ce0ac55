//! File mutations: local store first, then a best-effort remote mirror.

use super::*;

impl Workspace {
    pub fn select_file(&mut self, id: FileId) -> bool {
        self.store.select_file(id)
    }

    /// Create a file under `service`, or under the remembered default service.
    pub async fn create_file(
        &mut self,
        name: &str,
        service: Option<&str>,
    ) -> DeskResult<(ExploitFile, MirrorReport)> {
        let service = service
            .map(str::to_string)
            .unwrap_or_else(|| self.store.default_service().to_string());
        let (file, mutation) = self.store.create_file(name, &service)?;
        self.store.set_default_service(&service);
        let report = self.mirror(Some(file.id), mutation).await;
        Ok((file, report))
    }

    /// Replace the content of the active file. `Ok(None)` when `id` is not active.
    pub async fn edit_file(
        &mut self,
        id: FileId,
        content: &str,
    ) -> DeskResult<Option<MirrorReport>> {
        let Some(mutation) = self.store.update_file_content(id, content)? else {
            return Ok(None);
        };
        Ok(Some(self.mirror(Some(id), mutation).await))
    }

    pub async fn delete_file(&mut self, id: FileId) -> Option<MirrorReport> {
        let mutation = self.store.delete_file(id)?;
        Some(self.mirror(None, mutation).await)
    }

    /// Re-push files whose last mirror attempt failed in this session.
    pub async fn retry_failed_syncs(&mut self) -> Vec<(FileId, MirrorReport)> {
        let ids = self.store.failed_syncs();
        self.push_files(ids).await
    }

    /// Push the current content of every file.
    pub async fn push_all(&mut self) -> Vec<(FileId, MirrorReport)> {
        let ids: Vec<FileId> = self.store.list_files().iter().map(|f| f.id).collect();
        self.push_files(ids).await
    }

    async fn push_files(&mut self, ids: Vec<FileId>) -> Vec<(FileId, MirrorReport)> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(mutation) = self.store.file(id).map(ExploitFile::upsert_mutation) else {
                continue;
            };
            self.store.mark_sync(id, SyncStatus::Pending);
            let report = self.mirror(Some(id), mutation).await;
            out.push((id, report));
        }
        out
    }

    pub(super) async fn mirror(&mut self, id: Option<FileId>, mutation: FileMutation) -> MirrorReport {
        // Empty code deletes on the remote; only a removed file may send it.
        if let Some(id) = id
            && mutation.is_delete()
        {
            let err = DeskError::InvalidInput(format!(
                "{} has no content; not mirrored",
                mutation.name
            ));
            tracing::warn!(service = %mutation.service, file = %mutation.name, "skip mirror of empty file");
            self.store.mark_sync(id, SyncStatus::Failed(err.to_string()));
            return MirrorReport { warning: Some(err) };
        }
        match self.client.push_file_mutation(&mutation).await {
            Ok(_) => {
                if let Some(id) = id {
                    self.store.mark_sync(id, SyncStatus::Synced);
                }
                MirrorReport::default()
            }
            Err(err) => {
                tracing::warn!(
                    service = %mutation.service,
                    file = %mutation.name,
                    delete = mutation.is_delete(),
                    error = %err,
                    "mirror to remote failed; local change kept"
                );
                if let Some(id) = id {
                    self.store.mark_sync(id, SyncStatus::Failed(err.to_string()));
                }
                MirrorReport { warning: Some(err) }
            }
        }
    }
}
