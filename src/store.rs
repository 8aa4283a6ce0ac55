//! In-memory file/service collections, mirrored to a [`KvCache`] on every mutation.
//!
//! Mutations run to completion synchronously. Invariant violations are rejected
//! before anything changes; cache writes are best-effort and only logged.

use std::collections::{HashMap, HashSet};

use crate::cache::{KvCache, MemoryCache};
use crate::error::{DeskError, DeskResult};
use crate::model::{ExploitFile, FileId, FileMutation, SyncStatus, TEMPLATE, canonical_name};

pub const KEY_FILES: &str = "files";
pub const KEY_ACTIVE_FILE: &str = "activeFileId";
pub const KEY_SERVICES: &str = "services";
pub const KEY_NEW_SERVICE: &str = "newServiceName";

pub struct FileStore {
    files: Vec<ExploitFile>,
    services: Vec<String>,
    active: Option<FileId>,
    default_service: String,
    sync: HashMap<FileId, SyncStatus>,
    last_id: Option<FileId>,
    cache: Box<dyn KvCache>,
}

impl FileStore {
    /// Load every collection from the cache once. Unreadable values become empty defaults.
    pub fn hydrate(cache: Box<dyn KvCache>) -> Self {
        let files = dedupe_files(read_json(cache.as_ref(), KEY_FILES).unwrap_or_default());
        let services: Vec<String> = read_json(cache.as_ref(), KEY_SERVICES).unwrap_or_default();
        let default_service = cache.get(KEY_NEW_SERVICE).unwrap_or_default();

        let mut active = cache
            .get(KEY_ACTIVE_FILE)
            .and_then(|raw| match raw.parse::<FileId>() {
                Ok(id) => Some(id),
                Err(err) => {
                    tracing::warn!(raw = %raw, error = %err, "ignore malformed active file id");
                    None
                }
            });
        if let Some(id) = active
            && !files.iter().any(|f| f.id == id)
        {
            tracing::debug!(%id, "cached active file no longer exists");
            active = None;
        }

        let last_id = files.iter().map(|f| f.id).max();
        tracing::debug!(
            files = files.len(),
            services = services.len(),
            "hydrated file store"
        );
        Self {
            files,
            services,
            active,
            default_service,
            sync: HashMap::new(),
            last_id,
            cache,
        }
    }

    pub fn in_memory() -> Self {
        Self::hydrate(Box::new(MemoryCache::new()))
    }

    pub fn list_files(&self) -> &[ExploitFile] {
        &self.files
    }

    pub fn list_services(&self) -> &[String] {
        &self.services
    }

    pub fn file(&self, id: FileId) -> Option<&ExploitFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    pub fn active_file(&self) -> Option<&ExploitFile> {
        self.active.and_then(|id| self.file(id))
    }

    /// Service preselected for the next `create_file`.
    pub fn default_service(&self) -> &str {
        &self.default_service
    }

    pub fn set_default_service(&mut self, service: &str) {
        if self.default_service == service {
            return;
        }
        self.default_service = service.to_string();
        self.persist_default_service();
    }

    pub fn sync_status(&self, id: FileId) -> SyncStatus {
        self.sync.get(&id).cloned().unwrap_or_default()
    }

    pub fn mark_sync(&mut self, id: FileId, status: SyncStatus) {
        if self.file(id).is_some() {
            self.sync.insert(id, status);
        }
    }

    pub fn failed_syncs(&self) -> Vec<FileId> {
        self.files
            .iter()
            .filter(|f| matches!(self.sync.get(&f.id), Some(SyncStatus::Failed(_))))
            .map(|f| f.id)
            .collect()
    }

    pub fn create_file(
        &mut self,
        name: &str,
        service: &str,
    ) -> DeskResult<(ExploitFile, FileMutation)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::InvalidInput("file name is required".to_string()));
        }
        let service = service.trim();
        if service.is_empty() {
            return Err(DeskError::MissingService);
        }

        let name = canonical_name(name);
        let lowered = name.to_lowercase();
        if self
            .files
            .iter()
            .any(|f| f.service == service && f.name.to_lowercase() == lowered)
        {
            return Err(DeskError::DuplicateFile {
                name,
                service: service.to_string(),
            });
        }

        let id = FileId::fresh(self.last_id);
        self.last_id = Some(id);
        let file = ExploitFile {
            id,
            name,
            service: service.to_string(),
            content: TEMPLATE.to_string(),
        };
        self.files.push(file.clone());
        self.active = Some(id);
        self.sync.insert(id, SyncStatus::Pending);

        self.persist_files();
        self.persist_active();
        let mutation = file.upsert_mutation();
        Ok((file, mutation))
    }

    /// Replace the active file's content. Any other id is ignored (`Ok(None)`).
    ///
    /// Blank content is rejected: the runner reads empty code as a delete.
    pub fn update_file_content(
        &mut self,
        id: FileId,
        content: &str,
    ) -> DeskResult<Option<FileMutation>> {
        if self.active != Some(id) {
            tracing::debug!(%id, "ignore content update for inactive file");
            return Ok(None);
        }
        if content.trim().is_empty() {
            return Err(DeskError::InvalidInput(
                "file content must not be empty".to_string(),
            ));
        }
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        file.content = content.to_string();
        let mutation = file.upsert_mutation();
        self.sync.insert(id, SyncStatus::Pending);
        self.persist_files();
        Ok(Some(mutation))
    }

    pub fn delete_file(&mut self, id: FileId) -> Option<FileMutation> {
        let idx = self.files.iter().position(|f| f.id == id)?;
        let removed = self.files.remove(idx);
        self.sync.remove(&id);

        if self.active == Some(id) || self.files.is_empty() {
            self.active = self.files.first().map(|f| f.id);
        }

        self.persist_files();
        self.persist_active();
        Some(removed.delete_mutation())
    }

    pub fn select_file(&mut self, id: FileId) -> bool {
        if self.file(id).is_none() {
            return false;
        }
        if self.active != Some(id) {
            self.active = Some(id);
            self.persist_active();
        }
        true
    }

    /// Adopt the remote service list and re-resolve the default service.
    pub fn refresh_services(&mut self, services: Vec<String>) {
        if let Some(first) = services.first()
            && !services.iter().any(|s| s == &self.default_service)
        {
            self.default_service = first.clone();
            self.persist_default_service();
        }
        self.services = services;
        self.persist_services();
    }

    fn persist_files(&self) {
        write_json(self.cache.as_ref(), KEY_FILES, &self.files);
    }

    fn persist_active(&self) {
        let res = match self.active {
            Some(id) => self.cache.set(KEY_ACTIVE_FILE, &id.to_string()),
            None => self.cache.remove(KEY_ACTIVE_FILE),
        };
        if let Err(err) = res {
            tracing::warn!(error = %format!("{:#}", err), "persist active file");
        }
    }

    fn persist_services(&self) {
        write_json(self.cache.as_ref(), KEY_SERVICES, &self.services);
    }

    fn persist_default_service(&self) {
        if let Err(err) = self.cache.set(KEY_NEW_SERVICE, &self.default_service) {
            tracing::warn!(error = %format!("{:#}", err), "persist default service");
        }
    }
}

/// Keep the first file of every (service, case-folded name) pair.
fn dedupe_files(files: Vec<ExploitFile>) -> Vec<ExploitFile> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(files.len());
    for file in files {
        if seen.insert((file.service.clone(), file.name.to_lowercase())) {
            kept.push(file);
        } else {
            tracing::warn!(
                id = %file.id,
                name = %file.name,
                service = %file.service,
                "drop cached duplicate file"
            );
        }
    }
    kept
}

fn read_json<T: serde::de::DeserializeOwned>(cache: &dyn KvCache, key: &str) -> Option<T> {
    let raw = cache.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(key, error = %err, "discard unparseable cache entry");
            None
        }
    }
}

fn write_json<T: serde::Serialize + ?Sized>(cache: &dyn KvCache, key: &str, value: &T) {
    let res = serde_json::to_string(value)
        .map_err(anyhow::Error::from)
        .and_then(|raw| cache.set(key, &raw));
    if let Err(err) = res {
        tracing::warn!(key, error = %format!("{:#}", err), "persist cache entry");
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
