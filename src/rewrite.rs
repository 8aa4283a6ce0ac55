//! AI rewrite session: fetch a credential, ask for one rewrite, then apply or discard.
//!
//! There is no cancellation here. Dropping the controller simply stops anyone
//! from consuming the result.

use std::future::Future;

use crate::error::{DeskError, DeskResult};
use crate::model::{FileId, FileMutation, FileSnapshot};
use crate::remote::ChatMessage;
use crate::store::FileStore;

mod extract;
mod prompt;

pub use self::extract::{HeaderCheck, extract_code};
pub use self::prompt::rewrite_messages;

pub trait RewriteBackend: Send + Sync {
    fn fetch_credential(&self) -> impl Future<Output = DeskResult<String>> + Send;

    fn complete(
        &self,
        credential: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = DeskResult<String>> + Send;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteStatus {
    Idle,
    FetchingCredential,
    Rewriting,
    Ready,
    Error(DeskError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewritten {
    pub content: String,
    pub header: HeaderCheck,
}

pub struct RewriteController<B> {
    backend: B,
    credential: Option<String>,
    status: RewriteStatus,
    rewritten: Option<Rewritten>,
}

impl<B: RewriteBackend> RewriteController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            credential: None,
            status: RewriteStatus::Idle,
            rewritten: None,
        }
    }

    pub fn status(&self) -> &RewriteStatus {
        &self.status
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn rewritten(&self) -> Option<&Rewritten> {
        self.rewritten.as_ref()
    }

    pub async fn fetch_credential(&mut self) -> &RewriteStatus {
        self.status = RewriteStatus::FetchingCredential;
        match self.backend.fetch_credential().await {
            Ok(key) => {
                self.credential = Some(key);
                self.status = RewriteStatus::Idle;
            }
            Err(err) => {
                tracing::warn!(error = %err, "fetch AI credential");
                self.status = RewriteStatus::Error(err);
            }
        }
        &self.status
    }

    /// Send exactly one rewrite request for `file`.
    pub async fn rewrite(&mut self, file: &FileSnapshot) -> &RewriteStatus {
        let Some(credential) = self.credential.clone() else {
            self.status = RewriteStatus::Error(DeskError::MissingCredential);
            return &self.status;
        };

        self.rewritten = None;
        self.status = RewriteStatus::Rewriting;
        let messages = rewrite_messages(file);
        match self.backend.complete(&credential, &messages).await {
            Ok(text) => {
                let content = extract_code(&text).to_string();
                if content.trim().is_empty() {
                    tracing::warn!(file = %file.name, "AI rewrite came back empty");
                    self.status = RewriteStatus::Error(DeskError::Backend("empty rewrite".to_string()));
                    return &self.status;
                }
                let header = HeaderCheck::of(&content);
                if header == HeaderCheck::Altered {
                    tracing::warn!(file = %file.name, "rewritten code does not keep the required header");
                }
                self.rewritten = Some(Rewritten { content, header });
                self.status = RewriteStatus::Ready;
            }
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "AI rewrite");
                self.status = RewriteStatus::Error(err);
            }
        }
        &self.status
    }

    /// Drop the proposal and go back to idle. The credential is kept.
    pub fn discard(&mut self) -> DeskResult<()> {
        self.ensure_ready("discard")?;
        self.rewritten = None;
        self.status = RewriteStatus::Idle;
        Ok(())
    }

    /// Write the proposal into the store and end the session.
    ///
    /// Returns the mutation to mirror, or `None` when `id` is not the active file.
    pub fn apply(self, store: &mut FileStore, id: FileId) -> DeskResult<Option<FileMutation>> {
        self.ensure_ready("apply")?;
        let rewritten = self
            .rewritten
            .ok_or_else(|| DeskError::InvalidState("no rewritten content".to_string()))?;
        if rewritten.content.trim().is_empty() {
            return Err(DeskError::InvalidState("rewritten content is empty".to_string()));
        }
        store.update_file_content(id, &rewritten.content)
    }

    fn ensure_ready(&self, action: &str) -> DeskResult<()> {
        if self.status != RewriteStatus::Ready {
            return Err(DeskError::InvalidState(format!(
                "cannot {} a rewrite that is not ready",
                action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/rewrite_tests.rs"]
mod tests;
