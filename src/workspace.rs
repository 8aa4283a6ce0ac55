use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::cache::{DirCache, write_atomic};
use crate::error::{DeskError, DeskResult};
use crate::exec::{ExecState, ExecTimeouts, ExecutionController};
use crate::model::{DeskConfig, ExploitFile, FileId, FileMutation, SyncStatus};
use crate::remote::BackendClient;
use crate::rewrite::RewriteController;
use crate::stats::StatsPoller;
use crate::store::FileStore;

mod file_ops;
mod requests;
mod root_lifecycle;

const DESK_DIR: &str = ".sploitdesk";

/// The operations a front end drives: files, services, runs, rewrites, statistics.
pub struct Workspace {
    pub root: PathBuf,
    pub config: DeskConfig,
    pub store: FileStore,
    client: BackendClient,
}

/// Result of a best-effort mirror. A warning never means the local change was undone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub warning: Option<DeskError>,
}

impl MirrorReport {
    pub fn is_clean(&self) -> bool {
        self.warning.is_none()
    }
}

impl Workspace {
    pub fn desk_dir(root: &Path) -> PathBuf {
        root.join(DESK_DIR)
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }
}
