mod config;
mod file;
mod ids;

pub use self::config::{AiConfig, BackendConfig, DeskConfig, ExecConfig, StatsConfig};
pub use self::file::{
    ExploitFile, FileMutation, FileSnapshot, MARKER_LINE, REQUIRED_HEADER, SCRIPT_SUFFIX,
    SyncStatus, TEMPLATE, canonical_name, remote_file_name,
};
pub use self::ids::FileId;
