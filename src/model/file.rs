use serde::{Deserialize, Serialize};

use super::ids::FileId;

pub const SCRIPT_SUFFIX: &str = ".py";

/// Lines every exploit must start with; the runner passes the target as argv[1].
pub const REQUIRED_HEADER: &str = "import requests\nimport sys\n\nhost=sys.argv[1]\n";

pub const MARKER_LINE: &str = "# ===== WRITE YOUR CODE BELOW THIS LINE =====";

pub const TEMPLATE: &str = "import requests\nimport sys\n\nhost=sys.argv[1]\n\n\
# =============================================\n\
# ===== WRITE YOUR CODE BELOW THIS LINE =====\n\
# =============================================\n\n\
# Example code (you can modify or replace this):\n\
# r = requests.get(f'http://{host}')\n\
# print(r.text)  # The output should contain the flag\n";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploitFile {
    pub id: FileId,
    pub name: String,
    pub service: String,
    pub content: String,
}

impl ExploitFile {
    pub fn snapshot(&self) -> FileSnapshot {
        FileSnapshot {
            name: self.name.clone(),
            service: self.service.clone(),
            content: self.content.clone(),
        }
    }

    /// Mirror payload for a create or update.
    pub fn upsert_mutation(&self) -> FileMutation {
        FileMutation {
            service: self.service.clone(),
            name: self.name.clone(),
            content: self.content.clone(),
        }
    }

    /// Mirror payload for a delete: empty content.
    pub fn delete_mutation(&self) -> FileMutation {
        FileMutation {
            service: self.service.clone(),
            name: self.name.clone(),
            content: String::new(),
        }
    }
}

/// Point-in-time copy of a file taken when a run or rewrite starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSnapshot {
    pub name: String,
    pub service: String,
    pub content: String,
}

/// One best-effort push to the remote mirror.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMutation {
    pub service: String,
    pub name: String,
    pub content: String,
}

impl FileMutation {
    pub fn is_delete(&self) -> bool {
        self.content.is_empty()
    }
}

/// Outcome of the last remote mirror attempt for a file. Session-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Synced,
    Pending,
    Failed(String),
}

pub fn canonical_name(name: &str) -> String {
    if name.ends_with(SCRIPT_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SCRIPT_SUFFIX)
    }
}

/// File name as the remote runner expects it: suffix stripped once.
pub fn remote_file_name(name: &str) -> &str {
    name.strip_suffix(SCRIPT_SUFFIX).unwrap_or(name)
}
