use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem operation that was running when a storage failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Create,
    Append,
    Sample,
    Rename,
    Clean,
    Persist,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageOp::Create => "create",
            StorageOp::Append => "append",
            StorageOp::Sample => "sample",
            StorageOp::Rename => "rename",
            StorageOp::Clean => "clean",
            StorageOp::Persist => "persist",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("configuration error: {}: {reason}", .path.display())]
    Configuration { path: PathBuf, reason: String },

    #[error("invalid option --{name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("storage error: {op} {}: {source}", .path.display())]
    Storage {
        op: StorageOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("index serialization error: {0}")]
    Index(#[from] serde_json::Error),
}

impl ClusterError {
    pub fn storage(op: StorageOp, path: impl AsRef<Path>, source: io::Error) -> Self {
        ClusterError::Storage { op, path: path.as_ref().to_path_buf(), source }
    }

    pub fn configuration(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        ClusterError::Configuration { path: path.as_ref().to_path_buf(), reason: reason.into() }
    }

    /// True for failures raised before ingestion starts.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ClusterError::Configuration { .. } | ClusterError::InvalidOption { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
