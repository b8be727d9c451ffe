use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaunchError {
    #[error("{0}")]
    MalformedRequest(String),

    #[error("unknown project: {project:?} (not in config and no Claude projects found in {root})")]
    UnresolvedProject { project: String, root: PathBuf },

    #[error("project selection cancelled for {project:?}")]
    SelectionCancelled { project: String },

    #[error("directory does not exist: {path}")]
    DirectoryVanished { path: PathBuf },

    #[error("invalid config at {path}: {reason}")]
    ConfigCorrupt { path: PathBuf, reason: String },

    #[error("config already exists at {path}")]
    ConfigExists { path: PathBuf },

    #[error("{0}")]
    TerminalUnavailable(String),

    #[error("cannot determine home directory")]
    HomeDirectoryNotFound,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClaunchError>;
