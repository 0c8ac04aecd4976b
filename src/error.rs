//! Error types for Dockhand

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockhandError {
    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("container '{0}' not found or not running")]
    ContainerNotRunning(String),

    #[error("remote host identification has changed; remove the stale known_hosts entry for the master node and retry")]
    HostKeyChanged,

    #[error("remote command failed: {command}\n{output}")]
    RemoteExecution { command: String, output: String },

    #[error("'{verb}' is not supported for container '{container}'")]
    UnsupportedVerb { verb: String, container: String },

    #[error("no SSH identity file configured; cannot install a public key")]
    IdentityMissing,

    #[error("failed to parse container config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DockhandError>;
