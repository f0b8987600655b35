use crate::connectors::ConnectorError;
use crate::session::SessionError;
use crate::stream::StreamError;

/// Failures of the `nexus-cli` commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to create async runtime: {0}")]
    Runtime(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
