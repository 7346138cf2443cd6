use std::path::PathBuf;

/// Rejected raw slider input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel value is empty")]
    Empty,

    #[error("channel value is not a number: {0:?}")]
    NotANumber(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid {channel} value: {source}")]
    Channel {
        channel: &'static str,
        #[source]
        source: ChannelError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid log level {0:?}")]
    LogLevel(String),
}
