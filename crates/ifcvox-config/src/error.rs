//! Errors of the slice service's `config.ron` handling.

/// Failure to load or persist the service configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("cannot read config.ron: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or `config.ron` could not be written.
    #[error("cannot write config.ron: {0}")]
    WriteError(#[source] std::io::Error),

    /// `config.ron` is not a valid service config.
    #[error("invalid config.ron: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("cannot serialize service config: {0}")]
    SerializeError(#[source] ron::Error),
}
