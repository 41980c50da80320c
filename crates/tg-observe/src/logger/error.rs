use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),
    #[error("Journald is not supported on this platform or feature disabled")]
    JournaldNotSupported,
    #[error("Logging has been already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
