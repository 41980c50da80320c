mod build;
mod config;
mod error;
mod format;

pub use config::LogConfig;
pub use error::LogError;
pub use format::LogFormat;

/// Install the global tracing subscriber described by `cfg`.
pub fn init_logging(cfg: &LogConfig) -> Result<(), LogError> {
    match cfg.format {
        LogFormat::Text => build::text(cfg),
        LogFormat::Json => build::json(cfg),
        LogFormat::Journald => build::journald(cfg),
    }
}
