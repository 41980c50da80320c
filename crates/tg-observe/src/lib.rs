mod logger;
pub use logger::{LogConfig, LogError, LogFormat, init_logging};
