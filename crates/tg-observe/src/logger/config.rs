use crate::logger::format::LogFormat;

/// Environment variables consulted by [`LogConfig::from_env`].
const ENV_FORMAT: &str = "TG_LOG_FORMAT";
const ENV_LEVEL: &str = "TG_LOG";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// An `EnvFilter` directive string, e.g. `"info"` or `"tg_core=debug"`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || atty::is(atty::Stream::Stdout);
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}

impl LogConfig {
    /// Build a config from `TG_LOG_FORMAT` and `TG_LOG`, falling back to
    /// the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(format) = std::env::var(ENV_FORMAT)
            && let Ok(parsed) = format.parse::<LogFormat>()
        {
            cfg.format = parsed;
        }
        if let Ok(level) = std::env::var(ENV_LEVEL) {
            cfg.level = level;
        }
        cfg
    }
}
