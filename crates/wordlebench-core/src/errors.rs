use std::fmt;

/// Startup failure: bad config file, unreadable prompts or word list.
#[derive(Debug, Clone)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// True when `err` (or anything in its chain) is a [`ConfigError`].
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<ConfigError>().is_some())
}
