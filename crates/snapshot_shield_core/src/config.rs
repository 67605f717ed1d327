use serde::{Deserialize, Serialize};

pub const DEFAULT_RETENTION_COUNT: usize = 30;
pub const DEFAULT_WAIT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_WAIT_MAX_ATTEMPTS: usize = 60;

// Fixed-interval, bounded-attempt polling. No backoff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval_secs: u64,
    pub max_attempts: usize,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_WAIT_INTERVAL_SECS,
            max_attempts: DEFAULT_WAIT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    // Unrecognized values fall back to the informational default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("error") => Self::Error,
            Some(value) if value.eq_ignore_ascii_case("debug") => Self::Debug,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub source_instance_id: String,
    pub retention_count: usize,
    pub wait: WaitPolicy,
    pub log_level: LogLevel,
}

impl LifecycleConfig {
    pub fn for_instance(source_instance_id: impl Into<String>) -> Self {
        Self {
            source_instance_id: source_instance_id.into(),
            retention_count: DEFAULT_RETENTION_COUNT,
            wait: WaitPolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn normalize_config(config: LifecycleConfig) -> Result<LifecycleConfig, ValidationError> {
    let source_instance_id = config.source_instance_id.trim().to_string();
    if source_instance_id.is_empty() {
        return Err(ValidationError::new("source_instance_id cannot be empty"));
    }

    if config.retention_count == 0 {
        return Err(ValidationError::new(
            "retention_count must be a positive integer",
        ));
    }

    if config.wait.interval_secs == 0 {
        return Err(ValidationError::new(
            "wait.interval_secs must be a positive integer",
        ));
    }

    if config.wait.max_attempts == 0 {
        return Err(ValidationError::new(
            "wait.max_attempts must be a positive integer",
        ));
    }

    Ok(LifecycleConfig {
        source_instance_id,
        ..config
    })
}
