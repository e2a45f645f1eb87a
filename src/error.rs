use thiserror::Error;

/// Motion tracker error types
#[derive(Error, Debug)]
pub enum MotionTrackerError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Degenerate orientation: {0}")]
    Orientation(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for tracker operations
pub type TrackResult<T> = Result<T, MotionTrackerError>;

/// Shorthand for rejecting a configuration value.
pub(crate) fn invalid_config<T>(message: impl Into<String>) -> TrackResult<T> {
    Err(MotionTrackerError::Configuration(message.into()))
}
