use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Trend generation failed: {message}")]
    GenerationError { message: String },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Discussion category not found: {name}")]
    CategoryNotFoundError { name: String },

    #[error("Platform API error: {message}")]
    PlatformError { message: String },
}

impl TrendError {
    pub fn generation(message: impl Into<String>) -> Self {
        TrendError::GenerationError {
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        TrendError::PlatformError {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        TrendError::AuthError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrendError>;
