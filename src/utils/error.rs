use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {endpoint}")]
    ApiStatusError { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Could not parse {path}: {message}")]
    ConfigParseError { path: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Config,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::ApiError(_) | FeedError::ApiStatusError { .. } => ErrorCategory::Network,
            FeedError::IoError(_) => ErrorCategory::Storage,
            FeedError::SerializationError(_) => ErrorCategory::Data,
            FeedError::ConfigParseError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FeedError::ApiError(_) => ErrorSeverity::Medium,
            // 5xx is worth retrying; 4xx means the request itself is wrong.
            FeedError::ApiStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            FeedError::ApiStatusError { .. } => ErrorSeverity::High,
            FeedError::IoError(_) => ErrorSeverity::Critical,
            FeedError::SerializationError(_) => ErrorSeverity::High,
            FeedError::ConfigParseError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FeedError::ApiError(_) => "Check that the API server is reachable and try again",
            FeedError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Pass a valid --token for endpoints that require authentication"
            }
            FeedError::ApiStatusError { status, .. } if *status >= 500 => {
                "The server had a problem; retry in a few moments"
            }
            FeedError::ApiStatusError { .. } => {
                "Verify the --api-endpoint and the requested resource id"
            }
            FeedError::IoError(_) => "Check that the storage path exists and is writable",
            FeedError::SerializationError(_) => {
                "The payload did not match the expected JSON shape; check the API version"
            }
            FeedError::ConfigParseError { .. } => "Fix the syntax in the weights file and retry",
            FeedError::MissingConfigError { .. } | FeedError::InvalidConfigValueError { .. } => {
                "Run with --help to see the expected configuration values"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::ApiError(_) => "Could not reach the events API".to_string(),
            FeedError::ApiStatusError { endpoint, status } => {
                format!("The API rejected the request ({status}) at {endpoint}")
            }
            FeedError::IoError(_) => "Could not read or write local data".to_string(),
            FeedError::SerializationError(_) => "Received data in an unexpected format".to_string(),
            FeedError::ConfigParseError { path, .. } => {
                format!("The weights file {path} could not be parsed")
            }
            FeedError::MissingConfigError { field } => format!("Missing configuration: {field}"),
            FeedError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {field}: {reason}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_to_config_category() {
        let err = FeedError::MissingConfigError {
            field: "api_endpoint".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_server_status_is_retryable() {
        let err = FeedError::ApiStatusError {
            endpoint: "http://test/events".to_string(),
            status: 503,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_auth_status_suggests_token() {
        let err = FeedError::ApiStatusError {
            endpoint: "http://test/favorites/all".to_string(),
            status: 401,
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("--token"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = FeedError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
