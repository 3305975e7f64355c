use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FarmError {
    pub fn validation(message: impl Into<String>) -> Self {
        FarmError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FarmError::ValidationError { .. } => ErrorCategory::Input,
            FarmError::ApiError(_) => ErrorCategory::Network,
            FarmError::IoError(_)
            | FarmError::SerializationError(_)
            | FarmError::CsvError(_)
            | FarmError::ZipError(_) => ErrorCategory::Storage,
            FarmError::ConfigError { .. }
            | FarmError::ConfigValidationError { .. }
            | FarmError::InvalidConfigValueError { .. }
            | FarmError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Critical,
            ErrorCategory::Configuration => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FarmError::ValidationError { .. } => {
                "Provide a non-empty farm name and at least 3 boundary points"
            }
            FarmError::ApiError(_) => "Check network connectivity and the inference API token",
            FarmError::IoError(_) => "Check that the output path exists and is writable",
            FarmError::SerializationError(_) => "Check that the boundary file is valid JSON",
            FarmError::CsvError(_) | FarmError::ZipError(_) => {
                "Retry the export into an empty output directory"
            }
            FarmError::ConfigError { .. }
            | FarmError::ConfigValidationError { .. }
            | FarmError::InvalidConfigValueError { .. }
            | FarmError::MissingConfigError { .. } => {
                "Review the configuration file and command line arguments"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FarmError::ValidationError { message } => format!("Invalid input: {}", message),
            FarmError::ApiError(_) => "Could not reach the prediction service".to_string(),
            FarmError::IoError(e) => format!("File operation failed: {}", e),
            FarmError::SerializationError(e) => format!("Malformed JSON: {}", e),
            FarmError::CsvError(_) | FarmError::ZipError(_) => {
                "Failed to write the export archive".to_string()
            }
            FarmError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FarmError>;
