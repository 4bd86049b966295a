use thiserror::Error;

#[derive(Error, Debug)]
pub enum NutritionError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Pattern compilation error: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Storage error in namespace '{namespace}': {message}")]
    StorageError { namespace: String, message: String },

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
    Network,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NutritionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::StorageError { .. } => ErrorCategory::Storage,
            Self::SerializationError(_) | Self::PatternError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            Self::UrlError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一商品抓取失敗不影響整批
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorSeverity::Medium,
            Self::SerializationError(_) => ErrorSeverity::Low,
            Self::StorageError { .. } | Self::ProcessingError { .. } => ErrorSeverity::Medium,
            Self::IoError(_) => ErrorSeverity::High,
            Self::UrlError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::PatternError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if let Self::ProcessingError { .. } = self {
            return "Make sure the URL points to a product listing page";
        }
        match self.category() {
            ErrorCategory::Network => "Check the network connection and the product page URL, then retry",
            ErrorCategory::Storage => "Check that the cache directory exists and is writable, or run with --clear-cache",
            ErrorCategory::Data => "The stored data looks corrupted; clearing the cache usually helps",
            ErrorCategory::Configuration => "Review the configuration file and command-line arguments",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => {
                format!("Could not download a page: {}", self)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Setting '{}' is required but was not provided", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NutritionError>;
