use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timed out after {seconds}s")]
    TimeoutError { seconds: u64 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency { code: String },

    #[error("Cannot format non-finite amount")]
    NonFiniteAmount,

    #[error("Currency detection failed: {message}")]
    DetectionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Validation,
    Currency,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StorefrontError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_)
            | Self::ApiError { .. }
            | Self::TimeoutError { .. }
            | Self::DetectionError { .. } => ErrorCategory::Network,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::UnsupportedCurrency { .. } | Self::NonFiniteAmount => ErrorCategory::Currency,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::UrlError(_) => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // currency problems degrade to a fallback display
            ErrorCategory::Currency => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Transport failures, timeouts, 5xx and 429 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::TimeoutError { .. } => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// The request never left the client, so repeating it cannot duplicate
    /// work on the server.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::HttpError(e) if e.is_connect())
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) | Self::TimeoutError { .. } => {
                "Could not reach the marketplace. Please check your connection.".to_string()
            }
            Self::ApiError { status: 401, .. } | Self::ApiError { status: 403, .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::ApiError { status: 404, .. } => "The requested item was not found.".to_string(),
            Self::ApiError { message, .. } => format!("The marketplace rejected the request: {}", message),
            Self::ValidationError { field, message } => format!("{}: {}", field, message),
            Self::UnsupportedCurrency { code } => format!("Currency {} is not supported", code),
            Self::DetectionError { .. } => "Could not detect your currency.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Retry in a moment; previously loaded data is still shown",
            ErrorCategory::Validation => "Correct the highlighted field and submit again",
            ErrorCategory::Currency => "Choose a supported currency",
            ErrorCategory::Configuration => "Check the configuration file and CLI flags",
            ErrorCategory::Storage => "Check that the storage directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
