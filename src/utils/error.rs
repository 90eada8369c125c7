use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatusError { url: String, status: u16 },

    #[error("Upstream unavailable for keyword '{keyword}': {source}")]
    UpstreamUnavailable {
        keyword: String,
        #[source]
        source: Box<FeedError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Validation,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn validation(message: impl Into<String>) -> Self {
        FeedError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::ApiError(_)
            | FeedError::UpstreamStatusError { .. }
            | FeedError::UpstreamUnavailable { .. } => ErrorCategory::Network,
            FeedError::ConfigError { .. }
            | FeedError::ConfigValidationError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::UrlError(_) => ErrorCategory::Configuration,
            FeedError::ValidationError { .. } => ErrorCategory::Validation,
            FeedError::SerializationError(_) => ErrorCategory::Data,
            FeedError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::ValidationError { message } => message.clone(),
            FeedError::UpstreamUnavailable { .. } => {
                "Failed to fetch data from PR TIMES API".to_string()
            }
            FeedError::ApiError(_) | FeedError::UpstreamStatusError { .. } => {
                "PR TIMES API request failed".to_string()
            }
            FeedError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            FeedError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "檢查網路連線或稍後重試 (check connectivity and retry later)",
            ErrorCategory::Configuration => "檢查設定檔與命令列參數 (check config file and flags)",
            ErrorCategory::Validation => "修正輸入參數後重試 (fix the request parameters)",
            ErrorCategory::Data => "上游回應格式可能已變更 (upstream response format may have changed)",
            ErrorCategory::System => "檢查檔案權限與磁碟空間 (check file permissions and disk space)",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
