use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog service returned {status}: {message}")]
    ServiceStatus { status: u16, message: String },

    #[error("Invalid catalog record: {reason}")]
    InvalidRecord { reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("You can compare at most {capacity} universities")]
    ComparisonFull { capacity: usize },

    #[error("Search session is closed")]
    SessionClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Recoverable user-facing condition, state is unchanged.
    Low,
    /// Transient failure, the next edit issues a fresh query.
    Medium,
    /// Bad input or configuration.
    High,
    Critical,
}

impl FinderError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FinderError::ComparisonFull { .. } => ErrorSeverity::Low,
            FinderError::Api(_)
            | FinderError::ServiceStatus { .. }
            | FinderError::InvalidRecord { .. }
            | FinderError::Serialization(_) => ErrorSeverity::Medium,
            FinderError::Config { .. }
            | FinderError::InvalidConfigValue { .. }
            | FinderError::Validation { .. } => ErrorSeverity::High,
            FinderError::Io(_) | FinderError::SessionClosed => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FinderError::Api(_) => "Network error. Please try again.".to_string(),
            FinderError::ServiceStatus { message, .. } => format!("Error: {}", message),
            FinderError::ComparisonFull { capacity } => {
                format!("You can compare maximum {} universities!", capacity)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FinderError::Api(_) => "Check that the catalog service is reachable",
            FinderError::ServiceStatus { .. } => "Retry later or adjust the filters",
            FinderError::InvalidRecord { .. } | FinderError::Serialization(_) => {
                "The catalog service returned unexpected data"
            }
            FinderError::Config { .. }
            | FinderError::InvalidConfigValue { .. } => "Fix the configuration file or CLI flags",
            FinderError::Validation { .. } => "Correct the highlighted fields and resubmit",
            FinderError::ComparisonFull { .. } => "Remove a university from the comparison first",
            FinderError::Io(_) => "Check file permissions and paths",
            FinderError::SessionClosed => "Start a new search session",
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
