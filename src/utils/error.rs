use thiserror::Error;

#[derive(Error, Debug)]
pub enum KgError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Knowledge graph not found: {path}")]
    GraphNotFound { path: String },

    #[error("Concept '{key}' does not exist in the knowledge graph")]
    ConceptNotFound { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Data,
    Configuration,
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl KgError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KgError::ApiError(_) => ErrorCategory::Network,
            KgError::IoError(_) | KgError::ZipError(_) => ErrorCategory::Storage,
            KgError::CsvError(_)
            | KgError::SerializationError(_)
            | KgError::ProcessingError { .. }
            | KgError::ValidationError { .. } => ErrorCategory::Data,
            KgError::TomlError(_)
            | KgError::ConfigError { .. }
            | KgError::ConfigValidationError { .. }
            | KgError::InvalidConfigValueError { .. }
            | KgError::MissingConfigError { .. } => ErrorCategory::Configuration,
            KgError::GraphNotFound { .. } | KgError::ConceptNotFound { .. } => {
                ErrorCategory::Lookup
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            KgError::ApiError(_) => {
                "Check the network connection or rebuild with --fast to skip scraping".to_string()
            }
            KgError::IoError(_) | KgError::ZipError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            KgError::SerializationError(_) => {
                "The knowledge graph file looks corrupted, rebuild it with `dsa-kg build`"
                    .to_string()
            }
            KgError::CsvError(_) => "Check the export settings in the [export] section".to_string(),
            KgError::TomlError(_) | KgError::ConfigError { .. } => {
                "Check the TOML syntax of the configuration file".to_string()
            }
            KgError::ConfigValidationError { field, .. }
            | KgError::InvalidConfigValueError { field, .. }
            | KgError::MissingConfigError { field } => {
                format!("Fix the '{}' setting and try again", field)
            }
            KgError::ProcessingError { .. } | KgError::ValidationError { .. } => {
                "Re-run with --verbose to see which concept failed".to_string()
            }
            KgError::GraphNotFound { .. } => {
                "Build the graph first with `dsa-kg build` or pass --graph <FILE>".to_string()
            }
            KgError::ConceptNotFound { .. } => {
                "Use `dsa-kg search <query>` to find the exact concept key".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
            ErrorCategory::Data => format!("Knowledge graph data problem: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Lookup => self.to_string(),
        }
    }

    /// 依嚴重程度對應的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, KgError>;
