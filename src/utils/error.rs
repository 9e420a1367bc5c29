use thiserror::Error;

#[derive(Error, Debug)]
pub enum DutyError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("HTS code {code} not found.")]
    NotFoundError { code: String },

    #[error("{message}")]
    ExtractionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Lookup,
    Input,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DutyError {
    pub fn config(message: impl Into<String>) -> Self {
        DutyError::ConfigError {
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        DutyError::NotFoundError { code: code.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DutyError::ConfigError { .. }
            | DutyError::InvalidConfigValueError { .. }
            | DutyError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            DutyError::NotFoundError { .. } => ErrorCategory::Lookup,
            DutyError::ExtractionError { .. } => ErrorCategory::Input,
            DutyError::CsvError(_) | DutyError::IoError(_) | DutyError::SerializationError(_) => {
                ErrorCategory::Io
            }
        }
    }

    /// Configuration and source problems abort startup; per-request errors are recoverable.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Lookup => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::Medium,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DutyError::ConfigError { .. } => {
                "Check that the tariff directory exists and holds CSV files with an 'HTS_Code' or 'HTS Number' column and a 'Duty' or '*Rate*' column".to_string()
            }
            DutyError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration file or command line", field)
            }
            DutyError::ConfigValidationError { field, .. } => {
                format!("Review the '{}' section of the configuration file", field)
            }
            DutyError::NotFoundError { .. } => {
                "Verify the HTS code, including every dot and trailing digit, against the loaded schedule".to_string()
            }
            DutyError::ExtractionError { .. } => {
                "Include at least 'HTS code <code>' and 'cost $<amount>' in the query".to_string()
            }
            DutyError::CsvError(_) => "Make sure every tariff file is well-formed CSV/TSV with a header row".to_string(),
            DutyError::IoError(_) => "Check file paths and permissions".to_string(),
            DutyError::SerializationError(_) => "Retry with the text output format".to_string(),
        }
    }

    /// Message suitable for end users; the natural-language front door prefixes it with a marker.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DutyError::NotFoundError { .. } | DutyError::ExtractionError { .. } => self.to_string(),
            DutyError::ConfigError { message } => format!("Tariff data could not be loaded: {}", message),
            DutyError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            DutyError::ConfigValidationError { message, .. } => message.clone(),
            DutyError::CsvError(e) => format!("A tariff file could not be parsed: {}", e),
            DutyError::IoError(e) => format!("File access failed: {}", e),
            DutyError::SerializationError(e) => format!("Output could not be rendered: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DutyError>;
