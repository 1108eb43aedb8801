use thiserror::Error;

/// Failures of the landed-cost allocation step. Any of these blocks the
/// result from being displayed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("no freight quote available for the consolidated shipment")]
    NoFreightQuote,

    #[error("item unit price is zero, item count cannot be reconstructed")]
    ZeroUnitPrice,

    #[error("manifest reconstructs to {reconstructed} items")]
    EmptyManifest { reconstructed: f64 },
}

#[derive(Error, Debug)]
pub enum LandedCostError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input for '{field}' ({value}): {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Tariff lookup unavailable: {message}")]
    LookupUnavailable { message: String },

    #[error("No freight quote for {shipment}")]
    NoFreightQuote { shipment: String },

    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Step '{required}' must complete first")]
    StageOutOfOrder { required: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    ExternalService,
    Calculation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for an error that stopped a command.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl LandedCostError {
    pub fn invalid_input(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::StageOutOfOrder { .. } => ErrorCategory::Input,
            Self::InvalidConfiguration { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ApiError(_) | Self::LookupUnavailable { .. } | Self::NoFreightQuote { .. } => {
                ErrorCategory::ExternalService
            }
            Self::Allocation(_) => ErrorCategory::Calculation,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the duty-rate path recovers this before it reaches the caller
            Self::LookupUnavailable { .. } | Self::ApiError(_) | Self::NoFreightQuote { .. } => {
                ErrorSeverity::Medium
            }
            Self::InvalidInput { .. }
            | Self::StageOutOfOrder { .. }
            | Self::InvalidConfiguration { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::Allocation(_) => ErrorSeverity::High,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => {
                "Check that every dimension, weight, price and quantity is greater than zero"
            }
            Self::StageOutOfOrder { .. } => "Run the earlier comparison steps first",
            Self::InvalidConfiguration { .. } => {
                "Use a larger master box or switch packing.oversize_policy to \"clamp\""
            }
            Self::LookupUnavailable { .. } => {
                "Verify the tariff tables, or set costs.duty_rate explicitly"
            }
            Self::ApiError(_) | Self::NoFreightQuote { .. } => {
                "Check the freight endpoint and API key, then retry the quotation step"
            }
            Self::Allocation(AllocationError::NoFreightQuote) => {
                "Obtain a consolidated freight quote before allocating costs"
            }
            Self::Allocation(_) => "Check the item unit price and the packing manifest",
            Self::ConfigValidationError { .. } | Self::MissingConfigError { .. } => {
                "Fix the configuration file and run again"
            }
            Self::CsvError(_) => "Check the tariff table files are valid CSV with headers",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) => "Report this as a bug",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason, .. } => {
                format!("Input '{}' is not valid: {}", field, reason)
            }
            Self::NoFreightQuote { shipment } => {
                format!("No carrier offered a price for the {}", shipment)
            }
            Self::Allocation(e) => format!("Could not compute the landed cost: {}", e),
            Self::ApiError(_) => "The freight quotation service could not be reached".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LandedCostError>;
