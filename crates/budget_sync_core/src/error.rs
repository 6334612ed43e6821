use thiserror::Error;

/// The invocation payload as a whole is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("stream payload must include a Records array")]
    MissingRecords,
}

/// Why a single stream record could not be turned into a budget update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("record is not a valid stream record: {0}")]
    MalformedRecord(String),

    #[error("attribute `{key}` is not a valid typed attribute: {message}")]
    MalformedAttribute { key: String, message: String },

    #[error("{0} record carries no new image")]
    MissingNewImage(String),

    #[error("new image has no `AccountId` attribute")]
    MissingAccountId,

    #[error("`AccountId` is invalid: {0}")]
    InvalidAccountId(String),

    #[error("new image has neither `BudgetValue` nor `Budget Value`")]
    MissingBudgetValue,

    #[error("budget attribute `{key}` has unsupported type {type_name}")]
    UnsupportedBudgetType { key: String, type_name: String },

    #[error("budget value `{0}` is not a non-negative integer")]
    NonNumericBudgetValue(String),
}

/// Terminal failure for one event. Never escapes the batch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to assume role `{role_arn}`: {message}")]
    AssumeRole { role_arn: String, message: String },

    #[error("failed to write parameter `{parameter}`: {message}")]
    ParameterWrite { parameter: String, message: String },
}

impl SyncError {
    /// Stable short code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Extract(ExtractError::MalformedRecord(_)) => "malformed_record",
            Self::Extract(ExtractError::MalformedAttribute { .. }) => "malformed_attribute",
            Self::Extract(ExtractError::MissingNewImage(_)) => "missing_new_image",
            Self::Extract(ExtractError::MissingAccountId) => "missing_account_id",
            Self::Extract(ExtractError::InvalidAccountId(_)) => "invalid_account_id",
            Self::Extract(ExtractError::MissingBudgetValue) => "missing_budget_value",
            Self::Extract(ExtractError::UnsupportedBudgetType { .. }) => "unsupported_budget_type",
            Self::Extract(ExtractError::NonNumericBudgetValue(_)) => "non_numeric_budget_value",
            Self::AssumeRole { .. } => "assume_role_failed",
            Self::ParameterWrite { .. } => "parameter_write_failed",
        }
    }
}
