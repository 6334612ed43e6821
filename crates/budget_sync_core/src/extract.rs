use thiserror::Error;

use crate::error::ExtractError;
use crate::stream::{image_attribute, AttributeValue, EventKind, RowImage, StreamRecord};

pub const ACCOUNT_ID_KEY: &str = "AccountId";
pub const BUDGET_VALUE_KEY: &str = "BudgetValue";
/// Display-style name written by older producers of the budget table.
pub const LEGACY_BUDGET_VALUE_KEY: &str = "Budget Value";

/// The value to write into one spoke account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetUpdate {
    pub account_id: String,
    pub budget_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("record has no event kind")]
    MissingEventKind,

    #[error("event kind {0} is not propagated")]
    UnsupportedEventKind(String),
}

impl SkipReason {
    pub fn for_kind(kind: &EventKind) -> Self {
        match kind.as_str() {
            "" => Self::MissingEventKind,
            name => Self::UnsupportedEventKind(name.to_string()),
        }
    }
}

/// What to do with one stream record, decided without touching any remote
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPlan {
    Write(BudgetUpdate),
    Skip(SkipReason),
    Reject {
        account_id: Option<String>,
        error: ExtractError,
    },
}

pub fn plan_record(record: &StreamRecord) -> RecordPlan {
    let kind = record.kind();
    if !kind.is_upsert() {
        return RecordPlan::Skip(SkipReason::for_kind(&kind));
    }

    let Some(image) = record.new_image() else {
        return RecordPlan::Reject {
            account_id: None,
            error: ExtractError::MissingNewImage(kind.as_str().to_string()),
        };
    };

    let account_id = match extract_account_id(image) {
        Ok(value) => value,
        Err(error) => {
            return RecordPlan::Reject {
                account_id: None,
                error,
            }
        }
    };

    match extract_budget_value(image) {
        Ok(budget_value) => RecordPlan::Write(BudgetUpdate {
            account_id,
            budget_value,
        }),
        Err(error) => RecordPlan::Reject {
            account_id: Some(account_id),
            error,
        },
    }
}

/// The id goes into a role ARN verbatim, so blank values and values carrying
/// whitespace are rejected rather than trimmed.
pub fn extract_account_id(image: &RowImage) -> Result<String, ExtractError> {
    match image_attribute(image, ACCOUNT_ID_KEY)? {
        None => Err(ExtractError::MissingAccountId),
        Some(AttributeValue::String(text)) if text.trim().is_empty() => {
            Err(ExtractError::InvalidAccountId("value is blank".to_string()))
        }
        Some(AttributeValue::String(text)) if text.chars().any(char::is_whitespace) => Err(
            ExtractError::InvalidAccountId(format!("value `{text}` contains whitespace")),
        ),
        Some(AttributeValue::String(text)) => Ok(text),
        Some(other) => Err(ExtractError::InvalidAccountId(format!(
            "expected a string attribute, found {}",
            other.type_name()
        ))),
    }
}

/// Looks up the canonical budget key first and falls back to the legacy alias
/// only when the canonical key is absent.
pub fn extract_budget_value(image: &RowImage) -> Result<String, ExtractError> {
    let key = [BUDGET_VALUE_KEY, LEGACY_BUDGET_VALUE_KEY]
        .into_iter()
        .find(|key| image.contains_key(*key))
        .ok_or(ExtractError::MissingBudgetValue)?;

    let text = match image_attribute(image, key)? {
        Some(AttributeValue::Number(text) | AttributeValue::String(text)) => text,
        Some(other) => {
            return Err(ExtractError::UnsupportedBudgetType {
                key: key.to_string(),
                type_name: other.type_name().to_string(),
            })
        }
        None => return Err(ExtractError::MissingBudgetValue),
    };

    if is_non_negative_integer(&text) {
        Ok(text)
    } else {
        Err(ExtractError::NonNumericBudgetValue(text))
    }
}

fn is_non_negative_integer(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}
