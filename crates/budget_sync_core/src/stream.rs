use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BatchError, ExtractError};

pub const EVENT_KIND_INSERT: &str = "INSERT";
pub const EVENT_KIND_MODIFY: &str = "MODIFY";
pub const EVENT_KIND_REMOVE: &str = "REMOVE";

pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A row image whose attributes stay undecoded until they are read, so an
/// attribute nobody looks at cannot fail the record.
pub type RowImage = BTreeMap<String, Value>;

/// A typed attribute as it appears in a change-stream row image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    Map(AttributeMap),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
}

impl AttributeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Binary(_) => "B",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::Map(_) => "M",
            Self::List(_) => "L",
            Self::StringSet(_) => "SS",
            Self::NumberSet(_) => "NS",
            Self::BinarySet(_) => "BS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            EVENT_KIND_INSERT => Self::Insert,
            EVENT_KIND_MODIFY => Self::Modify,
            EVENT_KIND_REMOVE => Self::Remove,
            other => Self::Other(other.to_string()),
        }
    }

    /// Only creations and modifications carry a value worth propagating.
    pub fn is_upsert(&self) -> bool {
        matches!(self, Self::Insert | Self::Modify)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Insert => EVENT_KIND_INSERT,
            Self::Modify => EVENT_KIND_MODIFY,
            Self::Remove => EVENT_KIND_REMOVE,
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowChange {
    #[serde(rename = "Keys", default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<RowImage>,
    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<RowImage>,
    #[serde(rename = "OldImage", default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<RowImage>,
    #[serde(
        rename = "SequenceNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sequence_number: Option<String>,
}

/// One entry of the `Records` array delivered by the change stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(
        rename = "eventSource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb: Option<RowChange>,
}

impl StreamRecord {
    pub fn from_value(value: &Value) -> Result<Self, ExtractError> {
        Self::deserialize(value).map_err(|error| ExtractError::MalformedRecord(error.to_string()))
    }

    /// A record without `eventName` is classified as an unnamed other kind.
    pub fn kind(&self) -> EventKind {
        EventKind::parse(self.event_name.as_deref().unwrap_or_default())
    }

    pub fn new_image(&self) -> Option<&RowImage> {
        self.dynamodb
            .as_ref()
            .and_then(|change| change.new_image.as_ref())
    }
}

/// Reads the kind of an undecoded record. A missing or non-string
/// `eventName` is an unnamed other kind.
pub fn raw_event_kind(record: &Value) -> EventKind {
    EventKind::parse(
        record
            .get("eventName")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    )
}

pub fn raw_event_id(record: &Value) -> Option<String> {
    record
        .get("eventID")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Decodes one attribute of a row image. `Ok(None)` means the attribute is
/// absent.
pub fn image_attribute(
    image: &RowImage,
    key: &str,
) -> Result<Option<AttributeValue>, ExtractError> {
    image
        .get(key)
        .map(|raw| {
            AttributeValue::deserialize(raw).map_err(|error| ExtractError::MalformedAttribute {
                key: key.to_string(),
                message: error.to_string(),
            })
        })
        .transpose()
}

/// Returns the raw `Records` entries of a stream batch so that each one can be
/// decoded independently.
pub fn batch_records(payload: &Value) -> Result<&[Value], BatchError> {
    payload
        .get("Records")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(BatchError::MissingRecords)
}
