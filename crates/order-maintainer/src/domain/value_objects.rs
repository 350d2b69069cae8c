//! Value objects for Order Maintenance
//!
//! Identifiers, ranks and field names are parsed once at the boundary and
//! carried as validated newtypes from then on.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Name of the identifier field in stored documents.
pub const ID_FIELD: &str = "_id";

/// Accepted shape of record identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    /// Exactly 24 hexadecimal characters.
    #[default]
    ObjectId,
    /// Any non-empty key without whitespace, up to `MAX_OPAQUE_ID_LEN` bytes.
    Opaque,
}

impl IdFormat {
    /// Longest accepted opaque key.
    pub const MAX_OPAQUE_ID_LEN: usize = 128;

    const OBJECT_ID_LEN: usize = 24;

    /// Check a raw identifier against this format.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            IdFormat::ObjectId => {
                raw.len() == Self::OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
            }
            IdFormat::Opaque => {
                !raw.is_empty()
                    && raw.len() <= Self::MAX_OPAQUE_ID_LEN
                    && !raw.chars().any(char::is_whitespace)
            }
        }
    }
}

impl std::str::FromStr for IdFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "object_id" | "objectid" => Ok(IdFormat::ObjectId),
            "opaque" => Ok(IdFormat::Opaque),
            other => Err(format!("unknown id format: {other}")),
        }
    }
}

/// Collection-scoped record identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Parse an identifier, enforcing `format`.
    pub fn parse(raw: &str, format: IdFormat) -> Result<Self, ValidationError> {
        if format.matches(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidRecordId {
                value: raw.to_string(),
                format,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A requested rank. Always `>= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rank(i64);

impl Rank {
    /// The first slot of every partition.
    pub const FIRST: Rank = Rank(1);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(ValidationError::BelowMinimum {
                field: "rank",
                value,
                min: 1,
            })
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Rank {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rank::new(value)
    }
}

impl From<Rank> for i64 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of the integer field holding the rank (`order`, `sequence`, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderField(String);

impl OrderField {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("must be a non-empty string")
        } else if name.starts_with('$') {
            Some("must not start with '$'")
        } else if name.contains('.') {
            Some("must not contain '.'")
        } else if name == ID_FIELD {
            Some("must not be the identifier field")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError::InvalidOrderField { name, reason }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderField {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderField::new(value)
    }
}

impl From<OrderField> for String {
    fn from(field: OrderField) -> Self {
        field.0
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar value a partition filter can match on.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
}

impl FilterValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FilterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Sort direction for `find_sorted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Handling of a peer that shares the rank of a record about to be deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Shift every peer at or after the deleted rank, duplicates included.
    #[default]
    Shift,
    /// Refuse to shift; the partition needs a full reorder first.
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shift" => Ok(DuplicatePolicy::Shift),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}
