//! # Validation Gate
//!
//! Checks the shape of loosely-typed arguments before any store access and
//! converts them into validated domain values.
//!
//! ## Rules
//!
//! | Argument | Rule |
//! |----------|------|
//! | `_id` | string matching the configured [`IdFormat`] |
//! | order values | integer (numeric strings accepted), `>= 1` where required |
//! | `order_field` | non-empty string, see [`OrderField`] |
//! | `query_obj` | object of scalar values, may be empty or absent |

use serde_json::Value;

use super::entities::{Partition, PartitionFilter};
use super::errors::ValidationError;
use super::value_objects::{FilterValue, IdFormat, OrderField, Rank, RecordId};

/// Validate a record identifier.
pub fn validate_record_id(value: Option<&Value>, format: IdFormat) -> Result<RecordId, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field: "_id" }),
        Some(Value::String(raw)) => RecordId::parse(raw, format),
        Some(other) => Err(ValidationError::InvalidRecordId {
            value: other.to_string(),
            format,
        }),
    }
}

/// Validate an integer order value with no lower bound.
pub fn validate_order(field: &'static str, value: Option<&Value>) -> Result<i64, ValidationError> {
    let value = match value {
        None | Some(Value::Null) => return Err(ValidationError::MissingField { field }),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };

    parsed.ok_or(ValidationError::NotAnInteger { field })
}

/// Validate an order value that must be a usable rank (`>= 1`).
pub fn validate_rank(field: &'static str, value: Option<&Value>) -> Result<Rank, ValidationError> {
    let raw = validate_order(field, value)?;
    Rank::new(raw).map_err(|_| ValidationError::BelowMinimum {
        field,
        value: raw,
        min: 1,
    })
}

/// Validate the order field name.
pub fn validate_order_field(value: Option<&Value>) -> Result<OrderField, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField {
            field: "order_field",
        }),
        Some(Value::String(name)) => OrderField::new(name.as_str()),
        Some(_) => Err(ValidationError::InvalidOrderField {
            name: String::new(),
            reason: "must be a string",
        }),
    }
}

/// Validate the partition filter. Absent or `null` means "whole collection".
pub fn validate_filter(value: Option<&Value>) -> Result<PartitionFilter, ValidationError> {
    let map = match value {
        None | Some(Value::Null) => return Ok(PartitionFilter::all()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ValidationError::InvalidFilter {
                reason: "must be an object".to_string(),
            })
        }
    };

    map.iter()
        .map(|(key, value)| Ok((key.clone(), filter_value(key, value)?)))
        .collect()
}

/// Validate filter and field together into a partition.
pub fn validate_partition(
    filter: Option<&Value>,
    order_field: Option<&Value>,
) -> Result<Partition, ValidationError> {
    let filter = validate_filter(filter)?;
    let order_field = validate_order_field(order_field)?;
    Partition::new(filter, order_field)
}

fn filter_value(key: &str, value: &Value) -> Result<FilterValue, ValidationError> {
    match value {
        Value::Null => Ok(FilterValue::Null),
        Value::Bool(b) => Ok(FilterValue::Bool(*b)),
        Value::String(s) => Ok(FilterValue::String(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(FilterValue::Integer)
            .ok_or_else(|| ValidationError::InvalidFilter {
                reason: format!("value of {key:?} must be an integer"),
            }),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::InvalidFilter {
            reason: format!("value of {key:?} must be a scalar"),
        }),
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
