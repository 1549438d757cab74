//! Flat key-value record codec for export/import paths.
//!
//! # Responsibility
//! - Convert entities to and from `serde_json` object maps.
//!
//! # Invariants
//! - Encoding is deterministic: equal entities yield equal records.
//! - `from_record(to_record(x)) == x` for every valid entity.
//! - Decoding never yields an entity that fails `validate()`.

use crate::model::course::Course;
use crate::model::instructor::Instructor;
use crate::model::student::Student;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-name to primitive-value mapping.
pub type Record = Map<String, Value>;

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from record encoding and decoding.
#[derive(Debug)]
pub enum RecordError {
    /// Required key absent, wrong value type, or invalid field value.
    Malformed(String),
    /// Entity could not be encoded as a JSON object.
    Encode(String),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed record: {message}"),
            Self::Encode(message) => write!(f, "record encoding failed: {message}"),
        }
    }
}

impl Error for RecordError {}

/// Record conversion for serializable entities.
pub trait RecordCodec: Serialize + DeserializeOwned {
    /// Encodes this entity as a flat record with nested child records.
    fn to_record(&self) -> RecordResult<Record> {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(other) => Err(RecordError::Encode(format!(
                "expected object, got {}",
                value_kind(&other)
            ))),
            Err(err) => Err(RecordError::Encode(err.to_string())),
        }
    }

    /// Decodes an entity, validating every field.
    fn from_record(record: &Record) -> RecordResult<Self> {
        serde_json::from_value(Value::Object(record.clone()))
            .map_err(|err| RecordError::Malformed(err.to_string()))
    }
}

impl RecordCodec for Student {}
impl RecordCodec for Instructor {}
impl RecordCodec for Course {}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
