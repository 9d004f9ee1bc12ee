//! Building field lists from sample values. One-time construction helpers,
//! never used on the record hot path.

use super::field::FieldDescriptor;
use super::prototype::Proto;
use crate::error::RecordError;
use crate::spooky_value::SpookyValue;
use crate::types::{FieldType, infer_component_type, infer_type};
use serde::Serialize;
use std::sync::Arc;

/// Field descriptors for every key of a map, or the fields of a record.
///
/// Nested maps become Object fields with an inferred nested proto; a
/// sequence whose first element is a map becomes an Array field of nested
/// records.
pub fn fields_from_value(value: &SpookyValue) -> Result<Vec<FieldDescriptor>, RecordError> {
    match value {
        SpookyValue::Object(map) => map
            .iter()
            .map(|(name, v)| descriptor_for(name, v))
            .collect(),
        SpookyValue::Record(record) => Ok(record.proto().descriptors()),
        other => Err(RecordError::UnsupportedSource(other.kind_name())),
    }
}

/// Field descriptors for any serde-serializable value, read through its
/// JSON form. Fields come out in key order, like [`fields_from_value`].
pub fn fields_from_sample<T: Serialize>(sample: &T) -> Result<Vec<FieldDescriptor>, RecordError> {
    let json = serde_json::to_value(sample)?;
    match json {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(name, v)| descriptor_for(&name, &SpookyValue::from(v)))
            .collect(),
        other => Err(RecordError::UnsupportedSource(
            SpookyValue::from(other).kind_name(),
        )),
    }
}

fn descriptor_for(name: &str, value: &SpookyValue) -> Result<FieldDescriptor, RecordError> {
    let field_type = infer_type(value);
    let desc = FieldDescriptor::new(name, field_type);
    let desc = match value {
        SpookyValue::Object(_) => desc.nested(nested_proto(name, value)?),
        SpookyValue::Record(record) => desc.nested(record.proto().clone()),
        SpookyValue::List(list) => desc
            .component_type(FieldType::Object)
            .nested(list.proto().clone()),
        SpookyValue::Array(items) => match items.first() {
            Some(first @ SpookyValue::Object(_)) => desc
                .component_type(FieldType::Object)
                .nested(nested_proto(name, first)?),
            _ => match infer_component_type(value) {
                Some(component) => desc.component_type(component),
                None => desc,
            },
        },
        _ => desc,
    };
    Ok(desc)
}

fn nested_proto(name: &str, sample: &SpookyValue) -> Result<Arc<Proto>, RecordError> {
    Proto::build(name, fields_from_value(sample)?).map(Arc::new)
}
