// ─── Error ──────────────────────────────────────────────────────────────────
use crate::types::FieldType;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("proto `{proto}` is frozen: fields can't change once records exist or the proto is shared")]
    SchemaFrozen { proto: SmolStr },
    #[error("duplicate field name: {0}")]
    DuplicateFieldName(SmolStr),
    #[error("unknown field: {0}")]
    UnknownField(SmolStr),
    #[error("field position {position} out of range (field count {size})")]
    PositionOutOfRange { position: usize, size: usize },
    #[error("Type mismatch on `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        field: SmolStr,
        expected: FieldType,
        actual: &'static str,
    },
    #[error("row has {actual} values, but proto has only {expected} fields")]
    RowArityMismatch { expected: usize, actual: usize },
    #[error("record of proto `{actual}` can't be added to a collection of `{expected}`")]
    ForeignRecord { expected: SmolStr, actual: SmolStr },
    #[error("can't infer fields from a {0} value")]
    UnsupportedSource(&'static str),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("CBOR error: {0}")]
    Cbor(String),
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Json(e.to_string())
    }
}
