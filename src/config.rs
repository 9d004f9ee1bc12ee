use crate::case::Case;
use crate::types::DEFAULT_TIME_LAYOUT;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Prototype-wide settings, applied by [`crate::proto::ProtoBuilder::config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtoConfig {
    /// Omit-empty default for fields that don't override it.
    pub omit_empty: bool,
    /// chrono format string used by time fields without their own layout.
    pub time_layout: SmolStr,
    /// Convention the field names are declared in.
    pub declared_case: Case,
    /// Convention of incoming keys. Input aliases are registered when it
    /// differs from `declared_case`.
    pub input_case: Case,
    /// Convention of projected names. Output names are computed when it
    /// differs from `declared_case`.
    pub output_case: Case,
}

impl Default for ProtoConfig {
    fn default() -> Self {
        Self {
            omit_empty: false,
            time_layout: SmolStr::new_static(DEFAULT_TIME_LAYOUT),
            declared_case: Case::UpperCamel,
            input_case: Case::UpperCamel,
            output_case: Case::UpperCamel,
        }
    }
}
