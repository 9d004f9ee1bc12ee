use super::Proto;
use crate::spooky_value::SpookyValue;
use crate::types::{FieldType, is_empty_value};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ─── FieldDescriptor ────────────────────────────────────────────────────────

/// Declarative description of one field. Input to [`Proto::add_field`] and
/// the field list carried by [`crate::collection::Compacted`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: SmolStr,
    /// `None` falls back to `String` when the field is added.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_layout: Option<SmolStr>,
    /// Overrides the proto-wide omit-empty default when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_empty: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<SmolStr>,
    /// Proto of nested records held by an Object or Array field.
    #[serde(skip)]
    pub nested: Option<Arc<Proto>>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<SmolStr>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
            ..Default::default()
        }
    }

    /// A field whose type is resolved when it is added to a proto.
    pub fn untyped(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = Some(omit_empty);
        self
    }

    pub fn time_layout(mut self, layout: impl Into<SmolStr>) -> Self {
        self.time_layout = Some(layout.into());
        self
    }

    pub fn component_type(mut self, component_type: FieldType) -> Self {
        self.component_type = Some(component_type);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn input_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    pub fn output_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn nested(mut self, proto: Arc<Proto>) -> Self {
        self.nested = Some(proto);
        self
    }
}

// ─── Field ──────────────────────────────────────────────────────────────────

/// One slot of a built [`Proto`]. Everything except the hidden flag is
/// fixed once the field is added.
#[derive(Debug)]
pub struct Field {
    pub(crate) name: SmolStr,
    pub(crate) position: usize,
    pub(crate) field_type: FieldType,
    pub(crate) component_type: Option<FieldType>,
    pub(crate) time_layout: Option<SmolStr>,
    pub(crate) omit_empty: Option<bool>,
    pub(crate) hidden: AtomicBool,
    pub(crate) input_name: Option<SmolStr>,
    pub(crate) output_name: Option<SmolStr>,
    pub(crate) nested: Option<Arc<Proto>>,
}

impl Field {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[inline]
    pub fn component_type(&self) -> Option<FieldType> {
        self.component_type
    }

    pub fn input_name(&self) -> Option<&str> {
        self.input_name.as_deref()
    }

    /// Name used when the field is projected; the declared name unless an
    /// output name was given or derived from a case convention.
    #[inline]
    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Relaxed)
    }

    pub fn nested(&self) -> Option<&Arc<Proto>> {
        self.nested.as_ref()
    }

    /// The field's own layout, else the proto default.
    pub fn time_layout<'a>(&'a self, proto: &'a Proto) -> &'a str {
        self.time_layout.as_deref().unwrap_or(proto.time_layout())
    }

    /// The field's own omit-empty override, else the proto default.
    #[inline]
    pub fn should_omit_empty(&self, proto: &Proto) -> bool {
        self.omit_empty.unwrap_or(proto.omit_empty())
    }

    /// True when a set value must be left out of projections.
    #[inline]
    pub fn omits(&self, proto: &Proto, value: &SpookyValue) -> bool {
        self.should_omit_empty(proto) && is_empty_value(value)
    }

    pub fn to_descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            field_type: Some(self.field_type),
            component_type: self.component_type,
            time_layout: self.time_layout.clone(),
            omit_empty: self.omit_empty,
            hidden: self.is_hidden(),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
            nested: self.nested.clone(),
        }
    }

    /// Every name this field answers to.
    pub(crate) fn spellings(&self) -> impl Iterator<Item = &SmolStr> {
        std::iter::once(&self.name)
            .chain(self.input_name.iter())
            .chain(self.output_name.iter())
    }
}
