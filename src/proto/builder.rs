//! Fluent builder API for [`Proto`].

use super::field::FieldDescriptor;
use super::prototype::Proto;
use crate::config::ProtoConfig;
use crate::error::RecordError;
use crate::types::FieldType;
use smol_str::SmolStr;
use std::sync::Arc;

/// Builder for creating [`Proto`] instances.
#[derive(Debug)]
pub struct ProtoBuilder {
    name: SmolStr,
    config: ProtoConfig,
    fields: Vec<FieldDescriptor>,
}

impl ProtoBuilder {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            config: ProtoConfig::default(),
            fields: Vec::new(),
        }
    }

    pub fn config(mut self, config: ProtoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.config.omit_empty = omit_empty;
        self
    }

    pub fn time_layout(mut self, layout: impl Into<SmolStr>) -> Self {
        self.config.time_layout = layout.into();
        self
    }

    /// Add a field of the given type.
    pub fn field(mut self, name: impl Into<SmolStr>, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor::new(name, field_type));
        self
    }

    /// Add a field with full options.
    pub fn field_with(mut self, desc: FieldDescriptor) -> Self {
        self.fields.push(desc);
        self
    }

    pub fn string_field(self, name: impl Into<SmolStr>) -> Self {
        self.field(name, FieldType::String)
    }

    pub fn int_field(self, name: impl Into<SmolStr>) -> Self {
        self.field(name, FieldType::Int)
    }

    pub fn time_field(self, name: impl Into<SmolStr>, layout: impl Into<SmolStr>) -> Self {
        self.field_with(FieldDescriptor::new(name, FieldType::Time).time_layout(layout))
    }

    /// Add a sequence field of scalars.
    pub fn array_field(self, name: impl Into<SmolStr>, component: FieldType) -> Self {
        self.field_with(FieldDescriptor::new(name, FieldType::Array).component_type(component))
    }

    /// Add a sequence field whose elements are records of `nested`.
    pub fn list_field(self, name: impl Into<SmolStr>, nested: Arc<Proto>) -> Self {
        self.field_with(
            FieldDescriptor::new(name, FieldType::Array)
                .component_type(FieldType::Object)
                .nested(nested),
        )
    }

    /// Add a nested record field.
    pub fn nested_field(self, name: impl Into<SmolStr>, nested: Arc<Proto>) -> Self {
        self.field_with(FieldDescriptor::new(name, FieldType::Object).nested(nested))
    }

    pub fn build(self) -> Result<Proto, RecordError> {
        let mut proto = Proto::with_config(self.name, &self.config);
        for desc in self.fields {
            proto.add_field(desc)?;
        }
        Ok(proto)
    }
}
