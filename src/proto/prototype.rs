use super::accessor::Accessor;
use super::field::{Field, FieldDescriptor};
use super::mutator::Mutator;
use crate::case::Case;
use crate::config::ProtoConfig;
use crate::error::RecordError;
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use crate::types::{FieldType, NameIndex, zero_value};
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_PROTO_ID: AtomicU64 = AtomicU64::new(1);

// ════════════════════════════════════════════════════════════════════════════
// Proto
// ════════════════════════════════════════════════════════════════════════════

/// Ordered set of fields shared by every record built from it.
///
/// Fields are appended while the proto is exclusively owned (`&mut Proto`).
/// Once the first record exists the proto is frozen and `add_field` and the
/// case conventions fail with [`RecordError::SchemaFrozen`]. Hiding and
/// showing fields stays possible through a shared reference.
#[derive(Debug)]
pub struct Proto {
    id: u64,
    name: SmolStr,
    fields: Vec<Field>,
    names: NameIndex,
    accessors: Vec<Accessor>,
    mutators: Vec<Mutator>,
    /// Layout of a fresh record.
    zero_values: Vec<SpookyValue>,
    omit_empty: bool,
    time_layout: SmolStr,
    declared_case: Case,
    input_case: Case,
    output_case: Case,
    frozen: AtomicBool,
}

impl Proto {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self::with_config(name, &ProtoConfig::default())
    }

    pub fn with_config(name: impl Into<SmolStr>, config: &ProtoConfig) -> Self {
        Self {
            id: NEXT_PROTO_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            fields: Vec::new(),
            names: NameIndex::default(),
            accessors: Vec::new(),
            mutators: Vec::new(),
            zero_values: Vec::new(),
            omit_empty: config.omit_empty,
            time_layout: config.time_layout.clone(),
            declared_case: config.declared_case,
            input_case: config.input_case,
            output_case: config.output_case,
            frozen: AtomicBool::new(false),
        }
    }

    /// Build a proto from field descriptors, positions following their order.
    pub fn build(
        name: impl Into<SmolStr>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, RecordError> {
        let mut proto = Self::new(name);
        for desc in fields {
            proto.add_field(desc)?;
        }
        Ok(proto)
    }

    // ─── Identity ───────────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its dotted qualifier: `pkg.Account` → `Account`.
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }

    // ─── Field lookup ───────────────────────────────────────────────────────

    #[inline]
    pub fn size(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by declared, input or output name.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.names.get(name).map(|&i| &self.fields[i])
    }

    #[inline]
    pub fn field_at(&self, position: usize) -> Option<&Field> {
        self.fields.get(position)
    }

    pub fn index_of(&self, name: &str) -> Result<usize, RecordError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RecordError::UnknownField(SmolStr::from(name)))
    }

    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.fields.iter().map(Field::to_descriptor).collect()
    }

    pub fn config(&self) -> ProtoConfig {
        ProtoConfig {
            omit_empty: self.omit_empty,
            time_layout: self.time_layout.clone(),
            declared_case: self.declared_case,
            input_case: self.input_case,
            output_case: self.output_case,
        }
    }

    /// An unfrozen copy with the same settings and fields, under a new
    /// identity.
    pub fn fork(&self) -> Result<Proto, RecordError> {
        let mut proto = Proto::with_config(self.name.clone(), &self.config());
        for desc in self.descriptors() {
            proto.add_field(desc)?;
        }
        Ok(proto)
    }

    // ─── Accessors / Mutators ───────────────────────────────────────────────

    pub fn accessor(&self, name: &str) -> Result<&Accessor, RecordError> {
        self.index_of(name).map(|i| &self.accessors[i])
    }

    #[inline]
    pub fn accessor_at(&self, position: usize) -> Option<&Accessor> {
        self.accessors.get(position)
    }

    pub fn mutator(&self, name: &str) -> Result<&Mutator, RecordError> {
        self.index_of(name).map(|i| &self.mutators[i])
    }

    #[inline]
    pub fn mutator_at(&self, position: usize) -> Option<&Mutator> {
        self.mutators.get(position)
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    #[inline]
    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    pub fn set_omit_empty(&mut self, omit_empty: bool) {
        self.omit_empty = omit_empty;
    }

    #[inline]
    pub fn time_layout(&self) -> &str {
        &self.time_layout
    }

    pub fn set_time_layout(&mut self, layout: impl Into<SmolStr>) {
        self.time_layout = layout.into();
    }

    pub fn hide(&self, name: &str) -> Result<(), RecordError> {
        self.set_hidden(name, true)
    }

    pub fn show(&self, name: &str) -> Result<(), RecordError> {
        self.set_hidden(name, false)
    }

    fn set_hidden(&self, name: &str, hidden: bool) -> Result<(), RecordError> {
        let field = self
            .field(name)
            .ok_or_else(|| RecordError::UnknownField(SmolStr::from(name)))?;
        field.hidden.store(hidden, Ordering::Relaxed);
        Ok(())
    }

    // ─── Schema changes ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    fn ensure_mutable(&self) -> Result<(), RecordError> {
        if self.is_frozen() {
            return Err(RecordError::SchemaFrozen {
                proto: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Append a field and return its position.
    ///
    /// Input and output names are derived from the proto's case conventions
    /// unless the descriptor spells them out. Every spelling must be free.
    pub fn add_field(&mut self, desc: FieldDescriptor) -> Result<usize, RecordError> {
        self.ensure_mutable()?;

        let position = self.fields.len();
        let field_type = desc.field_type.unwrap_or_else(|| {
            log::warn!(
                "field `{}` of `{}` has no type, falling back to string",
                desc.name,
                self.name
            );
            FieldType::String
        });
        let input_name = desc
            .input_name
            .or_else(|| self.derived_name(&desc.name, self.input_case));
        let output_name = desc
            .output_name
            .or_else(|| self.derived_name(&desc.name, self.output_case));

        let field = Field {
            name: desc.name,
            position,
            field_type,
            component_type: desc.component_type,
            time_layout: desc.time_layout,
            omit_empty: desc.omit_empty,
            hidden: AtomicBool::new(desc.hidden),
            input_name,
            output_name,
            nested: desc.nested,
        };
        for spelling in field.spellings() {
            if self.names.contains_key(spelling) {
                return Err(RecordError::DuplicateFieldName(spelling.clone()));
            }
        }

        for spelling in field.spellings() {
            self.names.insert(spelling.clone(), position);
        }
        self.accessors
            .push(Accessor::new(self.id, position, field_type));
        self.mutators.push(Mutator::new(self.id, position, field_type));
        self.zero_values.push(zero_value(field_type));
        log::trace!(
            "proto `{}`: added field `{}` ({}) at {}",
            self.name,
            field.name,
            field_type,
            position
        );
        self.fields.push(field);
        Ok(position)
    }

    fn derived_name(&self, name: &str, target: Case) -> Option<SmolStr> {
        if self.declared_case == target {
            return None;
        }
        let derived = self.declared_case.format(name, target);
        (derived != name).then_some(derived)
    }

    /// Recompute every field's output name: declared names are written in
    /// `source` and projected in `target`.
    pub fn apply_case_convention(&mut self, source: Case, target: Case) -> Result<(), RecordError> {
        self.ensure_mutable()?;
        let outputs: Vec<Option<SmolStr>> = self
            .fields
            .iter()
            .map(|f| {
                let name = source.format(&f.name, target);
                (name != f.name).then_some(name)
            })
            .collect();
        let inputs: Vec<Option<SmolStr>> =
            self.fields.iter().map(|f| f.input_name.clone()).collect();
        self.reindex(inputs, outputs)?;
        self.declared_case = source;
        self.output_case = target;
        Ok(())
    }

    /// Register input aliases: declared names are written in `source`,
    /// incoming keys arrive in `target`.
    pub fn apply_input_case(&mut self, source: Case, target: Case) -> Result<(), RecordError> {
        self.ensure_mutable()?;
        let inputs: Vec<Option<SmolStr>> = self
            .fields
            .iter()
            .map(|f| {
                let name = source.format(&f.name, target);
                (name != f.name).then_some(name)
            })
            .collect();
        let outputs: Vec<Option<SmolStr>> =
            self.fields.iter().map(|f| f.output_name.clone()).collect();
        self.reindex(inputs, outputs)?;
        self.declared_case = source;
        self.input_case = target;
        Ok(())
    }

    /// Rebuild the name index with new aliases. Nothing changes on error.
    fn reindex(
        &mut self,
        inputs: Vec<Option<SmolStr>>,
        outputs: Vec<Option<SmolStr>>,
    ) -> Result<(), RecordError> {
        let mut names = NameIndex::default();
        for (position, field) in self.fields.iter().enumerate() {
            let spellings = std::iter::once(&field.name)
                .chain(inputs[position].iter())
                .chain(outputs[position].iter());
            for spelling in spellings {
                match names.insert(spelling.clone(), position) {
                    Some(other) if other != position => {
                        return Err(RecordError::DuplicateFieldName(spelling.clone()));
                    }
                    _ => {}
                }
            }
        }
        for ((field, input), output) in self.fields.iter_mut().zip(inputs).zip(outputs) {
            field.input_name = input;
            field.output_name = output;
        }
        self.names = names;
        Ok(())
    }

    // ─── Records ────────────────────────────────────────────────────────────

    /// Create an empty record: every field unset. Freezes the proto.
    pub fn new_record(self: &Arc<Self>) -> Record {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            log::debug!(
                "proto `{}` frozen with {} fields",
                self.name,
                self.fields.len()
            );
        }
        Record::new(Arc::clone(self))
    }

    #[inline]
    pub(crate) fn zero_values(&self) -> &[SpookyValue] {
        &self.zero_values
    }
}

impl PartialEq for Proto {
    /// Protos compare by identity.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
