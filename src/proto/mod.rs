pub mod accessor;
mod builder;
pub mod field;
pub mod infer;
pub mod mutator;
mod prototype;

pub use accessor::Accessor;
pub use builder::ProtoBuilder;
pub use field::{Field, FieldDescriptor};
pub use infer::{fields_from_sample, fields_from_value};
pub use mutator::Mutator;
pub use prototype::Proto;
