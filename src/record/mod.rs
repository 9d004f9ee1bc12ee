mod read_op;
#[allow(clippy::module_inception)]
mod record;
mod set_mask;
mod write_op;

pub use read_op::OutputMap;
pub use record::Record;

#[cfg(test)]
mod tests;
