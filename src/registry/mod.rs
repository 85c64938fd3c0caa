pub mod entry;
pub mod store;

pub use entry::{Conversion, ConversionEntry};
pub use store::MappingRegistry;
