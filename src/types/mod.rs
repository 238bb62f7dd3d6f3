pub mod data_type;
pub mod registry;
pub mod standard;

pub use data_type::{DataClass, DataType};
pub use registry::TypeRegistry;
