pub mod data_record;
pub mod metadata;
pub mod value;
pub mod woce;

pub use data_record::{DataRecord, UnknownColumnPolicy};
pub use metadata::DsgMetadata;
pub use value::Value;
pub use woce::{WoceEvent, WoceLocation};
