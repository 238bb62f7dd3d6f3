pub mod column;
pub mod standardizer;
pub mod units;

pub use column::DataColumn;
pub use standardizer::{records_from_std_array, StdDataArray};
pub use units::{StandardUnitConverter, UnitConverter};
