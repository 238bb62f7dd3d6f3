//! NetCDF Discrete Sampling Geometry file codec.
//!
//! One DSG file holds one dataset: a single trajectory's metadata plus all
//! of its observations. Downstream consumers read variables by name, so the
//! dimension and variable names here are part of the file contract.

pub mod file;
pub mod woce;

pub use file::DsgFile;

use netcdf::types::NcVariableType;
use netcdf::NcTypeDescriptor;

/// NC_CHAR cell for character and fixed-width string variables
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NcChar(pub u8);

unsafe impl NcTypeDescriptor for NcChar {
    fn type_descriptor() -> NcVariableType {
        NcVariableType::Char
    }
}

impl NcChar {
    pub(crate) fn from_char(c: char) -> Self {
        if c.is_ascii() {
            NcChar(c as u8)
        } else {
            NcChar(b' ')
        }
    }

    pub(crate) fn to_char(self) -> char {
        char::from(self.0)
    }
}

pub(crate) const TRAJECTORY_DIM: &str = "trajectory";
pub(crate) const OBS_DIM: &str = "obs";
pub(crate) const STRING_LENGTH_DIM: &str = "string_length";
pub(crate) const CHAR_LENGTH_DIM: &str = "char_length";

pub(crate) const NUM_OBS_VARNAME: &str = "num_obs";
pub(crate) const SAMPLE_TIME_VARNAME: &str = "time";
pub(crate) const LONGITUDE_VARNAME: &str = "longitude";
pub(crate) const LATITUDE_VARNAME: &str = "latitude";
pub(crate) const SST_VARNAME: &str = "temp";
pub(crate) const FCO2_REC_VARNAME: &str = "fCO2_recommended";
pub(crate) const REGION_ID_VARNAME: &str = "region_id";
pub(crate) const ALL_REGION_IDS_VARNAME: &str = "all_region_ids";
pub(crate) const QC_FLAG_VARNAME: &str = "qc_flag";
pub(crate) const EXPOCODE_VARNAME: &str = "expocode";
