use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DsgError, Result};
use crate::types::{DataClass, DataType, TypeRegistry};
use crate::utils::constants::{
    close_to, date_missing_value, longitudes_close, FP_MISSING_VALUE, MAX_ABSOLUTE_ERROR,
    MAX_RELATIVE_ERROR, MIN_STRING_LENGTH, STRING_LENGTH_BLOCK,
};
use crate::utils::normalize_key;

use super::data_record::DataRecord;
use super::value::Value;

/// Dataset-level record: one typed value per metadata type. Metadata
/// supports the String, Character, Double, and Date classes only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsgMetadata {
    values: HashMap<String, (DataType, Value)>,
}

macro_rules! string_field {
    ($(#[$meta:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$meta])*
        pub fn $getter(&self) -> String {
            self.string_value($key)
        }

        pub fn $setter(&mut self, value: Option<&str>) {
            self.set_string($key, value);
        }
    };
}

macro_rules! double_field {
    ($(#[$meta:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$meta])*
        pub fn $getter(&self) -> f64 {
            self.double_value($key)
        }

        pub fn $setter(&mut self, value: Option<f64>) {
            self.set_double($key, value);
        }
    };
}

macro_rules! date_field {
    ($(#[$meta:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$meta])*
        pub fn $getter(&self) -> DateTime<Utc> {
            self.date_value($key)
        }

        pub fn $setter(&mut self, value: Option<DateTime<Utc>>) {
            self.set_date($key, value);
        }
    };
}

impl DsgMetadata {
    /// A metadata record with every type known to the registry set to its
    /// class default. Fails on an empty registry or on a registry carrying
    /// an Integer-class type.
    pub fn empty(registry: &TypeRegistry) -> Result<Self> {
        if registry.is_empty() {
            return Err(DsgError::EmptyRegistry);
        }
        let mut values = HashMap::with_capacity(registry.len());
        for dtype in registry.sorted_types() {
            if dtype.data_class() == DataClass::Integer {
                return Err(DsgError::Config(format!(
                    "metadata records do not support Integer columns ('{}')",
                    dtype.var_name()
                )));
            }
            let default = Value::default_for(&dtype);
            values.insert(dtype.key(), (dtype, default));
        }
        Ok(Self { values })
    }

    /// Types in this record's schema, in deterministic order
    pub fn sorted_types(&self) -> Vec<DataType> {
        let mut types: Vec<DataType> = self.values.values().map(|(t, _)| t.clone()).collect();
        types.sort();
        types
    }

    pub fn value_for(&self, name: &str) -> Option<&Value> {
        self.values.get(&normalize_key(name)).map(|(_, v)| v)
    }

    /// Store a value for a type already in this record's schema
    pub fn set_value(&mut self, dtype: &DataType, value: Value) -> Result<()> {
        match self.values.get(&dtype.key()) {
            Some((known, _)) if known == dtype => {}
            _ => {
                return Err(DsgError::TypeNotInSchema {
                    name: dtype.var_name().to_string(),
                });
            }
        }
        if value.data_class() != dtype.data_class() {
            return Err(DsgError::DataClassMismatch {
                name: dtype.var_name().to_string(),
                given: value.data_class().to_string(),
                known: dtype.data_class().to_string(),
            });
        }
        self.values.insert(dtype.key(), (dtype.clone(), value));
        Ok(())
    }

    fn string_value(&self, key: &str) -> String {
        self.values
            .get(key)
            .and_then(|(_, v)| v.as_str())
            .unwrap_or("")
            .to_string()
    }

    fn double_value(&self, key: &str) -> f64 {
        self.values
            .get(key)
            .and_then(|(_, v)| v.as_double())
            .unwrap_or(FP_MISSING_VALUE)
    }

    fn date_value(&self, key: &str) -> DateTime<Utc> {
        self.values
            .get(key)
            .and_then(|(_, v)| v.as_date())
            .unwrap_or_else(date_missing_value)
    }

    fn set_string(&mut self, key: &str, value: Option<&str>) {
        if let Some((dtype, _)) = self.values.get(key) {
            let dtype = dtype.clone();
            let value = Value::Str(value.unwrap_or("").to_string());
            self.values.insert(key.to_string(), (dtype, value));
        }
    }

    fn set_double(&mut self, key: &str, value: Option<f64>) {
        if let Some((dtype, _)) = self.values.get(key) {
            let dtype = dtype.clone();
            let value = Value::Double(value.unwrap_or(FP_MISSING_VALUE));
            self.values.insert(key.to_string(), (dtype, value));
        }
    }

    fn set_date(&mut self, key: &str, value: Option<DateTime<Utc>>) {
        if let Some((dtype, _)) = self.values.get(key) {
            let dtype = dtype.clone();
            let value = Value::Date(value.unwrap_or_else(date_missing_value));
            self.values.insert(key.to_string(), (dtype, value));
        }
    }

    string_field!(expocode, set_expocode, "expocode");
    string_field!(dataset_name, set_dataset_name, "datasetname");
    string_field!(vessel_name, set_vessel_name, "vesselname");
    string_field!(organization, set_organization, "organization");
    string_field!(investigators, set_investigators, "investigators");
    string_field!(socat_doi, set_socat_doi, "socatdoi");
    string_field!(socat_version, set_socat_version, "socatversion");
    string_field!(all_region_ids, set_all_region_ids, "allregionids");

    double_field!(westmost_longitude, set_westmost_longitude, "westmostlongitude");
    double_field!(eastmost_longitude, set_eastmost_longitude, "eastmostlongitude");
    double_field!(southmost_latitude, set_southmost_latitude, "southmostlatitude");
    double_field!(northmost_latitude, set_northmost_latitude, "northmostlatitude");

    date_field!(begin_time, set_begin_time, "timecoveragestart");
    date_field!(end_time, set_end_time, "timecoverageend");

    /// Dataset-level QC flag
    pub fn qc_flag(&self) -> char {
        self.values
            .get("qcflag")
            .and_then(|(_, v)| v.as_char())
            .unwrap_or(crate::utils::constants::CHAR_MISSING_VALUE)
    }

    pub fn set_qc_flag(&mut self, value: Option<char>) {
        if let Some((dtype, _)) = self.values.get("qcflag") {
            let dtype = dtype.clone();
            let value = Value::Char(value.unwrap_or(crate::utils::constants::CHAR_MISSING_VALUE));
            self.values.insert("qcflag".to_string(), (dtype, value));
        }
    }

    /// Widest string field length rounded up to the next block, used to
    /// size the fixed-width character dimension of the DSG file
    pub fn max_string_length(&self) -> usize {
        let longest = self
            .values
            .values()
            .filter_map(|(_, v)| v.as_str())
            .map(|s| s.len())
            .max()
            .unwrap_or(0);
        let blocks = ((longest + STRING_LENGTH_BLOCK - 1) / STRING_LENGTH_BLOCK).max(1);
        (blocks * STRING_LENGTH_BLOCK).max(MIN_STRING_LENGTH)
    }

    /// Recompute the geographic and temporal coverage fields from the
    /// observations that will be written alongside this metadata.
    /// Observations with missing positions or timestamps are ignored for
    /// the bounds they cannot contribute to.
    pub fn assign_bounds_from_data(&mut self, data: &[DataRecord]) -> Result<()> {
        if data.is_empty() {
            return Err(DsgError::MissingData(
                "no data records to derive coverage bounds from".to_string(),
            ));
        }

        let mut west = f64::MAX;
        let mut east = f64::MIN;
        let mut south = f64::MAX;
        let mut north = f64::MIN;
        let mut begin = f64::MAX;
        let mut end = f64::MIN;

        for record in data {
            let lon = record.longitude();
            if !close_to(lon, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR) {
                let folded = crate::utils::constants::fold_longitude(lon);
                west = west.min(folded);
                east = east.max(folded);
            }
            let lat = record.latitude();
            if !close_to(lat, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR) {
                south = south.min(lat);
                north = north.max(lat);
            }
            if let Ok(time) = record.sample_time() {
                begin = begin.min(time);
                end = end.max(time);
            }
        }

        self.set_westmost_longitude((west != f64::MAX).then_some(west));
        self.set_eastmost_longitude((east != f64::MIN).then_some(east));
        self.set_southmost_latitude((south != f64::MAX).then_some(south));
        self.set_northmost_latitude((north != f64::MIN).then_some(north));
        self.set_begin_time(
            (begin != f64::MAX)
                .then(|| Utc.timestamp_opt(begin as i64, 0).single())
                .flatten(),
        );
        self.set_end_time(
            (end != f64::MIN)
                .then(|| Utc.timestamp_opt(end as i64, 0).single())
                .flatten(),
        );
        Ok(())
    }
}

impl PartialEq for DsgMetadata {
    /// Doubles compare within the default tolerance; longitude fields
    /// compare modulo 360 degrees.
    fn eq(&self, other: &Self) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        for (key, (dtype, value)) in &self.values {
            let (other_type, other_value) = match other.values.get(key) {
                Some(entry) => entry,
                None => return false,
            };
            if dtype != other_type {
                return false;
            }
            match (value, other_value) {
                (Value::Double(a), Value::Double(b)) => {
                    let matches = if key.contains("longitude") {
                        longitudes_close(*a, *b, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                    } else {
                        close_to(*a, *b, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                    };
                    if !matches {
                        return false;
                    }
                }
                (a, b) => {
                    if a != b {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::data_record::DataRecord;

    fn metadata_registry() -> TypeRegistry {
        TypeRegistry::for_metadata_files().unwrap()
    }

    #[test]
    fn test_empty_metadata_defaults() {
        let meta = DsgMetadata::empty(&metadata_registry()).unwrap();
        assert_eq!(meta.expocode(), "");
        assert_eq!(meta.qc_flag(), ' ');
        assert_eq!(meta.westmost_longitude(), FP_MISSING_VALUE);
        assert_eq!(meta.begin_time(), date_missing_value());
    }

    #[test]
    fn test_integer_metadata_type_rejected() {
        let mut registry = TypeRegistry::new();
        registry
            .register(crate::types::standard::sample_number())
            .unwrap();
        assert!(DsgMetadata::empty(&registry).is_err());
    }

    #[test]
    fn test_setters_substitute_defaults() {
        let mut meta = DsgMetadata::empty(&metadata_registry()).unwrap();
        meta.set_expocode(Some("316N20150105"));
        assert_eq!(meta.expocode(), "316N20150105");
        meta.set_expocode(None);
        assert_eq!(meta.expocode(), "");
    }

    #[test]
    fn test_max_string_length_blocks() {
        let mut meta = DsgMetadata::empty(&metadata_registry()).unwrap();
        assert_eq!(meta.max_string_length(), MIN_STRING_LENGTH);

        meta.set_investigators(Some(&"x".repeat(33)));
        assert_eq!(meta.max_string_length(), 64);

        meta.set_investigators(Some(&"x".repeat(64)));
        assert_eq!(meta.max_string_length(), 64);

        meta.set_investigators(Some(&"x".repeat(65)));
        assert_eq!(meta.max_string_length(), 96);
    }

    #[test]
    fn test_assign_bounds_from_data() {
        let data_registry = TypeRegistry::for_data_files().unwrap();
        let mut records = Vec::new();
        for (idx, (lon, lat)) in [(-23.5, 48.25), (-24.0, 48.5), (-24.5, 49.0)]
            .iter()
            .enumerate()
        {
            let mut record = DataRecord::empty(&data_registry).unwrap();
            record.set_year(Some(2015));
            record.set_month(Some(1));
            record.set_day(Some(5 + idx as i32));
            record.set_hour(Some(12));
            record.set_minute(Some(0));
            record.set_longitude(Some(*lon));
            record.set_latitude(Some(*lat));
            records.push(record);
        }

        let mut meta = DsgMetadata::empty(&metadata_registry()).unwrap();
        meta.assign_bounds_from_data(&records).unwrap();
        assert_eq!(meta.westmost_longitude(), -24.5);
        assert_eq!(meta.eastmost_longitude(), -23.5);
        assert_eq!(meta.southmost_latitude(), 48.25);
        assert_eq!(meta.northmost_latitude(), 49.0);
        assert!(meta.begin_time() < meta.end_time());
    }

    #[test]
    fn test_equality_tolerates_fp_noise() {
        let registry = metadata_registry();
        let mut a = DsgMetadata::empty(&registry).unwrap();
        let mut b = DsgMetadata::empty(&registry).unwrap();
        a.set_southmost_latitude(Some(48.25));
        b.set_southmost_latitude(Some(48.25 + 1.0E-8));
        assert_eq!(a, b);
        b.set_expocode(Some("316N20150105"));
        assert_ne!(a, b);
    }
}
