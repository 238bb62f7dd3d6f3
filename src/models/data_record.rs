use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DsgError, Result};
use crate::types::{DataClass, DataType, TypeRegistry};
use crate::utils::constants::{
    close_to, longitudes_close, FP_MISSING_VALUE, MAX_ABSOLUTE_ERROR, MAX_RELATIVE_ERROR,
};
use crate::utils::normalize_key;

use super::value::Value;

/// What to do when a column's name is not found in the registry while
/// building a record from a raw data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownColumnPolicy {
    /// Leave the column out of the record (the upload flow default)
    Skip,
    /// Fail the row
    Fail,
}

/// One observation: a typed value for every type known to the registry the
/// record was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRecord {
    values: HashMap<String, (DataType, Value)>,
}

macro_rules! int_field {
    ($(#[$meta:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$meta])*
        pub fn $getter(&self) -> i32 {
            self.int_value($key)
        }

        pub fn $setter(&mut self, value: Option<i32>) {
            self.set_int($key, value);
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

macro_rules! char_field {
    ($(#[$meta:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$meta])*
        pub fn $getter(&self) -> char {
            self.char_value($key)
        }

        pub fn $setter(&mut self, value: Option<char>) {
            self.set_char($key, value);
        }
    };
}

impl DataRecord {
    /// A record with every type known to the registry set to its class
    /// default. Fails on an empty registry.
    pub fn empty(registry: &TypeRegistry) -> Result<Self> {
        if registry.is_empty() {
            return Err(DsgError::EmptyRegistry);
        }
        let mut values = HashMap::with_capacity(registry.len());
        for dtype in registry.sorted_types() {
            let default = Value::default_for(&dtype);
            values.insert(dtype.key(), (dtype, default));
        }
        Ok(Self { values })
    }

    /// Build a record from one raw data row.
    ///
    /// `sample_idx` is the zero-based row position in the upload, used for
    /// error context. Blank and "NaN" cells keep the column default. A
    /// column whose declared type is UNKNOWN fails the row; a column whose
    /// name the registry does not recognize is handled per `policy`; a
    /// recognized name whose registry class disagrees with the declared
    /// column type fails the row.
    pub fn from_row(
        registry: &TypeRegistry,
        column_types: &[DataType],
        sample_idx: usize,
        raw_values: &[String],
        policy: UnknownColumnPolicy,
    ) -> Result<Self> {
        if column_types.len() != raw_values.len() {
            return Err(DsgError::RowWidthMismatch {
                expected: column_types.len(),
                found: raw_values.len(),
            });
        }
        let mut record = Self::empty(registry)?;
        for (index, (ctype, raw)) in column_types.iter().zip(raw_values).enumerate() {
            if ctype.is_unknown() {
                return Err(DsgError::UnknownColumnType { index });
            }
            let raw = raw.trim();
            if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null")
            {
                continue;
            }
            let known = match registry.lookup(ctype.var_name()) {
                Some(known) => known,
                None => match policy {
                    UnknownColumnPolicy::Skip => {
                        debug!(
                            column = ctype.var_name(),
                            row = sample_idx,
                            "skipping unrecognized column"
                        );
                        continue;
                    }
                    UnknownColumnPolicy::Fail => {
                        return Err(DsgError::UnrecognizedColumnType {
                            name: ctype.var_name().to_string(),
                        });
                    }
                },
            };
            if known.data_class() != ctype.data_class() {
                return Err(DsgError::DataClassMismatch {
                    name: ctype.var_name().to_string(),
                    given: ctype.data_class().to_string(),
                    known: known.data_class().to_string(),
                });
            }
            let value = Value::parse(known, raw)?;
            record.values.insert(known.key(), (known.clone(), value));
        }
        Ok(record)
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

    /// Store a value for a type already in this record's schema; the value
    /// class must agree with the type's class.
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

    fn int_value(&self, key: &str) -> i32 {
        self.values
            .get(key)
            .and_then(|(_, v)| v.as_int())
            .unwrap_or(crate::utils::constants::INT_MISSING_VALUE)
    }

    fn double_value(&self, key: &str) -> f64 {
        self.values
            .get(key)
            .and_then(|(_, v)| v.as_double())
            .unwrap_or(FP_MISSING_VALUE)
    }

    fn char_value(&self, key: &str) -> char {
        match self.values.get(key) {
            Some((dtype, value)) => value
                .as_char()
                .unwrap_or_else(|| match Value::default_for(dtype) {
                    Value::Char(c) => c,
                    _ => crate::utils::constants::CHAR_MISSING_VALUE,
                }),
            None => crate::utils::constants::CHAR_MISSING_VALUE,
        }
    }

    fn set_int(&mut self, key: &str, value: Option<i32>) {
        if let Some((dtype, _)) = self.values.get(key) {
            let dtype = dtype.clone();
            let value = Value::Int(value.unwrap_or(crate::utils::constants::INT_MISSING_VALUE));
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

    fn set_char(&mut self, key: &str, value: Option<char>) {
        if let Some((dtype, _)) = self.values.get(key) {
            let dtype = dtype.clone();
            let value = match value {
                Some(c) => Value::Char(c),
                None => Value::default_for(&dtype),
            };
            self.values.insert(key.to_string(), (dtype, value));
        }
    }

    int_field!(sample_number, set_sample_number, "samplenumber");
    int_field!(year, set_year, "year");
    int_field!(month, set_month, "month");
    int_field!(day, set_day, "day");
    int_field!(hour, set_hour, "hour");
    int_field!(minute, set_minute, "minute");
    int_field!(fco2_source, set_fco2_source, "fco2source");

    double_field!(second, set_second, "second");
    double_field!(longitude, set_longitude, "longitude");
    double_field!(latitude, set_latitude, "latitude");
    double_field!(sample_depth, set_sample_depth, "sampledepth");
    double_field!(salinity, set_salinity, "sal");
    double_field!(
        /// Measured sea surface temperature
        sst,
        set_sst,
        "temp"
    );
    double_field!(equ_temperature, set_equ_temperature, "temperatureequi");
    double_field!(atm_pressure, set_atm_pressure, "pressureatm");
    double_field!(equ_pressure, set_equ_pressure, "pressureequi");
    double_field!(xco2_water_sst, set_xco2_water_sst, "xco2watersstdry");
    double_field!(xco2_water_equ, set_xco2_water_equ, "xco2waterequitempdry");
    double_field!(fco2_recommended, set_fco2_recommended, "fco2recommended");

    char_field!(region_id, set_region_id, "regionid");
    char_field!(woce_co2_water, set_woce_co2_water, "woceco2water");
    char_field!(woce_co2_atm, set_woce_co2_atm, "woceco2atm");

    /// Observation time in seconds since 1970-01-01T00:00:00Z, recomputed
    /// from the date and time components.
    ///
    /// Seconds are truncated to whole seconds; a sentinel "missing" seconds
    /// value counts as zero. A missing or out-of-range year, month, day,
    /// hour, or minute fails with the composite timestamp in the message.
    pub fn sample_time(&self) -> Result<f64> {
        let year = self.year();
        let month = self.month();
        let day = self.day();
        let hour = self.hour();
        let minute = self.minute();
        let raw_second = self.second();
        let second = if raw_second.is_nan()
            || close_to(raw_second, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
        {
            0.0
        } else {
            raw_second.trunc()
        };

        let stamp = format!(
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second as i64
        );
        let invalid = || DsgError::InvalidTimestamp(stamp.clone());

        if year == crate::utils::constants::INT_MISSING_VALUE || !(0.0..60.0).contains(&second) {
            return Err(invalid());
        }
        let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(invalid)?;
        if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
            return Err(invalid());
        }
        let datetime = date
            .and_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or_else(invalid)?;
        Ok(datetime.and_utc().timestamp() as f64)
    }
}

impl PartialEq for DataRecord {
    /// Equality ignores WOCE flag columns and tolerates floating-point
    /// noise: doubles compare within the default relative/absolute error,
    /// longitudes compare modulo 360 degrees, and a sentinel "missing"
    /// seconds value equals an explicit 0.0.
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
            if dtype.is_woce_flag() {
                continue;
            }
            match (value, other_value) {
                (Value::Double(a), Value::Double(b)) => {
                    let (a, b) = (*a, *b);
                    let matches = if dtype.is_longitude() {
                        longitudes_close(a, b, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                    } else if dtype.is_second_of_minute() {
                        let fold = |v: f64| {
                            if close_to(v, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                            {
                                0.0
                            } else {
                                v
                            }
                        };
                        close_to(fold(a), fold(b), MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                    } else {
                        close_to(a, b, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
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
    use crate::types::standard;
    use crate::utils::constants::{GLOBAL_REGION_ID, INT_MISSING_VALUE, WOCE_NOT_CHECKED};

    fn data_registry() -> TypeRegistry {
        TypeRegistry::for_data_files().unwrap()
    }

    fn column_types() -> Vec<DataType> {
        vec![
            standard::year(),
            standard::month(),
            standard::day(),
            standard::hour(),
            standard::minute(),
            standard::second(),
            standard::longitude(),
            standard::latitude(),
            standard::sst(),
        ]
    }

    fn raw_row() -> Vec<String> {
        ["2015", "1", "5", "11", "35", "12.7", "-23.5", "48.25", "12.35"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_empty_record_defaults() {
        let record = DataRecord::empty(&data_registry()).unwrap();
        assert_eq!(record.year(), INT_MISSING_VALUE);
        assert_eq!(record.longitude(), FP_MISSING_VALUE);
        assert_eq!(record.woce_co2_water(), WOCE_NOT_CHECKED);
        assert_eq!(record.woce_co2_atm(), WOCE_NOT_CHECKED);
        assert_eq!(record.region_id(), GLOBAL_REGION_ID);
    }

    #[test]
    fn test_empty_record_requires_types() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            DataRecord::empty(&registry),
            Err(DsgError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_from_row() {
        let record = DataRecord::from_row(
            &data_registry(),
            &column_types(),
            0,
            &raw_row(),
            UnknownColumnPolicy::Skip,
        )
        .unwrap();
        assert_eq!(record.year(), 2015);
        assert_eq!(record.minute(), 35);
        assert_eq!(record.second(), 12.7);
        assert_eq!(record.longitude(), -23.5);
        assert_eq!(record.sst(), 12.35);
        // not in the row, keeps the default
        assert_eq!(record.salinity(), FP_MISSING_VALUE);
    }

    #[test]
    fn test_from_row_width_mismatch() {
        let mut short = raw_row();
        short.pop();
        let result = DataRecord::from_row(
            &data_registry(),
            &column_types(),
            0,
            &short,
            UnknownColumnPolicy::Skip,
        );
        assert!(matches!(result, Err(DsgError::RowWidthMismatch { .. })));
    }

    #[test]
    fn test_from_row_unknown_marker_fails() {
        let types = vec![standard::year(), standard::unknown()];
        let raw = vec!["2015".to_string(), "x".to_string()];
        let result = DataRecord::from_row(
            &data_registry(),
            &types,
            0,
            &raw,
            UnknownColumnPolicy::Skip,
        );
        assert!(matches!(
            result,
            Err(DsgError::UnknownColumnType { index: 1 })
        ));
    }

    #[test]
    fn test_from_row_blank_and_nan_keep_default() {
        let types = vec![standard::year(), standard::sst()];
        let raw = vec!["".to_string(), "NaN".to_string()];
        let record = DataRecord::from_row(
            &data_registry(),
            &types,
            0,
            &raw,
            UnknownColumnPolicy::Skip,
        )
        .unwrap();
        assert_eq!(record.year(), INT_MISSING_VALUE);
        assert_eq!(record.sst(), FP_MISSING_VALUE);
    }

    #[test]
    fn test_from_row_unrecognized_column_policies() {
        let mystery = DataType::new("bottle_number", "Bottle", DataClass::Integer);
        let types = vec![standard::year(), mystery];
        let raw = vec!["2015".to_string(), "7".to_string()];

        let skipped = DataRecord::from_row(
            &data_registry(),
            &types,
            0,
            &raw,
            UnknownColumnPolicy::Skip,
        )
        .unwrap();
        assert!(skipped.value_for("bottle_number").is_none());

        let failed = DataRecord::from_row(
            &data_registry(),
            &types,
            0,
            &raw,
            UnknownColumnPolicy::Fail,
        );
        assert!(matches!(
            failed,
            Err(DsgError::UnrecognizedColumnType { .. })
        ));
    }

    #[test]
    fn test_from_row_class_mismatch_fails() {
        // declare "temp" as an Integer column; the registry knows it as Double
        let bogus = DataType::new("temp", "SST", DataClass::Integer);
        let types = vec![bogus];
        let raw = vec!["12".to_string()];
        let result = DataRecord::from_row(
            &data_registry(),
            &types,
            0,
            &raw,
            UnknownColumnPolicy::Skip,
        );
        assert!(matches!(result, Err(DsgError::DataClassMismatch { .. })));
    }

    #[test]
    fn test_from_row_bad_value_quoted() {
        let types = vec![standard::latitude()];
        let raw = vec!["forty-eight".to_string()];
        let err = DataRecord::from_row(
            &data_registry(),
            &types,
            3,
            &raw,
            UnknownColumnPolicy::Skip,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'forty-eight'"));
    }

    #[test]
    fn test_setters_substitute_defaults() {
        let mut record = DataRecord::empty(&data_registry()).unwrap();
        record.set_latitude(Some(48.25));
        assert_eq!(record.latitude(), 48.25);
        record.set_latitude(None);
        assert_eq!(record.latitude(), FP_MISSING_VALUE);
        record.set_woce_co2_water(Some('4'));
        assert_eq!(record.woce_co2_water(), '4');
        record.set_woce_co2_water(None);
        assert_eq!(record.woce_co2_water(), WOCE_NOT_CHECKED);
    }

    #[test]
    fn test_set_value_rejects_foreign_type() {
        let mut record = DataRecord::empty(&data_registry()).unwrap();
        let foreign = DataType::new("bottle_number", "Bottle", DataClass::Integer);
        let result = record.set_value(&foreign, Value::Int(7));
        assert!(matches!(result, Err(DsgError::TypeNotInSchema { .. })));
    }

    #[test]
    fn test_set_value_rejects_class_mismatch() {
        let mut record = DataRecord::empty(&data_registry()).unwrap();
        let result = record.set_value(&standard::latitude(), Value::Int(48));
        assert!(matches!(result, Err(DsgError::DataClassMismatch { .. })));
    }

    #[test]
    fn test_equality_tolerates_fp_noise() {
        let registry = data_registry();
        let mut a = DataRecord::empty(&registry).unwrap();
        let mut b = DataRecord::empty(&registry).unwrap();
        a.set_sst(Some(12.35));
        b.set_sst(Some(12.35 + 1.0E-8));
        assert_eq!(a, b);
        b.set_sst(Some(12.36));
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_ignores_woce_flags() {
        let registry = data_registry();
        let mut a = DataRecord::empty(&registry).unwrap();
        let mut b = DataRecord::empty(&registry).unwrap();
        a.set_woce_co2_water(Some('2'));
        b.set_woce_co2_water(Some('4'));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_longitude_modulo_360() {
        let registry = data_registry();
        let mut a = DataRecord::empty(&registry).unwrap();
        let mut b = DataRecord::empty(&registry).unwrap();
        a.set_longitude(Some(359.9999999));
        b.set_longitude(Some(0.0000001));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_missing_seconds_equals_zero() {
        let registry = data_registry();
        let mut a = DataRecord::empty(&registry).unwrap();
        let mut b = DataRecord::empty(&registry).unwrap();
        a.set_second(None);
        b.set_second(Some(0.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_time() {
        let record = DataRecord::from_row(
            &data_registry(),
            &column_types(),
            0,
            &raw_row(),
            UnknownColumnPolicy::Skip,
        )
        .unwrap();
        // 2015-01-05 11:35:12 UTC, fractional seconds truncated
        assert_eq!(record.sample_time().unwrap(), 1_420_457_712.0);
    }

    #[test]
    fn test_sample_time_sentinel_seconds() {
        let registry = data_registry();
        let mut record = DataRecord::empty(&registry).unwrap();
        record.set_year(Some(2015));
        record.set_month(Some(1));
        record.set_day(Some(5));
        record.set_hour(Some(11));
        record.set_minute(Some(35));
        // seconds left at the sentinel
        assert_eq!(record.sample_time().unwrap(), 1_420_457_700.0);
    }

    #[test]
    fn test_sample_time_incomplete_fails() {
        let registry = data_registry();
        let mut record = DataRecord::empty(&registry).unwrap();
        record.set_year(Some(2015));
        record.set_month(Some(1));
        record.set_day(Some(5));
        record.set_hour(Some(11));
        // minute still missing
        let err = record.sample_time().unwrap_err();
        assert!(matches!(err, DsgError::InvalidTimestamp(_)));
    }
}
