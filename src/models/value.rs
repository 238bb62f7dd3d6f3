use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DsgError, Result};
use crate::types::{DataClass, DataType};
use crate::utils::constants::{
    date_missing_value, CHAR_MISSING_VALUE, FP_MISSING_VALUE, GLOBAL_REGION_ID, INT_MISSING_VALUE,
    WOCE_NOT_CHECKED,
};

/// One typed cell value. The class is validated wherever a value is stored
/// against a declared column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Char(char),
    Int(i32),
    Double(f64),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn data_class(&self) -> DataClass {
        match self {
            Value::Str(_) => DataClass::String,
            Value::Char(_) => DataClass::Character,
            Value::Int(_) => DataClass::Integer,
            Value::Double(_) => DataClass::Double,
            Value::Date(_) => DataClass::Date,
        }
    }

    /// The "missing value" default for a column of the given type.
    /// WOCE flags default to "not checked" and the region ID to the global
    /// region rather than a generic blank.
    pub fn default_for(dtype: &DataType) -> Value {
        match dtype.data_class() {
            DataClass::String => Value::Str(String::new()),
            DataClass::Character => {
                if dtype.is_woce_flag() {
                    Value::Char(WOCE_NOT_CHECKED)
                } else if dtype.is_region_id() {
                    Value::Char(GLOBAL_REGION_ID)
                } else {
                    Value::Char(CHAR_MISSING_VALUE)
                }
            }
            DataClass::Integer => Value::Int(INT_MISSING_VALUE),
            DataClass::Double => Value::Double(FP_MISSING_VALUE),
            DataClass::Date => Value::Date(date_missing_value()),
        }
    }

    /// Parse a raw string cell per the declared data class. The caller has
    /// already dealt with empty / "NaN" cells, which keep the default.
    pub fn parse(dtype: &DataType, raw: &str) -> Result<Value> {
        let raw = raw.trim();
        let invalid = || DsgError::InvalidValue {
            name: dtype.var_name().to_string(),
            value: raw.to_string(),
            class: dtype.data_class().to_string(),
        };
        match dtype.data_class() {
            DataClass::String => Ok(Value::Str(raw.to_string())),
            DataClass::Character => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(invalid()),
                }
            }
            DataClass::Integer => raw.parse::<i32>().map(Value::Int).map_err(|_| invalid()),
            DataClass::Double => raw.parse::<f64>().map(Value::Double).map_err(|_| invalid()),
            DataClass::Date => parse_date(raw).map(Value::Date).ok_or_else(invalid),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::standard;

    #[test]
    fn test_defaults_by_class() {
        assert_eq!(
            Value::default_for(&standard::expocode()),
            Value::Str(String::new())
        );
        assert_eq!(
            Value::default_for(&standard::sample_number()),
            Value::Int(INT_MISSING_VALUE)
        );
        assert_eq!(
            Value::default_for(&standard::latitude()),
            Value::Double(FP_MISSING_VALUE)
        );
        assert_eq!(
            Value::default_for(&standard::time_coverage_start()),
            Value::Date(date_missing_value())
        );
    }

    #[test]
    fn test_special_character_defaults() {
        assert_eq!(
            Value::default_for(&standard::woce_co2_water()),
            Value::Char(WOCE_NOT_CHECKED)
        );
        assert_eq!(
            Value::default_for(&standard::region_id()),
            Value::Char(GLOBAL_REGION_ID)
        );
        assert_eq!(
            Value::default_for(&standard::qc_flag()),
            Value::Char(CHAR_MISSING_VALUE)
        );
    }

    #[test]
    fn test_parse_per_class() {
        assert_eq!(
            Value::parse(&standard::year(), " 2015 ").unwrap(),
            Value::Int(2015)
        );
        assert_eq!(
            Value::parse(&standard::latitude(), "-23.75").unwrap(),
            Value::Double(-23.75)
        );
        assert_eq!(
            Value::parse(&standard::region_id(), "N").unwrap(),
            Value::Char('N')
        );
        assert_eq!(
            Value::parse(&standard::vessel_name(), "Atlantis").unwrap(),
            Value::Str("Atlantis".to_string())
        );
    }

    #[test]
    fn test_parse_failures_quote_value() {
        let err = Value::parse(&standard::year(), "20x5").unwrap_err();
        assert!(err.to_string().contains("'20x5'"));
        assert!(Value::parse(&standard::region_id(), "NW").is_err());
        assert!(Value::parse(&standard::latitude(), "north").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let full = Value::parse(&standard::time_coverage_start(), "2015-01-05 11:35:00").unwrap();
        let day = Value::parse(&standard::time_coverage_start(), "2015-01-05").unwrap();
        assert_eq!(full.as_date().unwrap().timestamp() % 86400, 41700);
        assert_eq!(day.as_date().unwrap().timestamp() % 86400, 0);
    }
}
