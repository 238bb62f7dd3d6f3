use serde::{Deserialize, Serialize};

use crate::error::{DsgError, Result};
use crate::types::DataType;

/// One uploaded column: its assigned data type, the unit the user measured
/// in (an index into the type's unit list; index 0 is the storage unit),
/// and an optional string the upload uses to mean "no value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    data_type: DataType,
    unit_index: usize,
    missing_value: Option<String>,
}

impl DataColumn {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            unit_index: 0,
            missing_value: None,
        }
    }

    pub fn with_unit_index(mut self, unit_index: usize) -> Result<Self> {
        if unit_index != 0 && unit_index >= self.data_type.units().len() {
            return Err(DsgError::Config(format!(
                "unit index {} out of range for '{}' ({} units)",
                unit_index,
                self.data_type.var_name(),
                self.data_type.units().len()
            )));
        }
        self.unit_index = unit_index;
        Ok(self)
    }

    pub fn with_missing_value(mut self, missing_value: &str) -> Self {
        self.missing_value = Some(missing_value.to_string());
        self
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Unit the uploaded values are measured in, when the type has units
    pub fn selected_unit(&self) -> Option<&str> {
        self.data_type.units().get(self.unit_index).map(|u| u.as_str())
    }

    /// Storage unit of the column, when the type has units
    pub fn standard_unit(&self) -> Option<&str> {
        self.data_type.units().first().map(|u| u.as_str())
    }

    /// True when this cell content means "no value" for this column:
    /// blank, "NaN", or the column's declared missing-value string
    pub fn is_missing_value(&self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
            return true;
        }
        match &self.missing_value {
            Some(marker) => raw.eq_ignore_ascii_case(marker.trim()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::standard;

    #[test]
    fn test_unit_selection() {
        let column = DataColumn::new(standard::sst()).with_unit_index(1).unwrap();
        assert_eq!(column.selected_unit(), Some("degrees K"));
        assert_eq!(column.standard_unit(), Some("degrees C"));
    }

    #[test]
    fn test_unit_index_out_of_range() {
        assert!(DataColumn::new(standard::sst()).with_unit_index(5).is_err());
        // index 0 is always allowed, even for unit-less types
        assert!(DataColumn::new(standard::expocode()).with_unit_index(0).is_ok());
    }

    #[test]
    fn test_missing_value_markers() {
        let column = DataColumn::new(standard::sst()).with_missing_value("-999");
        assert!(column.is_missing_value(""));
        assert!(column.is_missing_value(" NaN "));
        assert!(column.is_missing_value("-999"));
        assert!(!column.is_missing_value("12.35"));
    }
}
