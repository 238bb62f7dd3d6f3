use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{
    FP_MISSING_VALUE, GLOBAL_REGION_ID, MAX_ABSOLUTE_ERROR, MAX_RELATIVE_ERROR,
};

/// One flagged observation location within a WOCE event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WoceLocation {
    /// Zero-based row number in the DSG file, when known
    pub row: Option<usize>,

    #[validate(range(min = -540.0, max = 540.0))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    /// Observation time in seconds since 1970-01-01T00:00:00Z
    pub time: f64,

    /// Value of the flagged data variable at this location, when the event
    /// targets a specific variable
    pub data_value: f64,

    pub region_id: char,
}

impl WoceLocation {
    pub fn new(longitude: f64, latitude: f64, time: f64) -> Self {
        Self {
            row: None,
            longitude,
            latitude,
            time,
            data_value: FP_MISSING_VALUE,
            region_id: GLOBAL_REGION_ID,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_data_value(mut self, data_value: f64) -> Self {
        self.data_value = data_value;
        self
    }
}

/// A WOCE quality-flag event: one flag value applied to a set of
/// observation locations in one DSG file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WoceEvent {
    /// Name of the WOCE flag variable to write, e.g. "WOCE_CO2_water"
    #[validate(length(min = 1))]
    pub flag_name: String,

    /// Flag character to assign, e.g. '3' (questionable) or '4' (bad)
    pub flag_value: char,

    /// Data variable the flag refers to, when the event targets one
    pub data_var_name: Option<String>,

    #[validate(nested)]
    pub locations: Vec<WoceLocation>,

    /// Relative tolerance used when comparing the stored data value against
    /// each location's `data_value`
    #[validate(range(min = 0.0))]
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,

    /// Absolute tolerance used when comparing the stored data value against
    /// each location's `data_value`
    #[validate(range(min = 0.0))]
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,
}

fn default_relative_tolerance() -> f64 {
    MAX_RELATIVE_ERROR
}

fn default_absolute_tolerance() -> f64 {
    MAX_ABSOLUTE_ERROR
}

impl WoceEvent {
    pub fn new(flag_name: &str, flag_value: char) -> Self {
        Self {
            flag_name: flag_name.to_string(),
            flag_value,
            data_var_name: None,
            locations: Vec::new(),
            relative_tolerance: MAX_RELATIVE_ERROR,
            absolute_tolerance: MAX_ABSOLUTE_ERROR,
        }
    }

    pub fn with_data_var_name(mut self, name: &str) -> Self {
        self.data_var_name = Some(name.to_string());
        self
    }

    pub fn with_locations(mut self, locations: Vec<WoceLocation>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_data_tolerances(mut self, relative: f64, absolute: f64) -> Self {
        self.relative_tolerance = relative;
        self.absolute_tolerance = absolute;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_event() {
        let event = WoceEvent::new("WOCE_CO2_water", '4')
            .with_data_var_name("temp")
            .with_locations(vec![WoceLocation::new(-23.5, 48.25, 1.42E9).with_row(0)]);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        let event = WoceEvent::new("WOCE_CO2_water", '3')
            .with_locations(vec![WoceLocation::new(-23.5, 91.0, 1.42E9)]);
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_empty_flag_name_rejected() {
        let event = WoceEvent::new("", '3');
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_default_data_tolerances() {
        let event = WoceEvent::new("WOCE_CO2_water", '3');
        assert_eq!(event.relative_tolerance, MAX_RELATIVE_ERROR);
        assert_eq!(event.absolute_tolerance, MAX_ABSOLUTE_ERROR);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let event = WoceEvent::new("WOCE_CO2_water", '3').with_data_tolerances(-1.0E-6, 0.0);
        assert!(event.validate().is_err());
    }
}
