use crate::error::{DsgError, Result};

/// Converts a measured value from a user-selected unit into the column's
/// storage unit. Conversion is a seam: the standardizer only needs this
/// trait, so callers can substitute their own conversion tables.
pub trait UnitConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64>;
}

/// Conversions for the units the standard column types declare
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUnitConverter;

impl UnitConverter for StandardUnitConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(value);
        }
        let converted = match (from, to) {
            ("degrees K", "degrees C") => Some(value - 273.15),
            ("degrees F", "degrees C") => Some((value - 32.0) / 1.8),
            ("kPa", "hPa") => Some(value * 10.0),
            ("mmHg", "hPa") => Some(value * 1.333_224),
            ("atm", "hPa") => Some(value * 1013.25),
            ("kilometers", "meters") => Some(value * 1000.0),
            _ => None,
        };
        converted.ok_or_else(|| DsgError::UnsupportedUnitConversion {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_conversion() {
        let converter = StandardUnitConverter;
        assert_eq!(converter.convert(12.5, "degrees C", "degrees C").unwrap(), 12.5);
        assert_eq!(converter.convert(12.5, "PSU", "psu").unwrap(), 12.5);
    }

    #[test]
    fn test_temperature_conversions() {
        let converter = StandardUnitConverter;
        let celsius = converter.convert(285.4, "degrees K", "degrees C").unwrap();
        assert!((celsius - 12.25).abs() < 1.0E-10);
        let celsius = converter.convert(54.05, "degrees F", "degrees C").unwrap();
        assert!((celsius - 12.25).abs() < 1.0E-10);
    }

    #[test]
    fn test_pressure_and_depth_conversions() {
        let converter = StandardUnitConverter;
        assert_eq!(converter.convert(101.325, "kPa", "hPa").unwrap(), 1013.25);
        assert_eq!(converter.convert(1.5, "kilometers", "meters").unwrap(), 1500.0);
    }

    #[test]
    fn test_unsupported_conversion_fails() {
        let converter = StandardUnitConverter;
        assert!(matches!(
            converter.convert(1.0, "fathoms", "meters"),
            Err(DsgError::UnsupportedUnitConversion { .. })
        ));
    }
}
