use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DsgError, Result};
use crate::utils::normalize_key;

/// Value class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataClass {
    String,
    Character,
    Integer,
    Double,
    Date,
}

impl fmt::Display for DataClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataClass::String => "String",
            DataClass::Character => "Character",
            DataClass::Integer => "Integer",
            DataClass::Double => "Double",
            DataClass::Date => "Date",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DataClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "String" => Ok(DataClass::String),
            "Character" => Ok(DataClass::Character),
            "Integer" => Ok(DataClass::Integer),
            "Double" => Ok(DataClass::Double),
            "Date" => Ok(DataClass::Date),
            other => Err(format!("unrecognized data class '{}'", other)),
        }
    }
}

/// Immutable descriptor of one column type.
///
/// Equality, hashing, and the registry lookup keys ignore `sort_order`;
/// ordering uses it first so file schemas iterate deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataType {
    var_name: String,
    display_name: String,
    data_class: DataClass,
    description: String,
    standard_name: String,
    category_name: String,
    units: Vec<String>,
    sort_order: f64,
}

impl DataType {
    pub fn new(var_name: &str, display_name: &str, data_class: DataClass) -> Self {
        Self {
            var_name: var_name.to_string(),
            display_name: display_name.to_string(),
            data_class,
            description: String::new(),
            standard_name: String::new(),
            category_name: String::new(),
            units: Vec::new(),
            sort_order: 0.0,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_standard_name(mut self, standard_name: &str) -> Self {
        self.standard_name = standard_name.to_string();
        self
    }

    pub fn with_category_name(mut self, category_name: &str) -> Self {
        self.category_name = category_name.to_string();
        self
    }

    pub fn with_units(mut self, units: &[&str]) -> Self {
        self.units = units.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn with_sort_order(mut self, sort_order: f64) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn data_class(&self) -> DataClass {
        self.data_class
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn standard_name(&self) -> &str {
        &self.standard_name
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    /// Ordered unit list; the first unit is the storage unit
    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn sort_order(&self) -> f64 {
        self.sort_order
    }

    /// Normalized lookup key derived from the variable name
    pub fn key(&self) -> String {
        normalize_key(&self.var_name)
    }

    /// Normalized lookup key derived from the display name
    pub fn display_key(&self) -> String {
        normalize_key(&self.display_name)
    }

    /// True for the marker type assigned to not-yet-identified columns
    pub fn is_unknown(&self) -> bool {
        self.key() == "unknown"
    }

    /// WOCE quality-flag columns get special default and equality handling
    pub fn is_woce_flag(&self) -> bool {
        self.data_class == DataClass::Character && self.key().starts_with("woce")
    }

    pub fn is_region_id(&self) -> bool {
        self.key() == "regionid"
    }

    pub fn is_longitude(&self) -> bool {
        self.key() == "longitude"
    }

    pub fn is_latitude(&self) -> bool {
        self.key() == "latitude"
    }

    pub fn is_second_of_minute(&self) -> bool {
        self.key() == "second"
    }

    /// Encode the descriptive fields as a single-line `tag=value` string.
    /// Empty fields are omitted; `from_property_value` restores them to
    /// their defaults. Separator characters inside field values are
    /// backslash-escaped so the encoding is lossless.
    pub fn to_property_value(&self) -> String {
        let mut parts = Vec::new();
        if !self.display_name.is_empty() {
            parts.push(format!("display_name={}", escape(&self.display_name, &[';'])));
        }
        parts.push(format!("data_class={}", self.data_class));
        if !self.description.is_empty() {
            parts.push(format!("description={}", escape(&self.description, &[';'])));
        }
        if !self.standard_name.is_empty() {
            parts.push(format!(
                "standard_name={}",
                escape(&self.standard_name, &[';'])
            ));
        }
        if !self.category_name.is_empty() {
            parts.push(format!(
                "category_name={}",
                escape(&self.category_name, &[';'])
            ));
        }
        if !self.units.is_empty() {
            let units: Vec<String> = self
                .units
                .iter()
                .map(|u| escape(u, &[';', ',']))
                .collect();
            parts.push(format!("units=[{}]", units.join(",")));
        }
        parts.join("; ")
    }

    /// Decode a descriptor produced by [`to_property_value`].
    ///
    /// Any unrecognized tag or malformed unit-array encoding fails the
    /// parse; a missing `data_class` tag fails as well.
    pub fn from_property_value(var_name: &str, encoded: &str) -> Result<Self> {
        let mut display_name = String::new();
        let mut data_class: Option<DataClass> = None;
        let mut description = String::new();
        let mut standard_name = String::new();
        let mut category_name = String::new();
        let mut units: Vec<String> = Vec::new();

        for piece in split_escaped(encoded, ';') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (tag, value) = piece.split_once('=').ok_or_else(|| {
                DsgError::InvalidTypeDescriptor {
                    var_name: var_name.to_string(),
                    reason: format!("'{}' is not a tag=value pair", piece),
                }
            })?;
            let tag = tag.trim();
            let value = value.trim();
            match tag {
                "display_name" => display_name = unescape(value),
                "data_class" => {
                    data_class = Some(DataClass::from_str(value).map_err(|reason| {
                        DsgError::InvalidTypeDescriptor {
                            var_name: var_name.to_string(),
                            reason,
                        }
                    })?);
                }
                "description" => description = unescape(value),
                "standard_name" => standard_name = unescape(value),
                "category_name" => category_name = unescape(value),
                "units" => {
                    let inner = value
                        .strip_prefix('[')
                        .and_then(|v| v.strip_suffix(']'))
                        .ok_or_else(|| DsgError::InvalidTypeDescriptor {
                            var_name: var_name.to_string(),
                            reason: format!("malformed unit array '{}'", value),
                        })?;
                    units = split_escaped(inner, ',')
                        .iter()
                        .map(|u| unescape(u.trim()))
                        .filter(|u| !u.is_empty())
                        .collect();
                }
                other => {
                    return Err(DsgError::InvalidTypeDescriptor {
                        var_name: var_name.to_string(),
                        reason: format!("unrecognized tag '{}'", other),
                    });
                }
            }
        }

        let data_class = data_class.ok_or_else(|| DsgError::InvalidTypeDescriptor {
            var_name: var_name.to_string(),
            reason: "missing data_class tag".to_string(),
        })?;

        if display_name.is_empty() {
            display_name = var_name.to_string();
        }

        Ok(Self {
            var_name: var_name.to_string(),
            display_name,
            data_class,
            description,
            standard_name,
            category_name,
            units,
            sort_order: 0.0,
        })
    }
}

/// Backslash-escape `specials` (and backslash itself) in a field value
fn escape(value: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on unescaped occurrences of `sep`, leaving escape sequences in the
/// returned pieces for a later [`unescape`].
fn split_escaped(text: &str, sep: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut pending_escape = false;
    for c in text.chars() {
        if pending_escape {
            current.push('\\');
            current.push(c);
            pending_escape = false;
        } else if c == '\\' {
            pending_escape = true;
        } else if c == sep {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if pending_escape {
        current.push('\\');
    }
    pieces.push(current);
    pieces
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        // sort_order is a presentation detail, not identity
        self.var_name == other.var_name
            && self.display_name == other.display_name
            && self.data_class == other.data_class
            && self.description == other.description
            && self.standard_name == other.standard_name
            && self.category_name == other.category_name
            && self.units == other.units
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.var_name.hash(state);
        self.display_name.hash(state);
        self.data_class.hash(state);
        self.description.hash(state);
        self.standard_name.hash(state);
        self.category_name.hash(state);
        self.units.hash(state);
    }
}

impl PartialOrd for DataType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_order
            .total_cmp(&other.sort_order)
            .then_with(|| self.display_name.cmp(&other.display_name))
            .then_with(|| self.var_name.cmp(&other.var_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_type() -> DataType {
        DataType::new("sample_depth", "Sample Depth", DataClass::Double)
            .with_description("depth of the water sample")
            .with_standard_name("depth")
            .with_category_name("Bathymetry")
            .with_units(&["meters", "kilometers"])
            .with_sort_order(12.0)
    }

    #[test]
    fn test_property_value_round_trip() {
        let original = sample_type();
        let encoded = original.to_property_value();
        let decoded = DataType::from_property_value("sample_depth", &encoded).unwrap();
        // equality already ignores sort order
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_property_value_minimal_round_trip() {
        let original = DataType::new("qc_flag", "qc_flag", DataClass::Character);
        let decoded =
            DataType::from_property_value("qc_flag", &original.to_property_value()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_property_value_round_trip_with_separator_characters() {
        let original = DataType::new("alkalinity", "Alkalinity; total", DataClass::Double)
            .with_description("total alkalinity; includes carbonate and borate")
            .with_units(&["umol/kg, wet", "mmol/kg"]);
        let encoded = original.to_property_value();
        let decoded = DataType::from_property_value("alkalinity", &encoded).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.display_name(), "Alkalinity; total");
        assert_eq!(decoded.units(), ["umol/kg, wet", "mmol/kg"]);
    }

    #[test]
    fn test_property_value_round_trip_with_backslash() {
        let original = DataType::new("notes", "Notes", DataClass::String)
            .with_description(r"path\to\source; raw");
        let decoded =
            DataType::from_property_value("notes", &original.to_property_value()).unwrap();
        assert_eq!(decoded.description(), r"path\to\source; raw");
    }

    #[test]
    fn test_unrecognized_tag_fails() {
        let result = DataType::from_property_value("depth", "data_class=Double; bogus=1");
        assert!(matches!(
            result,
            Err(DsgError::InvalidTypeDescriptor { .. })
        ));
    }

    #[test]
    fn test_malformed_unit_array_fails() {
        let result = DataType::from_property_value("depth", "data_class=Double; units=m,km");
        assert!(matches!(
            result,
            Err(DsgError::InvalidTypeDescriptor { .. })
        ));
    }

    #[test]
    fn test_missing_data_class_fails() {
        let result = DataType::from_property_value("depth", "display_name=Depth");
        assert!(result.is_err());
    }

    #[test]
    fn test_equality_ignores_sort_order() {
        let a = sample_type();
        let b = sample_type().with_sort_order(99.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ordering_by_sort_order_then_name() {
        let a = DataType::new("aaa", "AAA", DataClass::Double).with_sort_order(2.0);
        let b = DataType::new("bbb", "BBB", DataClass::Double).with_sort_order(1.0);
        let c = DataType::new("ccc", "BBB", DataClass::Double).with_sort_order(1.0);
        let mut sorted = vec![a.clone(), b.clone(), c.clone()];
        sorted.sort();
        assert_eq!(sorted, vec![b, c, a]);
    }
}
