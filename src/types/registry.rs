use std::collections::HashMap;

use tracing::debug;

use crate::error::{DsgError, Result};
use crate::utils::normalize_key;

use super::data_type::DataType;
use super::standard;

/// Set of recognized data types, keyed by the normalized variable name and
/// the normalized display name of each type.
///
/// A registry is built explicitly at startup and passed into every
/// component that needs it; no registry state is global.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<DataType>,
    keys: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the types users may assign to uploaded columns
    pub fn for_user_columns() -> Result<Self> {
        let mut registry = Self::new();
        registry.add_types(standard::user_column_types())?;
        Ok(registry)
    }

    /// Registry pre-loaded with the dataset-level metadata types
    pub fn for_metadata_files() -> Result<Self> {
        let mut registry = Self::new();
        registry.add_types(standard::metadata_file_types())?;
        Ok(registry)
    }

    /// Registry pre-loaded with the per-observation data file types
    pub fn for_data_files() -> Result<Self> {
        let mut registry = Self::new();
        registry.add_types(standard::data_file_types())?;
        Ok(registry)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of distinct registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Register one type. Fails when the type's normalized variable name or
    /// display name is already taken by another registered type.
    pub fn register(&mut self, dtype: DataType) -> Result<()> {
        let var_key = dtype.key();
        let display_key = dtype.display_key();

        for key in [&var_key, &display_key] {
            if self.keys.contains_key(key.as_str()) {
                return Err(DsgError::DuplicateType {
                    name: dtype.var_name().to_string(),
                    key: key.to_string(),
                });
            }
        }

        let index = self.types.len();
        self.types.push(dtype);
        self.keys.insert(var_key.clone(), index);
        if display_key != var_key {
            self.keys.insert(display_key, index);
        }
        Ok(())
    }

    pub fn add_types(&mut self, types: Vec<DataType>) -> Result<()> {
        for dtype in types {
            self.register(dtype)?;
        }
        Ok(())
    }

    /// Look up a type by any name that normalizes to one of its keys
    pub fn lookup(&self, name: &str) -> Option<&DataType> {
        self.keys
            .get(&normalize_key(name))
            .map(|&index| &self.types[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(&normalize_key(name))
    }

    /// All registered types ordered by sort order, then name
    pub fn sorted_types(&self) -> Vec<DataType> {
        let mut types = self.types.clone();
        types.sort();
        types
    }

    /// Extend the registry from a user-maintained type catalog: one
    /// `var_name = descriptor` line per type, blank lines and `#` comments
    /// skipped. Returns the number of types added.
    pub fn add_types_from_properties(&mut self, text: &str) -> Result<usize> {
        let mut added = 0;
        let base_order = self
            .types
            .iter()
            .map(|t| t.sort_order())
            .fold(0.0_f64, f64::max);

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (var_name, encoded) =
                line.split_once('=')
                    .ok_or_else(|| DsgError::InvalidTypeDescriptor {
                        var_name: format!("line {}", line_num + 1),
                        reason: "expected 'var_name = descriptor'".to_string(),
                    })?;
            let var_name = var_name.trim();
            let dtype = DataType::from_property_value(var_name, encoded.trim())?
                .with_sort_order(base_order + 1.0 + added as f64);
            debug!(var_name, "adding type from property catalog");
            self.register(dtype)?;
            added += 1;
        }
        Ok(added)
    }
}
