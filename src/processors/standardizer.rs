use crate::error::{DsgError, Result};
use crate::models::Value;
use crate::types::DataClass;
use crate::utils::constants::fold_longitude;

use super::column::DataColumn;
use super::units::UnitConverter;

/// A sample-by-column grid of standardized (typed, storage-unit) values
/// built from raw uploaded string cells.
#[derive(Debug, Clone)]
pub struct StdDataArray {
    columns: Vec<DataColumn>,
    values: Vec<Vec<Value>>,
}

impl StdDataArray {
    /// An all-default grid with the given shape. Rejects an empty column
    /// list or a zero sample count.
    pub fn new(columns: Vec<DataColumn>, num_samples: usize) -> Result<Self> {
        if columns.is_empty() {
            return Err(DsgError::Config(
                "standardized array needs at least one column".to_string(),
            ));
        }
        if num_samples == 0 {
            return Err(DsgError::Config(
                "standardized array needs at least one sample".to_string(),
            ));
        }
        let row: Vec<Value> = columns
            .iter()
            .map(|c| Value::default_for(c.data_type()))
            .collect();
        let values = vec![row; num_samples];
        Ok(Self { columns, values })
    }

    /// Standardize a raw table: every cell parsed per its column's data
    /// class, unit-converted into the storage unit, longitudes folded into
    /// [-180, 180) and latitudes range-checked. Fails on any row whose
    /// width differs from the column count.
    pub fn from_table(
        columns: Vec<DataColumn>,
        rows: &[Vec<String>],
        converter: &dyn UnitConverter,
    ) -> Result<Self> {
        let mut array = Self::new(columns, rows.len().max(1))?;
        if rows.is_empty() {
            return Err(DsgError::Config(
                "standardized array needs at least one sample".to_string(),
            ));
        }
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != array.columns.len() {
                return Err(DsgError::RowWidthMismatch {
                    expected: array.columns.len(),
                    found: row.len(),
                });
            }
            for (col_idx, raw) in row.iter().enumerate() {
                let value = array.standardize_cell(col_idx, raw, converter)?;
                array.values[row_idx][col_idx] = value;
            }
        }
        Ok(array)
    }

    fn standardize_cell(
        &self,
        col_idx: usize,
        raw: &str,
        converter: &dyn UnitConverter,
    ) -> Result<Value> {
        let column = &self.columns[col_idx];
        let dtype = column.data_type();
        if column.is_missing_value(raw) {
            return Ok(Value::default_for(dtype));
        }
        match dtype.data_class() {
            DataClass::Double if dtype.is_longitude() => {
                let parsed = Value::parse(dtype, raw)?;
                // unwrap of the Double arm cannot fail after a class parse
                let lon = parsed.as_double().unwrap_or_default();
                Ok(Value::Double(fold_longitude(lon)))
            }
            DataClass::Double if dtype.is_latitude() => {
                let parsed = Value::parse(dtype, raw)?;
                let lat = parsed.as_double().unwrap_or_default();
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(DsgError::InvalidCoordinate(format!(
                        "latitude {} is outside [-90, 90]",
                        lat
                    )));
                }
                Ok(Value::Double(lat))
            }
            DataClass::Double => {
                let parsed = Value::parse(dtype, raw)?;
                let value = parsed.as_double().unwrap_or_default();
                match (column.selected_unit(), column.standard_unit()) {
                    (Some(from), Some(to)) if from != to => {
                        Ok(Value::Double(converter.convert(value, from, to)?))
                    }
                    _ => Ok(Value::Double(value)),
                }
            }
            _ => Value::parse(dtype, raw),
        }
    }

    pub fn num_samples(&self) -> usize {
        self.values.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn get(&self, sample: usize, column: usize) -> Result<&Value> {
        self.check_bounds(sample, column)?;
        Ok(&self.values[sample][column])
    }

    /// Replace one cell; the value class must agree with the column type
    pub fn set(&mut self, sample: usize, column: usize, value: Value) -> Result<()> {
        self.check_bounds(sample, column)?;
        let dtype = self.columns[column].data_type();
        if value.data_class() != dtype.data_class() {
            return Err(DsgError::DataClassMismatch {
                name: dtype.var_name().to_string(),
                given: value.data_class().to_string(),
                known: dtype.data_class().to_string(),
            });
        }
        self.values[sample][column] = value;
        Ok(())
    }

    fn check_bounds(&self, sample: usize, column: usize) -> Result<()> {
        if sample >= self.values.len() {
            return Err(DsgError::IndexOutOfBounds {
                kind: "sample",
                index: sample,
                limit: self.values.len(),
            });
        }
        if column >= self.columns.len() {
            return Err(DsgError::IndexOutOfBounds {
                kind: "column",
                index: column,
                limit: self.columns.len(),
            });
        }
        Ok(())
    }
}

/// Condense a standardized grid into one data record per sample.
///
/// Columns whose names the registry does not recognize are left out of the
/// records; a recognized column whose class disagrees with the registry
/// fails. Sample numbers are assigned from the row position when the
/// registry carries a sample-number type.
pub fn records_from_std_array(
    registry: &crate::types::TypeRegistry,
    array: &StdDataArray,
) -> Result<Vec<crate::models::DataRecord>> {
    use crate::models::DataRecord;

    let mut records = Vec::with_capacity(array.num_samples());
    for sample in 0..array.num_samples() {
        let mut record = DataRecord::empty(registry)?;
        record.set_sample_number(Some(sample as i32 + 1));
        for (col_idx, column) in array.columns().iter().enumerate() {
            let dtype = column.data_type();
            let known = match registry.lookup(dtype.var_name()) {
                Some(known) => known.clone(),
                None => continue,
            };
            if known.data_class() != dtype.data_class() {
                return Err(DsgError::DataClassMismatch {
                    name: dtype.var_name().to_string(),
                    given: dtype.data_class().to_string(),
                    known: known.data_class().to_string(),
                });
            }
            let value = array.get(sample, col_idx)?.clone();
            record.set_value(&known, value)?;
        }
        records.push(record);
    }
    Ok(records)
}
