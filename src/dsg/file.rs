use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use crate::error::{DsgError, Result};
use crate::models::{DataRecord, DsgMetadata, Value};
use crate::types::{DataClass, DataType, TypeRegistry};
use crate::utils::constants::{
    close_to, date_missing_value, FP_MISSING_VALUE, INT_MISSING_VALUE, MAX_ABSOLUTE_ERROR,
    MAX_RELATIVE_ERROR,
};

use super::{
    NcChar, ALL_REGION_IDS_VARNAME, CHAR_LENGTH_DIM, EXPOCODE_VARNAME, FCO2_REC_VARNAME,
    LATITUDE_VARNAME, LONGITUDE_VARNAME, NUM_OBS_VARNAME, OBS_DIM, QC_FLAG_VARNAME,
    REGION_ID_VARNAME, SAMPLE_TIME_VARNAME, SST_VARNAME, STRING_LENGTH_DIM, TRAJECTORY_DIM,
};

/// One trajectory DSG file on disk plus the in-memory record of what was
/// last written to or read from it.
#[derive(Debug)]
pub struct DsgFile {
    path: PathBuf,
    metadata: Option<DsgMetadata>,
    data: Vec<DataRecord>,
}

impl DsgFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            metadata: None,
            data: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> Option<&DsgMetadata> {
        self.metadata.as_ref()
    }

    pub fn data(&self) -> &[DataRecord] {
        &self.data
    }

    /// Write a brand new DSG file from a metadata record and its
    /// observations, replacing any file already at this path.
    ///
    /// Every observation's time is recomputed from its date and time
    /// component columns; a record whose components do not form a valid
    /// timestamp fails the whole write before the file is touched.
    pub fn create(&mut self, metadata: DsgMetadata, data: Vec<DataRecord>) -> Result<()> {
        if data.is_empty() {
            return Err(DsgError::MissingData(
                "a DSG file must hold at least one observation".to_string(),
            ));
        }
        let times: Vec<f64> = data.iter().map(|r| r.sample_time()).collect::<Result<_>>()?;
        let mut data = data;
        if let Some(time_type) = data[0]
            .sorted_types()
            .into_iter()
            .find(|t| t.var_name() == SAMPLE_TIME_VARNAME)
        {
            for (record, time) in data.iter_mut().zip(&times) {
                record.set_value(&time_type, Value::Double(*time))?;
            }
        }

        let string_length = metadata.max_string_length();
        let mut file = netcdf::create(&self.path)?;
        file.add_dimension(TRAJECTORY_DIM, 1)?;
        file.add_dimension(STRING_LENGTH_DIM, string_length)?;
        file.add_dimension(OBS_DIM, data.len())?;
        file.add_dimension(CHAR_LENGTH_DIM, 1)?;

        file.add_attribute("featureType", "Trajectory")?;
        file.add_attribute("Conventions", "CF-1.6")?;
        file.add_attribute(
            "history",
            concat!("socat-dsg version ", env!("CARGO_PKG_VERSION")),
        )?;

        write_metadata_vars(&mut file, &metadata, string_length)?;
        write_num_obs_var(&mut file, data.len())?;
        write_data_vars(&mut file, &data)?;

        info!(
            path = %self.path.display(),
            observations = data.len(),
            string_length,
            "wrote DSG file"
        );
        self.metadata = Some(metadata);
        self.data = data;
        Ok(())
    }

    /// Read the dataset-level metadata variables into a fresh record built
    /// from the registry. Returns the names of registry types with no
    /// variable in the file.
    pub fn read_metadata(&mut self, registry: &TypeRegistry) -> Result<Vec<String>> {
        let file = netcdf::open(&self.path)?;
        let mut metadata = DsgMetadata::empty(registry)?;
        let mut not_found = Vec::new();

        for dtype in registry.sorted_types() {
            let var = match file.variable(dtype.var_name()) {
                Some(var) => var,
                None => {
                    not_found.push(dtype.var_name().to_string());
                    continue;
                }
            };
            match dtype.data_class() {
                DataClass::String => {
                    let cells = var.get_values::<NcChar, _>(..)?;
                    metadata.set_value(&dtype, Value::Str(chars_to_string(&cells)))?;
                }
                DataClass::Character => {
                    let cells = var.get_values::<NcChar, _>(..)?;
                    let c = cells.first().copied().unwrap_or(NcChar(b' '));
                    metadata.set_value(&dtype, Value::Char(c.to_char()))?;
                }
                DataClass::Double => {
                    let values = var.get_values::<f64, _>(..)?;
                    let v = values.first().copied().unwrap_or(FP_MISSING_VALUE);
                    let v = if v.is_finite() { v } else { FP_MISSING_VALUE };
                    metadata.set_value(&dtype, Value::Double(v))?;
                }
                DataClass::Date => {
                    let values = var.get_values::<f64, _>(..)?;
                    let v = values.first().copied().unwrap_or(FP_MISSING_VALUE);
                    let date = if !v.is_finite()
                        || close_to(v, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                    {
                        date_missing_value()
                    } else {
                        Utc.timestamp_opt(v as i64, 0).single().ok_or_else(|| {
                            DsgError::InvalidTimestamp(format!(
                                "{} seconds since the epoch in variable '{}'",
                                v,
                                dtype.var_name()
                            ))
                        })?
                    };
                    metadata.set_value(&dtype, Value::Date(date))?;
                }
                // DsgMetadata::empty already rejected Integer types
                DataClass::Integer => unreachable!("metadata registries carry no Integer types"),
            }
        }

        self.metadata = Some(metadata);
        Ok(not_found)
    }

    /// Read every per-observation variable into data records built from the
    /// registry. Returns the names of registry types with no variable in
    /// the file; a missing time variable or a variable whose length differs
    /// from the time variable's is fatal.
    pub fn read_data(&mut self, registry: &TypeRegistry) -> Result<Vec<String>> {
        let file = netcdf::open(&self.path)?;
        let time_var = file
            .variable(SAMPLE_TIME_VARNAME)
            .ok_or_else(|| DsgError::VariableNotFound(SAMPLE_TIME_VARNAME.to_string()))?;
        let num_obs = var_length(&time_var);

        let empty = DataRecord::empty(registry)?;
        let mut records = vec![empty; num_obs];
        let mut not_found = Vec::new();

        for dtype in registry.sorted_types() {
            let var = match file.variable(dtype.var_name()) {
                Some(var) => var,
                None => {
                    not_found.push(dtype.var_name().to_string());
                    continue;
                }
            };
            let found = var_length(&var);
            if found != num_obs {
                return Err(DsgError::VariableLengthMismatch {
                    name: dtype.var_name().to_string(),
                    expected: num_obs,
                    found,
                });
            }
            match dtype.data_class() {
                DataClass::Integer => {
                    let values = var.get_values::<i32, _>(..)?;
                    for (record, v) in records.iter_mut().zip(values) {
                        record.set_value(&dtype, Value::Int(v))?;
                    }
                }
                DataClass::Double => {
                    let values = var.get_values::<f64, _>(..)?;
                    for (record, v) in records.iter_mut().zip(values) {
                        let v = if v.is_finite() { v } else { FP_MISSING_VALUE };
                        record.set_value(&dtype, Value::Double(v))?;
                    }
                }
                DataClass::Character => {
                    let cells = var.get_values::<NcChar, _>(..)?;
                    for (record, c) in records.iter_mut().zip(cells) {
                        record.set_value(&dtype, Value::Char(c.to_char()))?;
                    }
                }
                DataClass::String | DataClass::Date => {
                    return Err(DsgError::Config(format!(
                        "data registries do not support {} columns ('{}')",
                        dtype.data_class(),
                        dtype.var_name()
                    )));
                }
            }
        }

        self.data = records;
        Ok(not_found)
    }

    /// All values of one integer per-observation variable
    pub fn read_int_values(&self, var_name: &str) -> Result<Vec<i32>> {
        let file = netcdf::open(&self.path)?;
        let var = file
            .variable(var_name)
            .ok_or_else(|| DsgError::VariableNotFound(var_name.to_string()))?;
        Ok(var.get_values::<i32, _>(..)?)
    }

    /// All values of one floating-point per-observation variable, with
    /// non-finite cells folded onto the missing-value sentinel
    pub fn read_double_values(&self, var_name: &str) -> Result<Vec<f64>> {
        let file = netcdf::open(&self.path)?;
        let var = file
            .variable(var_name)
            .ok_or_else(|| DsgError::VariableNotFound(var_name.to_string()))?;
        let values = var.get_values::<f64, _>(..)?;
        Ok(values
            .into_iter()
            .map(|v| if v.is_finite() { v } else { FP_MISSING_VALUE })
            .collect())
    }

    /// All values of one character per-observation variable
    pub fn read_char_values(&self, var_name: &str) -> Result<Vec<char>> {
        let file = netcdf::open(&self.path)?;
        let var = file
            .variable(var_name)
            .ok_or_else(|| DsgError::VariableNotFound(var_name.to_string()))?;
        let cells = var.get_values::<NcChar, _>(..)?;
        Ok(cells.into_iter().map(NcChar::to_char).collect())
    }

    /// Overwrite one dataset-level string variable in place. The value must
    /// fit the file's fixed string width.
    pub fn update_string_var(&self, var_name: &str, value: &str) -> Result<()> {
        let mut file = netcdf::append(&self.path)?;
        let mut var = file
            .variable_mut(var_name)
            .ok_or_else(|| DsgError::VariableNotFound(var_name.to_string()))?;
        let width = var
            .dimensions()
            .get(1)
            .map(|d| d.len())
            .ok_or_else(|| DsgError::Config(format!("variable '{}' is not a string", var_name)))?;
        if value.len() > width {
            return Err(DsgError::StringTooLong {
                name: var_name.to_string(),
                value: value.to_string(),
                width,
            });
        }
        var.put_values::<NcChar, _>(&string_to_chars(value, width), ..)?;
        Ok(())
    }

    /// The dataset QC flag stored in the file
    pub fn get_qc_flag(&self) -> Result<char> {
        let file = netcdf::open(&self.path)?;
        let var = file
            .variable(QC_FLAG_VARNAME)
            .ok_or_else(|| DsgError::VariableNotFound(QC_FLAG_VARNAME.to_string()))?;
        let cells = var.get_values::<NcChar, _>(..)?;
        cells
            .first()
            .map(|c| c.to_char())
            .ok_or_else(|| DsgError::MissingData("the QC flag variable is empty".to_string()))
    }

    /// Overwrite the dataset QC flag in place
    pub fn update_qc_flag(&mut self, flag: char) -> Result<()> {
        {
            let mut file = netcdf::append(&self.path)?;
            let mut var = file
                .variable_mut(QC_FLAG_VARNAME)
                .ok_or_else(|| DsgError::VariableNotFound(QC_FLAG_VARNAME.to_string()))?;
            var.put_values::<NcChar, _>(&[NcChar::from_char(flag)], (0..1, 0..1))?;
        }
        if let Some(metadata) = self.metadata.as_mut() {
            metadata.set_qc_flag(Some(flag));
        }
        debug!(path = %self.path.display(), flag = %flag, "updated dataset QC flag");
        Ok(())
    }

    /// Rebuild the dataset-level region summary from the per-observation
    /// region IDs and store it in the file. Returns the recomputed summary:
    /// the sorted distinct region IDs, blanks left out.
    pub fn recompute_all_region_ids(&mut self) -> Result<String> {
        let mut ids: Vec<char> = self.read_char_values(REGION_ID_VARNAME)?;
        ids.sort_unstable();
        ids.dedup();
        let summary: String = ids.into_iter().filter(|c| !c.is_whitespace()).collect();
        self.update_string_var(ALL_REGION_IDS_VARNAME, &summary)?;
        if let Some(metadata) = self.metadata.as_mut() {
            metadata.set_all_region_ids(Some(&summary));
        }
        Ok(summary)
    }

    /// Longitude, latitude, and time columns in observation order
    pub fn read_lon_lat_times(&self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let lons = self.read_double_values(LONGITUDE_VARNAME)?;
        let lats = self.read_double_values(LATITUDE_VARNAME)?;
        let times = self.read_double_values(SAMPLE_TIME_VARNAME)?;
        if lats.len() != lons.len() || times.len() != lons.len() {
            return Err(DsgError::VariableLengthMismatch {
                name: SAMPLE_TIME_VARNAME.to_string(),
                expected: lons.len(),
                found: times.len().min(lats.len()),
            });
        }
        Ok((lons, lats, times))
    }

    /// Position, time, SST, and recommended fCO2 columns in observation
    /// order, for building QC displays without decoding whole records
    #[allow(clippy::type_complexity)]
    pub fn read_lon_lat_time_sst_fco2(
        &self,
    ) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>)> {
        let (lons, lats, times) = self.read_lon_lat_times()?;
        let ssts = self.read_double_values(SST_VARNAME)?;
        let fco2s = self.read_double_values(FCO2_REC_VARNAME)?;
        if ssts.len() != lons.len() || fco2s.len() != lons.len() {
            return Err(DsgError::VariableLengthMismatch {
                name: FCO2_REC_VARNAME.to_string(),
                expected: lons.len(),
                found: fco2s.len().min(ssts.len()),
            });
        }
        Ok((lons, lats, times, ssts, fco2s))
    }
}

fn var_length(var: &netcdf::Variable) -> usize {
    var.dimensions().iter().map(|d| d.len()).product()
}

/// Bytes of a fixed-width NC_CHAR cell run, NUL padding and trailing blanks
/// stripped
fn chars_to_string(cells: &[NcChar]) -> String {
    let s: String = cells
        .iter()
        .take_while(|c| c.0 != 0)
        .map(|c| c.to_char())
        .collect();
    s.trim_end().to_string()
}

fn string_to_chars(value: &str, width: usize) -> Vec<NcChar> {
    let mut cells: Vec<NcChar> = value.chars().map(NcChar::from_char).collect();
    cells.resize(width, NcChar(0));
    cells
}

fn descriptive_attributes(var: &mut netcdf::VariableMut, dtype: &DataType) -> Result<()> {
    var.put_attribute("long_name", dtype.display_name())?;
    if !dtype.standard_name().is_empty() {
        var.put_attribute("standard_name", dtype.standard_name())?;
    }
    if !dtype.category_name().is_empty() {
        var.put_attribute("ioos_category", dtype.category_name())?;
    }
    if let Some(unit) = dtype.units().first() {
        if !unit.is_empty() {
            var.put_attribute("units", unit.as_str())?;
        }
    }
    Ok(())
}

fn write_metadata_vars(
    file: &mut netcdf::FileMut,
    metadata: &DsgMetadata,
    string_length: usize,
) -> Result<()> {
    for dtype in metadata.sorted_types() {
        let value = metadata.value_for(dtype.var_name()).cloned().ok_or_else(|| {
            DsgError::MissingData(format!(
                "metadata value for '{}' is absent",
                dtype.var_name()
            ))
        })?;
        match value {
            Value::Str(s) => {
                let mut var = file
                    .add_variable::<NcChar>(dtype.var_name(), &[TRAJECTORY_DIM, STRING_LENGTH_DIM])?;
                descriptive_attributes(&mut var, &dtype)?;
                if dtype.var_name() == EXPOCODE_VARNAME {
                    var.put_attribute("cf_role", "trajectory_id")?;
                }
                if s.len() > string_length {
                    return Err(DsgError::StringTooLong {
                        name: dtype.var_name().to_string(),
                        value: s,
                        width: string_length,
                    });
                }
                var.put_values::<NcChar, _>(&string_to_chars(&s, string_length), ..)?;
            }
            Value::Char(c) => {
                let mut var = file
                    .add_variable::<NcChar>(dtype.var_name(), &[TRAJECTORY_DIM, CHAR_LENGTH_DIM])?;
                descriptive_attributes(&mut var, &dtype)?;
                var.put_values::<NcChar, _>(&[NcChar::from_char(c)], ..)?;
            }
            Value::Double(v) => {
                let mut var = file.add_variable::<f64>(dtype.var_name(), &[TRAJECTORY_DIM])?;
                var.set_fill_value(FP_MISSING_VALUE)?;
                var.put_attribute("missing_value", FP_MISSING_VALUE)?;
                descriptive_attributes(&mut var, &dtype)?;
                var.put_values::<f64, _>(&[v], ..)?;
            }
            Value::Date(date) => {
                let mut var = file.add_variable::<f64>(dtype.var_name(), &[TRAJECTORY_DIM])?;
                var.set_fill_value(FP_MISSING_VALUE)?;
                var.put_attribute("missing_value", FP_MISSING_VALUE)?;
                var.put_attribute("long_name", dtype.display_name())?;
                var.put_attribute("units", "seconds since 1970-01-01T00:00:00Z")?;
                var.put_attribute("time_origin", "01-JAN-1970 00:00:00")?;
                let seconds = if date == date_missing_value() {
                    FP_MISSING_VALUE
                } else {
                    date.timestamp() as f64
                };
                var.put_values::<f64, _>(&[seconds], ..)?;
            }
            Value::Int(_) => {
                return Err(DsgError::Config(format!(
                    "metadata records do not support Integer columns ('{}')",
                    dtype.var_name()
                )));
            }
        }
    }
    Ok(())
}

fn write_num_obs_var(file: &mut netcdf::FileMut, num_obs: usize) -> Result<()> {
    let mut var = file.add_variable::<i32>(NUM_OBS_VARNAME, &[TRAJECTORY_DIM])?;
    var.put_attribute("long_name", "Number of observations")?;
    var.put_attribute("sample_dimension", OBS_DIM)?;
    var.put_values::<i32, _>(&[num_obs as i32], ..)?;
    Ok(())
}

fn write_data_vars(file: &mut netcdf::FileMut, data: &[DataRecord]) -> Result<()> {
    let missing = |name: &str| {
        DsgError::MissingData(format!("column '{}' is absent from a data record", name))
    };
    for dtype in data[0].sorted_types() {
        match dtype.data_class() {
            DataClass::Integer => {
                let mut var = file.add_variable::<i32>(dtype.var_name(), &[OBS_DIM])?;
                var.set_fill_value(INT_MISSING_VALUE)?;
                var.put_attribute("missing_value", INT_MISSING_VALUE)?;
                descriptive_attributes(&mut var, &dtype)?;
                let mut column = Vec::with_capacity(data.len());
                for record in data {
                    let v = record
                        .value_for(dtype.var_name())
                        .and_then(Value::as_int)
                        .ok_or_else(|| missing(dtype.var_name()))?;
                    column.push(v);
                }
                var.put_values::<i32, _>(&column, ..)?;
            }
            DataClass::Double => {
                let mut var = file.add_variable::<f64>(dtype.var_name(), &[OBS_DIM])?;
                var.set_fill_value(FP_MISSING_VALUE)?;
                var.put_attribute("missing_value", FP_MISSING_VALUE)?;
                descriptive_attributes(&mut var, &dtype)?;
                if dtype.key() == "sampledepth" {
                    var.put_attribute("positive", "down")?;
                }
                let mut column = Vec::with_capacity(data.len());
                for record in data {
                    let v = record
                        .value_for(dtype.var_name())
                        .and_then(Value::as_double)
                        .ok_or_else(|| missing(dtype.var_name()))?;
                    column.push(if v.is_finite() { v } else { FP_MISSING_VALUE });
                }
                var.put_values::<f64, _>(&column, ..)?;
            }
            DataClass::Character => {
                let mut var =
                    file.add_variable::<NcChar>(dtype.var_name(), &[OBS_DIM, CHAR_LENGTH_DIM])?;
                descriptive_attributes(&mut var, &dtype)?;
                let mut column = Vec::with_capacity(data.len());
                for record in data {
                    let c = record
                        .value_for(dtype.var_name())
                        .and_then(Value::as_char)
                        .ok_or_else(|| missing(dtype.var_name()))?;
                    column.push(NcChar::from_char(c));
                }
                var.put_values::<NcChar, _>(&column, ..)?;
            }
            DataClass::String | DataClass::Date => {
                return Err(DsgError::Config(format!(
                    "data registries do not support {} columns ('{}')",
                    dtype.data_class(),
                    dtype.var_name()
                )));
            }
        }
    }
    Ok(())
}
