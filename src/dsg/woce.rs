//! WOCE flag assignment against the per-observation flag variables.
//!
//! Two entry points with deliberately different matching rules: direct
//! assignment trusts the event's row numbers and only sanity-checks the
//! stored position and time against coarse tolerances, while reconciliation
//! ignores row numbers and relocates each flag by position and time under a
//! much tighter tolerance.

use tracing::{debug, warn};
use validator::Validate;

use crate::error::{DsgError, Result};
use crate::models::{WoceEvent, WoceLocation};
use crate::utils::constants::{
    close_to, longitudes_close, FP_MISSING_VALUE, MAX_ABSOLUTE_ERROR, MAX_RELATIVE_ERROR,
    WOCE_LATITUDE_TOLERANCE, WOCE_LONGITUDE_TOLERANCE, WOCE_RECONCILE_TOLERANCE,
    WOCE_TIME_TOLERANCE,
};

use super::file::DsgFile;
use super::{NcChar, REGION_ID_VARNAME};

impl DsgFile {
    /// Write a WOCE event's flag into the file at the rows the event names.
    ///
    /// Each location must carry a row number; the stored longitude,
    /// latitude, time, and (when the event names a data variable) data
    /// value at that row must agree with the location within the coarse
    /// assignment tolerances. Returns one message per location that could
    /// not be flagged; locations that match are flagged even when others
    /// fail.
    pub fn assign_woce_flags(&self, event: &WoceEvent) -> Result<Vec<String>> {
        event.validate()?;
        let (lons, lats, times) = self.read_lon_lat_times()?;
        let data_values = match event.data_var_name.as_deref() {
            Some(name) => {
                let values = self.read_double_values(name)?;
                if values.len() != lons.len() {
                    return Err(DsgError::VariableLengthMismatch {
                        name: name.to_string(),
                        expected: lons.len(),
                        found: values.len(),
                    });
                }
                Some(values)
            }
            None => None,
        };

        let mut issues = Vec::new();
        let mut file = netcdf::append(self.path())?;
        let mut var = file
            .variable_mut(event.flag_name.as_str())
            .ok_or_else(|| DsgError::VariableNotFound(event.flag_name.as_str().to_string()))?;
        let flag = NcChar::from_char(event.flag_value);

        for location in &event.locations {
            let row = match location.row {
                Some(row) if row < lons.len() => row,
                Some(row) => {
                    issues.push(format!(
                        "row {} is outside the {} observations in the file",
                        row,
                        lons.len()
                    ));
                    continue;
                }
                None => {
                    issues.push(format!(
                        "location ({}, {}) at time {} carries no row number",
                        location.longitude,
                        location.latitude,
                        location.time
                    ));
                    continue;
                }
            };
            if let Some(issue) = row_mismatch(location, row, event, &lons, &lats, &times, &data_values)
            {
                warn!(row, %issue, "skipping WOCE flag");
                issues.push(issue);
                continue;
            }
            var.put_values::<NcChar, _>(&[flag], (row..row + 1, 0..1))?;
        }
        debug!(
            flag_name = event.flag_name.as_str(),
            flag = %event.flag_value,
            flagged = event.locations.len() - issues.len(),
            skipped = issues.len(),
            "assigned WOCE flags"
        );
        Ok(issues)
    }

    /// Re-place a WOCE event's flags in a regenerated file whose rows may
    /// have moved.
    ///
    /// Row numbers in the event are ignored. Each location is matched by
    /// longitude, latitude, and time under the tight reconciliation
    /// tolerance, scanning round-robin from just past the previously
    /// matched row so that duplicate positions land on distinct rows. Rows
    /// already claimed by this event are never reused. When `update_event`
    /// is set, matched locations get their row number and region ID
    /// rewritten from the file. Returns the locations that matched no row.
    pub fn reconcile_woce_flags(
        &self,
        event: &mut WoceEvent,
        update_event: bool,
    ) -> Result<Vec<WoceLocation>> {
        event.validate()?;
        let (lons, lats, times) = self.read_lon_lat_times()?;
        if lons.is_empty() {
            return Err(DsgError::MissingData(
                "the file holds no observations to reconcile against".to_string(),
            ));
        }
        let regions = if update_event {
            Some(self.read_char_values(REGION_ID_VARNAME)?)
        } else {
            None
        };

        let mut file = netcdf::append(self.path())?;
        let mut var = file
            .variable_mut(event.flag_name.as_str())
            .ok_or_else(|| DsgError::VariableNotFound(event.flag_name.as_str().to_string()))?;
        let flag = NcChar::from_char(event.flag_value);

        let num_obs = lons.len();
        let mut claimed = vec![false; num_obs];
        let mut last_match = num_obs - 1;
        let mut unlocated = Vec::new();

        for location in event.locations.iter_mut() {
            let mut matched = None;
            for step in 1..=num_obs {
                let row = (last_match + step) % num_obs;
                if claimed[row] {
                    continue;
                }
                let tol = WOCE_RECONCILE_TOLERANCE;
                if longitudes_close(lons[row], location.longitude, 0.0, tol)
                    && close_to(lats[row], location.latitude, 0.0, tol)
                    && close_to(times[row], location.time, 0.0, tol)
                {
                    matched = Some(row);
                    break;
                }
            }
            match matched {
                Some(row) => {
                    claimed[row] = true;
                    last_match = row;
                    var.put_values::<NcChar, _>(&[flag], (row..row + 1, 0..1))?;
                    if update_event {
                        location.row = Some(row);
                        if let Some(regions) = &regions {
                            location.region_id = regions[row];
                        }
                    }
                }
                None => unlocated.push(location.clone()),
            }
        }
        Ok(unlocated)
    }
}

fn row_mismatch(
    location: &WoceLocation,
    row: usize,
    event: &WoceEvent,
    lons: &[f64],
    lats: &[f64],
    times: &[f64],
    data_values: &Option<Vec<f64>>,
) -> Option<String> {
    if !longitudes_close(
        lons[row],
        location.longitude,
        0.0,
        WOCE_LONGITUDE_TOLERANCE,
    ) {
        return Some(format!(
            "row {}: stored longitude {} does not match {}",
            row,
            lons[row],
            location.longitude
        ));
    }
    if !close_to(lats[row], location.latitude, 0.0, WOCE_LATITUDE_TOLERANCE) {
        return Some(format!(
            "row {}: stored latitude {} does not match {}",
            row,
            lats[row],
            location.latitude
        ));
    }
    if !close_to(times[row], location.time, 0.0, WOCE_TIME_TOLERANCE) {
        return Some(format!(
            "row {}: stored time {} does not match {}",
            row,
            times[row],
            location.time
        ));
    }
    if let Some(values) = data_values {
        let stored = values[row];
        let given = location.data_value;
        let either_missing =
            close_to(stored, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR)
                || close_to(given, FP_MISSING_VALUE, MAX_RELATIVE_ERROR, MAX_ABSOLUTE_ERROR);
        if !either_missing
            && !close_to(stored, given, event.relative_tolerance, event.absolute_tolerance)
        {
            return Some(format!(
                "row {}: stored data value {} does not match {}",
                row, stored, given
            ));
        }
    }
    None
}
