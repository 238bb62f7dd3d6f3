//! Standard column types recognized by the dashboard.
//!
//! Three profiles exist: types users may assign to uploaded columns,
//! dataset-level types stored in metadata files, and per-observation types
//! stored in data files. Registries are built from these lists at startup;
//! there is no process-wide static registry.

use super::data_type::{DataClass, DataType};

/// Marker type for columns whose meaning has not been identified yet
pub fn unknown() -> DataType {
    DataType::new("unknown", "(unknown)", DataClass::String)
        .with_description("unidentified column; must be assigned before processing")
        .with_sort_order(0.1)
}

/// Marker type for columns the user wants carried along but not interpreted
pub fn other() -> DataType {
    DataType::new("other", "other", DataClass::String)
        .with_description("column ignored by processing")
        .with_sort_order(0.2)
}

pub fn expocode() -> DataType {
    DataType::new("expocode", "expocode", DataClass::String)
        .with_description("expedition code: NODC ship code plus cast date")
        .with_category_name("Identifier")
        .with_sort_order(1.0)
}

pub fn dataset_name() -> DataType {
    DataType::new("dataset_name", "Dataset Name", DataClass::String)
        .with_description("name given to this dataset by the investigators")
        .with_category_name("Identifier")
        .with_sort_order(2.0)
}

pub fn vessel_name() -> DataType {
    DataType::new("vessel_name", "Vessel Name", DataClass::String)
        .with_description("name of the ship or platform")
        .with_standard_name("platform_name")
        .with_category_name("Identifier")
        .with_sort_order(3.0)
}

pub fn organization() -> DataType {
    DataType::new("organization", "Organization", DataClass::String)
        .with_description("organization or institution of the investigators")
        .with_category_name("Identifier")
        .with_sort_order(4.0)
}

pub fn investigators() -> DataType {
    DataType::new("investigators", "Investigators", DataClass::String)
        .with_description("principal investigators for this dataset")
        .with_category_name("Identifier")
        .with_sort_order(5.0)
}

pub fn socat_doi() -> DataType {
    DataType::new("socat_doi", "SOCAT DOI", DataClass::String)
        .with_description("DOI of this dataset in the SOCAT collection")
        .with_category_name("Identifier")
        .with_sort_order(6.0)
}

pub fn socat_version() -> DataType {
    DataType::new("socat_version", "SOCAT Version", DataClass::String)
        .with_description("SOCAT version this dataset was submitted to")
        .with_category_name("Identifier")
        .with_sort_order(7.0)
}

pub fn qc_flag() -> DataType {
    DataType::new("qc_flag", "QC Flag", DataClass::Character)
        .with_description("dataset-level quality control flag")
        .with_category_name("Quality")
        .with_sort_order(8.0)
}

pub fn all_region_ids() -> DataType {
    DataType::new("all_region_ids", "All Region IDs", DataClass::String)
        .with_description("sorted unique region IDs visited by this dataset")
        .with_category_name("Location")
        .with_sort_order(9.0)
}

pub fn westmost_longitude() -> DataType {
    DataType::new("westmost_longitude", "Westernmost Longitude", DataClass::Double)
        .with_description("westernmost longitude of the cruise track")
        .with_standard_name("geospatial_lon_min")
        .with_category_name("Location")
        .with_units(&["degrees_east"])
        .with_sort_order(10.0)
}

pub fn eastmost_longitude() -> DataType {
    DataType::new("eastmost_longitude", "Easternmost Longitude", DataClass::Double)
        .with_description("easternmost longitude of the cruise track")
        .with_standard_name("geospatial_lon_max")
        .with_category_name("Location")
        .with_units(&["degrees_east"])
        .with_sort_order(11.0)
}

pub fn southmost_latitude() -> DataType {
    DataType::new("southmost_latitude", "Southernmost Latitude", DataClass::Double)
        .with_description("southernmost latitude of the cruise track")
        .with_standard_name("geospatial_lat_min")
        .with_category_name("Location")
        .with_units(&["degrees_north"])
        .with_sort_order(12.0)
}

pub fn northmost_latitude() -> DataType {
    DataType::new("northmost_latitude", "Northernmost Latitude", DataClass::Double)
        .with_description("northernmost latitude of the cruise track")
        .with_standard_name("geospatial_lat_max")
        .with_category_name("Location")
        .with_units(&["degrees_north"])
        .with_sort_order(13.0)
}

pub fn time_coverage_start() -> DataType {
    DataType::new("time_coverage_start", "Begin Time", DataClass::Date)
        .with_description("time of the first observation")
        .with_standard_name("time_coverage_start")
        .with_category_name("Time")
        .with_sort_order(14.0)
}

pub fn time_coverage_end() -> DataType {
    DataType::new("time_coverage_end", "End Time", DataClass::Date)
        .with_description("time of the last observation")
        .with_standard_name("time_coverage_end")
        .with_category_name("Time")
        .with_sort_order(15.0)
}

pub fn sample_number() -> DataType {
    DataType::new("sample_number", "Sample Number", DataClass::Integer)
        .with_description("sequence number of the observation in the uploaded data")
        .with_category_name("Identifier")
        .with_sort_order(20.0)
}

pub fn year() -> DataType {
    DataType::new("year", "Year", DataClass::Integer)
        .with_description("year of the observation time")
        .with_category_name("Time")
        .with_sort_order(21.0)
}

pub fn month() -> DataType {
    DataType::new("month", "Month of Year", DataClass::Integer)
        .with_description("month of the observation time")
        .with_category_name("Time")
        .with_sort_order(22.0)
}

pub fn day() -> DataType {
    DataType::new("day", "Day of Month", DataClass::Integer)
        .with_description("day of the observation time")
        .with_category_name("Time")
        .with_sort_order(23.0)
}

pub fn hour() -> DataType {
    DataType::new("hour", "Hour of Day", DataClass::Integer)
        .with_description("hour of the observation time")
        .with_category_name("Time")
        .with_sort_order(24.0)
}

pub fn minute() -> DataType {
    DataType::new("minute", "Minute of Hour", DataClass::Integer)
        .with_description("minute of the observation time")
        .with_category_name("Time")
        .with_sort_order(25.0)
}

pub fn second() -> DataType {
    DataType::new("second", "Second of Minute", DataClass::Double)
        .with_description("second of the observation time")
        .with_category_name("Time")
        .with_units(&["seconds"])
        .with_sort_order(26.0)
}

/// Observation time, always recomputed from the date and time components
/// when a DSG file is written
pub fn sample_time() -> DataType {
    DataType::new("time", "Time", DataClass::Double)
        .with_description("observation time in seconds since 1970-01-01T00:00:00Z")
        .with_standard_name("time")
        .with_category_name("Time")
        .with_units(&["seconds since 1970-01-01T00:00:00Z"])
        .with_sort_order(27.0)
}

pub fn longitude() -> DataType {
    DataType::new("longitude", "Longitude", DataClass::Double)
        .with_description("longitude of the observation")
        .with_standard_name("longitude")
        .with_category_name("Location")
        .with_units(&["degrees_east"])
        .with_sort_order(30.0)
}

pub fn latitude() -> DataType {
    DataType::new("latitude", "Latitude", DataClass::Double)
        .with_description("latitude of the observation")
        .with_standard_name("latitude")
        .with_category_name("Location")
        .with_units(&["degrees_north"])
        .with_sort_order(31.0)
}

pub fn sample_depth() -> DataType {
    DataType::new("sample_depth", "Sample Depth", DataClass::Double)
        .with_description("depth of the water sample")
        .with_standard_name("depth")
        .with_category_name("Bathymetry")
        .with_units(&["meters", "kilometers"])
        .with_sort_order(32.0)
}

pub fn salinity() -> DataType {
    DataType::new("sal", "Salinity", DataClass::Double)
        .with_description("measured sea surface salinity on the practical salinity scale")
        .with_standard_name("sea_surface_salinity")
        .with_category_name("Salinity")
        .with_units(&["PSU"])
        .with_sort_order(33.0)
}

pub fn sst() -> DataType {
    DataType::new("temp", "SST", DataClass::Double)
        .with_description("measured sea surface temperature")
        .with_standard_name("sea_surface_temperature")
        .with_category_name("Temperature")
        .with_units(&["degrees C", "degrees K", "degrees F"])
        .with_sort_order(34.0)
}

pub fn equ_temperature() -> DataType {
    DataType::new("temperature_equi", "T_equ", DataClass::Double)
        .with_description("water temperature inside the equilibrator")
        .with_standard_name("sea_water_temperature")
        .with_category_name("Temperature")
        .with_units(&["degrees C", "degrees K", "degrees F"])
        .with_sort_order(35.0)
}

pub fn atm_pressure() -> DataType {
    DataType::new("pressure_atm", "P_atm", DataClass::Double)
        .with_description("sea-level atmospheric pressure")
        .with_standard_name("air_pressure_at_sea_level")
        .with_category_name("Pressure")
        .with_units(&["hPa", "kPa", "mmHg"])
        .with_sort_order(36.0)
}

pub fn equ_pressure() -> DataType {
    DataType::new("pressure_equi", "P_equ", DataClass::Double)
        .with_description("pressure inside the equilibrator")
        .with_standard_name("water_pressure")
        .with_category_name("Pressure")
        .with_units(&["hPa", "kPa", "mmHg"])
        .with_sort_order(37.0)
}

pub fn xco2_water_sst() -> DataType {
    DataType::new("xCO2_water_sst_dry", "xCO2_water_SST_dry", DataClass::Double)
        .with_description("water xCO2 (dry air) at sea surface temperature")
        .with_standard_name("mole_fraction_of_carbon_dioxide_in_sea_water")
        .with_category_name("CO2")
        .with_units(&["umol/mol"])
        .with_sort_order(40.0)
}

pub fn xco2_water_equ() -> DataType {
    DataType::new("xCO2_water_equi_temp_dry", "xCO2_water_Tequ_dry", DataClass::Double)
        .with_description("water xCO2 (dry air) at equilibrator temperature")
        .with_standard_name("mole_fraction_of_carbon_dioxide_in_sea_water")
        .with_category_name("CO2")
        .with_units(&["umol/mol"])
        .with_sort_order(41.0)
}

/// The recommended fCO2 value selected by the automated evaluation
pub fn fco2_recommended() -> DataType {
    DataType::new("fCO2_recommended", "fCO2_rec", DataClass::Double)
        .with_description("recommended fCO2 value for this observation")
        .with_standard_name("surface_partial_pressure_of_carbon_dioxide_in_sea_water")
        .with_category_name("CO2")
        .with_units(&["uatm"])
        .with_sort_order(42.0)
}

/// Which measured CO2 quantity the recommended fCO2 was derived from
pub fn fco2_source() -> DataType {
    DataType::new("fCO2_source", "fCO2 Source", DataClass::Integer)
        .with_description("algorithm number used to derive the recommended fCO2")
        .with_category_name("CO2")
        .with_sort_order(43.0)
}

pub fn region_id() -> DataType {
    DataType::new("region_id", "Region ID", DataClass::Character)
        .with_description("single-character code of the oceanographic region")
        .with_category_name("Location")
        .with_sort_order(50.0)
}

pub fn woce_co2_water() -> DataType {
    DataType::new("WOCE_CO2_water", "WOCE CO2_water", DataClass::Character)
        .with_description("WOCE quality flag for the water CO2 measurement")
        .with_category_name("Quality")
        .with_sort_order(51.0)
}

pub fn woce_co2_atm() -> DataType {
    DataType::new("WOCE_CO2_atm", "WOCE CO2_atm", DataClass::Character)
        .with_description("WOCE quality flag for the atmospheric CO2 measurement")
        .with_category_name("Quality")
        .with_sort_order(52.0)
}

/// Types users may assign to uploaded data columns
pub fn user_column_types() -> Vec<DataType> {
    vec![
        unknown(),
        other(),
        expocode(),
        dataset_name(),
        vessel_name(),
        organization(),
        investigators(),
        year(),
        month(),
        day(),
        hour(),
        minute(),
        second(),
        longitude(),
        latitude(),
        sample_depth(),
        salinity(),
        sst(),
        equ_temperature(),
        atm_pressure(),
        equ_pressure(),
        xco2_water_sst(),
        xco2_water_equ(),
        woce_co2_water(),
        woce_co2_atm(),
    ]
}

/// Dataset-level types stored in metadata files
pub fn metadata_file_types() -> Vec<DataType> {
    vec![
        expocode(),
        dataset_name(),
        vessel_name(),
        organization(),
        investigators(),
        socat_doi(),
        socat_version(),
        qc_flag(),
        all_region_ids(),
        westmost_longitude(),
        eastmost_longitude(),
        southmost_latitude(),
        northmost_latitude(),
        time_coverage_start(),
        time_coverage_end(),
    ]
}

/// Per-observation types stored in data files
pub fn data_file_types() -> Vec<DataType> {
    vec![
        sample_number(),
        year(),
        month(),
        day(),
        hour(),
        minute(),
        second(),
        sample_time(),
        longitude(),
        latitude(),
        sample_depth(),
        salinity(),
        sst(),
        equ_temperature(),
        atm_pressure(),
        equ_pressure(),
        xco2_water_sst(),
        xco2_water_equ(),
        fco2_recommended(),
        fco2_source(),
        region_id(),
        woce_co2_water(),
        woce_co2_atm(),
    ]
}
