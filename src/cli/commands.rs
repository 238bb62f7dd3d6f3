use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::dsg::DsgFile;
use crate::error::{DsgError, Result};
use crate::models::{DsgMetadata, Value};
use crate::processors::{records_from_std_array, DataColumn, StandardUnitConverter, StdDataArray};
use crate::types::TypeRegistry;
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_ref())?;

    match cli.command {
        Commands::Convert {
            data_file,
            metadata_file,
            output_file,
            strict,
        } => {
            println!("Converting cruise data to a DSG file...");
            println!("Data file: {}", data_file.display());
            println!("Metadata file: {}", metadata_file.display());

            let data_registry = TypeRegistry::for_data_files()?;
            let metadata_registry = TypeRegistry::for_metadata_files()?;

            let progress = ProgressReporter::new_spinner("Standardizing data...", false);
            let (columns, rows) = read_data_table(&data_file, &data_registry, strict)?;
            let array = StdDataArray::from_table(columns, &rows, &StandardUnitConverter)?;
            let records = records_from_std_array(&data_registry, &array)?;
            progress.finish_with_message(&format!("Standardized {} observations", records.len()));

            let mut metadata = read_metadata_file(&metadata_file, &metadata_registry)?;
            metadata.assign_bounds_from_data(&records)?;

            let output_file = output_file
                .unwrap_or_else(|| PathBuf::from(format!("{}.nc", metadata.expocode())));
            let mut dsg = DsgFile::new(&output_file);
            dsg.create(metadata, records)?;

            println!("Wrote {}", output_file.display());
            println!("Conversion complete!");
        }

        Commands::Info { file, json, sample } => {
            let metadata_registry = TypeRegistry::for_metadata_files()?;
            let mut dsg = DsgFile::new(&file);
            let not_found = dsg.read_metadata(&metadata_registry)?;
            let metadata = dsg
                .metadata()
                .ok_or_else(|| DsgError::MissingData("no metadata was read".to_string()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(metadata)?);
            } else {
                println!("DSG file: {}", file.display());
                println!("Expocode:      {}", metadata.expocode());
                println!("Dataset name:  {}", metadata.dataset_name());
                println!("Vessel:        {}", metadata.vessel_name());
                println!("Organization:  {}", metadata.organization());
                println!("Investigators: {}", metadata.investigators());
                println!("QC flag:       '{}'", metadata.qc_flag());
                println!("Region IDs:    {}", metadata.all_region_ids());
                println!(
                    "Longitude:     {} to {}",
                    metadata.westmost_longitude(),
                    metadata.eastmost_longitude()
                );
                println!(
                    "Latitude:      {} to {}",
                    metadata.southmost_latitude(),
                    metadata.northmost_latitude()
                );
                println!(
                    "Time:          {} to {}",
                    metadata.begin_time(),
                    metadata.end_time()
                );
            }
            if !not_found.is_empty() {
                println!("Variables absent from the file: {}", not_found.join(", "));
            }

            if sample > 0 {
                let (lons, lats, times, ssts, fco2s) = dsg.read_lon_lat_time_sst_fco2()?;
                println!("\n{:>10} {:>10} {:>14} {:>9} {:>9}", "lon", "lat", "time", "SST", "fCO2");
                for row in 0..sample.min(lons.len()) {
                    println!(
                        "{:>10.4} {:>10.4} {:>14.1} {:>9.3} {:>9.3}",
                        lons[row], lats[row], times[row], ssts[row], fco2s[row]
                    );
                }
            }
        }

        Commands::SetQc { file, flag } => {
            let mut dsg = DsgFile::new(&file);
            let previous = dsg.get_qc_flag()?;
            dsg.update_qc_flag(flag)?;
            println!(
                "Updated QC flag of {} from '{}' to '{}'",
                file.display(),
                previous,
                flag
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = std::sync::Arc::new(File::create(path)?);
            builder.with_writer(file).with_ansi(false).init();
        }
        None => builder.init(),
    }
    Ok(())
}

/// Read a CSV upload, keeping the columns whose header names the registry
/// recognizes. With `strict` set, an unrecognized header fails the read.
fn read_data_table(
    path: &PathBuf,
    registry: &TypeRegistry,
    strict: bool,
) -> Result<(Vec<DataColumn>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut columns = Vec::new();
    let mut kept_indices = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        match registry.lookup(header) {
            Some(dtype) => {
                columns.push(DataColumn::new(dtype.clone()));
                kept_indices.push(index);
            }
            None if strict => {
                return Err(DsgError::UnrecognizedColumnType {
                    name: header.to_string(),
                });
            }
            None => warn!(column = header, "skipping unrecognized data column"),
        }
    }
    if columns.is_empty() {
        return Err(DsgError::MissingData(format!(
            "no recognized data columns in {}",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = kept_indices
            .iter()
            .map(|&i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }
    Ok((columns, rows))
}

/// Read a JSON object of metadata values keyed by variable name and parse
/// each against the registry's type for that name. Unrecognized names are
/// skipped with a warning.
fn read_metadata_file(path: &PathBuf, registry: &TypeRegistry) -> Result<DsgMetadata> {
    let file = File::open(path)?;
    let raw: BTreeMap<String, String> = serde_json::from_reader(file)?;

    let mut metadata = DsgMetadata::empty(registry)?;
    for (name, value) in &raw {
        let dtype = match registry.lookup(name) {
            Some(dtype) => dtype.clone(),
            None => {
                warn!(name = name.as_str(), "skipping unrecognized metadata value");
                continue;
            }
        };
        metadata.set_value(&dtype, Value::parse(&dtype, value)?)?;
    }
    Ok(metadata)
}
