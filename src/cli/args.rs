use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "socat-dsg")]
#[command(about = "Typed-record NetCDF DSG file engine for surface ocean CO2 cruise datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an uploaded cruise data table into a DSG file
    Convert {
        #[arg(short, long, help = "Input CSV data file with a header row")]
        data_file: PathBuf,

        #[arg(short, long, help = "JSON file of dataset metadata values by variable name")]
        metadata_file: PathBuf,

        #[arg(
            short,
            long,
            help = "Output DSG file path [default: <expocode>.nc]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Fail on unrecognized data columns")]
        strict: bool,
    },

    /// Display the metadata stored in a DSG file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, default_value = "false", help = "Emit metadata as JSON")]
        json: bool,

        #[arg(short, long, default_value = "0", help = "Observation rows to print")]
        sample: usize,
    },

    /// Overwrite the dataset QC flag in a DSG file
    SetQc {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short = 'q', long, help = "New dataset QC flag character")]
        flag: char,
    },
}
