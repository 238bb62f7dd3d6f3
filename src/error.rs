use thiserror::Error;

pub type Result<T> = std::result::Result<T, DsgError>;

#[derive(Error, Debug)]
pub enum DsgError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate data type: '{name}' collides on key '{key}'")]
    DuplicateType { name: String, key: String },

    #[error("Data type registry is empty")]
    EmptyRegistry,

    #[error("Column {index} has the UNKNOWN data type; assign a type before processing")]
    UnknownColumnType { index: usize },

    #[error("Column '{name}' is not a recognized data type")]
    UnrecognizedColumnType { name: String },

    #[error("Data class mismatch for '{name}': given {given}, registry has {known}")]
    DataClassMismatch {
        name: String,
        given: String,
        known: String,
    },

    #[error("Row has {found} values but {expected} column types were given")]
    RowWidthMismatch { expected: usize, found: usize },

    #[error("Type '{name}' is not part of this record's schema")]
    TypeNotInSchema { name: String },

    #[error("Invalid value for '{name}': '{value}' cannot be parsed as {class}")]
    InvalidValue {
        name: String,
        value: String,
        class: String,
    },

    #[error("Invalid type descriptor for '{var_name}': {reason}")]
    InvalidTypeDescriptor { var_name: String, reason: String },

    #[error("Invalid {kind} index {index}; must be less than {limit}")]
    IndexOutOfBounds {
        kind: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Unsupported unit conversion from '{from}' to '{to}'")]
    UnsupportedUnitConversion { from: String, to: String },

    #[error("Invalid sample timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Variable '{0}' not found in DSG file")]
    VariableNotFound(String),

    #[error("Variable '{name}' has {found} values; expected {expected}")]
    VariableLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Value '{value}' is too long for variable '{name}' (width {width})")]
    StringTooLong {
        name: String,
        value: String,
        width: usize,
    },

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),
}
