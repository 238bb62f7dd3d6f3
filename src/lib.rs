pub mod cli;
pub mod dsg;
pub mod error;
pub mod models;
pub mod processors;
pub mod types;
pub mod utils;

pub use error::{DsgError, Result};
