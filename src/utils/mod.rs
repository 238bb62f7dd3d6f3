pub mod constants;
pub mod names;
pub mod progress;

pub use constants::*;
pub use names::normalize_key;
pub use progress::ProgressReporter;
