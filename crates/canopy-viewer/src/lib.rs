pub mod error;
pub mod ppm;
pub mod report;
pub mod runner;

pub use error::ViewerError;
pub use runner::{ViewerOptions, ViewerRun};
