mod core;
mod grid;

pub use core::Config;
pub use grid::{BucketConfig, GridConfig, GridConfigError};
