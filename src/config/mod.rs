//! Configuration loading and management for the payroll engine.
//!
//! This module loads payroll schedules from YAML files: schedule metadata,
//! INSS rates and caps, and the IRT bracket table. A built-in Angolan
//! schedule is available through [`PayrollConfig::angola_default`].
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/angola").unwrap();
//! println!("Loaded schedule: {}", config.schedule().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{IrtBracketsFile, PayrollConfig, ScheduleFile, ScheduleMetadata};
