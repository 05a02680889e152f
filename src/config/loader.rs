//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! schedules from YAML files.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{BracketTable, InssRates};

use super::types::{IrtBracketsFile, PayrollConfig, ScheduleFile, ScheduleMetadata};

/// Loads and provides access to a payroll schedule.
///
/// # Directory Structure
///
/// ```text
/// config/angola/
/// ├── schedule.yaml       # Schedule metadata, INSS rates and caps
/// └── irt_brackets.yaml   # IRT brackets in ascending order
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/angola")?;
/// println!("Loaded schedule: {}", loader.schedule().name);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The bracket table or INSS rates are invalid (`ConfigurationError`)
    ///
    /// Boundaries where the table's fixed amounts jump are logged as
    /// warnings; statutory tables may contain them.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let schedule_file = Self::load_yaml::<ScheduleFile>(&path.join("schedule.yaml"))?;

        let brackets_path = path.join("irt_brackets.yaml");
        let brackets_file = Self::load_yaml::<IrtBracketsFile>(&brackets_path)?;
        let brackets = BracketTable::new(brackets_file.brackets).map_err(|err| match err {
            EngineError::ConfigurationError { message } => EngineError::ConfigurationError {
                message: format!("{}: {}", brackets_path.display(), message),
            },
            other => other,
        })?;

        for jump in brackets.discontinuities() {
            warn!(
                schedule = %schedule_file.schedule.code,
                bracket_index = jump.bracket_index,
                boundary = %jump.boundary,
                expected_fixed = %jump.expected_fixed,
                actual_fixed = %jump.actual_fixed,
                "IRT fixed amount is discontinuous at bracket boundary"
            );
        }

        let config = PayrollConfig::new(schedule_file.schedule, brackets, schedule_file.inss)?;

        info!(
            path = %path.display(),
            schedule = %config.schedule().code,
            brackets = config.brackets().len(),
            "Loaded payroll configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader and returns the payroll configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Returns the schedule metadata.
    pub fn schedule(&self) -> &ScheduleMetadata {
        self.config.schedule()
    }

    /// Returns the IRT bracket table.
    pub fn brackets(&self) -> &BracketTable {
        self.config.brackets()
    }

    /// Returns the INSS rates and caps.
    pub fn inss(&self) -> &InssRates {
        self.config.inss()
    }
}
