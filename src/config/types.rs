//! Configuration types for payroll schedules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the validated
//! [`PayrollConfig`] assembled from them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{BracketTable, InssRates, TaxBracket};

/// Metadata about the payroll schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// Short code identifying the schedule (e.g., "AO-IRT").
    pub code: String,
    /// The human-readable name of the schedule.
    pub name: String,
    /// ISO 4217 currency code of every amount in the schedule.
    pub currency: String,
}

/// Structure of `schedule.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleFile {
    /// Schedule metadata.
    pub schedule: ScheduleMetadata,
    /// INSS rates and caps; omitted fields take their defaults.
    #[serde(default)]
    pub inss: InssRates,
}

/// Structure of `irt_brackets.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct IrtBracketsFile {
    /// IRT brackets in ascending order.
    pub brackets: Vec<TaxBracket>,
}

/// A validated payroll configuration: schedule metadata, the IRT bracket
/// table and the INSS rates.
///
/// The configuration is immutable once built. Publishing new rates means
/// building a new `PayrollConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    schedule: ScheduleMetadata,
    brackets: BracketTable,
    inss: InssRates,
}

impl PayrollConfig {
    /// Creates a configuration, validating the INSS settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a rate is outside `[0, 1]` or a cap
    /// is negative.
    pub fn new(
        schedule: ScheduleMetadata,
        brackets: BracketTable,
        inss: InssRates,
    ) -> EngineResult<Self> {
        inss.validate().map_err(|err| {
            EngineError::configuration(format!("invalid INSS settings in '{}': {}", schedule.code, err))
        })?;

        Ok(Self {
            schedule,
            brackets,
            inss,
        })
    }

    /// The built-in Angolan schedule: statutory IRT table, INSS at 3% / 8%,
    /// no contribution caps.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PayrollConfig;
    ///
    /// let config = PayrollConfig::angola_default();
    /// assert_eq!(config.schedule().currency, "AOA");
    /// assert_eq!(config.brackets().len(), 12);
    /// ```
    pub fn angola_default() -> Self {
        Self {
            schedule: ScheduleMetadata {
                code: "AO-IRT".to_string(),
                name: "Angola IRT and INSS".to_string(),
                currency: "AOA".to_string(),
            },
            brackets: BracketTable::angola_default(),
            inss: InssRates::default(),
        }
    }

    /// Returns the schedule metadata.
    pub fn schedule(&self) -> &ScheduleMetadata {
        &self.schedule
    }

    /// Returns the IRT bracket table.
    pub fn brackets(&self) -> &BracketTable {
        &self.brackets
    }

    /// Returns the INSS rates and caps.
    pub fn inss(&self) -> &InssRates {
        &self.inss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_angola_default_uses_default_rates() {
        let config = PayrollConfig::angola_default();

        assert_eq!(config.schedule().code, "AO-IRT");
        assert_eq!(config.inss(), &InssRates::default());
        assert_eq!(config.brackets(), &BracketTable::angola_default());
    }

    #[test]
    fn test_new_rejects_invalid_rate_as_configuration_error() {
        let defaults = PayrollConfig::angola_default();
        let inss = InssRates {
            employee_rate: Decimal::new(3, 0),
            ..InssRates::default()
        };

        match PayrollConfig::new(defaults.schedule().clone(), defaults.brackets().clone(), inss) {
            Err(EngineError::ConfigurationError { message }) => {
                assert!(message.contains("AO-IRT"));
                assert!(message.contains("employee_inss_rate"));
            }
            other => panic!("Expected ConfigurationError, got {:?}", other),
        }
    }

    #[test]
    fn test_schedule_file_defaults_inss() {
        let yaml = "schedule:\n  code: TEST\n  name: Test\n  currency: AOA\n";
        let file: ScheduleFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(file.schedule.code, "TEST");
        assert_eq!(file.inss, InssRates::default());
    }
}
