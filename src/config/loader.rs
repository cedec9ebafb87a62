//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading legal payroll
//! parameters from YAML files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{CountryMetadata, ParameterSet, PayrollConfig};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and answers which legal parameters are in force on a date.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/colombia/
/// ├── country.yaml          # Country metadata
/// └── parameters/
///     ├── 2025.yaml         # Parameters effective 2025-01-01
///     └── 2025-07-15.yaml   # Mid-year change (working-hours reduction)
/// ```
///
/// # Example
///
/// ```no_run
/// use nomina_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/colombia").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let wage = loader.get_parameter("minimum_wage", date).unwrap();
/// println!("SMMLV: ${}", wage);
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
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any parameter set fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let country_path = path.join("country.yaml");
        let metadata = Self::load_yaml::<CountryMetadata>(&country_path)?;

        let parameters_dir = path.join("parameters");
        let parameter_sets = Self::load_parameter_sets(&parameters_dir)?;

        for set in &parameter_sets {
            set.validate()?;
        }

        info!(
            country = %metadata.code,
            parameter_sets = parameter_sets.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(metadata, parameter_sets),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
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

    /// Loads all parameter files from the parameters directory.
    fn load_parameter_sets(dir: &Path) -> EngineResult<Vec<ParameterSet>> {
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut sets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let set = Self::load_yaml::<ParameterSet>(&path)?;
                debug!(file = %path.display(), effective_date = %set.effective_date, "Loaded parameter set");
                sets.push(set);
            }
        }

        if sets.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no parameter files found)", dir_str),
            });
        }

        Ok(sets)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the country metadata.
    pub fn metadata(&self) -> &CountryMetadata {
        self.config.metadata()
    }

    /// Gets the parameter set in force on a date.
    ///
    /// The most recent set whose effective date is on or before `date` wins.
    pub fn parameters_for(&self, date: NaiveDate) -> EngineResult<&ParameterSet> {
        self.config
            .parameters_for(date)
            .ok_or(EngineError::ParametersNotFound { date })
    }

    /// Reads one parameter as in force on a date.
    pub fn get_parameter(&self, key: &str, date: NaiveDate) -> EngineResult<Decimal> {
        self.parameters_for(date)?.get(key)
    }

    /// Tunes one parameter of the set in force on `date`.
    ///
    /// Returns the previous value.
    pub fn set_parameter(
        &mut self,
        key: &str,
        value: Decimal,
        date: NaiveDate,
    ) -> EngineResult<Decimal> {
        let set = self
            .config
            .parameters_for_mut(date)
            .ok_or(EngineError::ParametersNotFound { date })?;
        let previous = set.get(key)?;
        set.set(key, value)?;
        info!(
            key = %key,
            previous = %previous,
            value = %value,
            effective_date = %set.effective_date,
            "Parameter updated"
        );
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/colombia"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().code, "CO");
        assert_eq!(loader.metadata().name, "Colombia");
        assert_eq!(loader.config().parameter_sets().len(), 3);
    }

    #[test]
    fn test_parameter_sets_are_sorted() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let dates: Vec<NaiveDate> = loader
            .config()
            .parameter_sets()
            .iter()
            .map(|p| p.effective_date)
            .collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2025, 1, 1), date(2025, 7, 15)]
        );
    }

    #[test]
    fn test_minimum_wage_by_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(
            loader.get_parameter("minimum_wage", date(2024, 6, 1)).unwrap(),
            dec("1300000")
        );
        assert_eq!(
            loader.get_parameter("minimum_wage", date(2025, 3, 1)).unwrap(),
            dec("1423500")
        );
    }

    #[test]
    fn test_mid_year_set_takes_effect_on_its_date() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(
            loader.get_parameter("monthly_hours", date(2025, 7, 14)).unwrap(),
            dec("230")
        );
        assert_eq!(
            loader.get_parameter("monthly_hours", date(2025, 7, 15)).unwrap(),
            dec("220")
        );
    }

    #[test]
    fn test_no_parameters_before_first_set() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        match loader.parameters_for(date(2020, 1, 1)) {
            Err(EngineError::ParametersNotFound { date: d }) => assert_eq!(d, date(2020, 1, 1)),
            other => panic!("Expected ParametersNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_set_parameter_returns_previous_value() {
        let mut loader = ConfigLoader::load(config_path()).unwrap();
        let previous = loader
            .set_parameter("uvt", dec("50000"), date(2025, 3, 1))
            .unwrap();
        assert_eq!(previous, dec("49799"));
        assert_eq!(
            loader.get_parameter("uvt", date(2025, 3, 1)).unwrap(),
            dec("50000")
        );
        // Other sets are untouched.
        assert_eq!(
            loader.get_parameter("uvt", date(2024, 3, 1)).unwrap(),
            dec("47065")
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("country.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_withholding_table_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let params = loader.parameters_for(date(2025, 3, 1)).unwrap();
        assert_eq!(params.withholding.brackets.len(), 7);
        assert!(params.withholding.brackets[6].to_uvt.is_none());
        assert_eq!(params.solidarity_fund.len(), 6);
    }
}
