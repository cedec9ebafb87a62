//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load the legal payroll parameters
//! (minimum wage, contribution rates, solidarity fund brackets, withholding
//! table, overtime surcharges) from YAML files and to read or tune them by key.
//!
//! # Example
//!
//! ```no_run
//! use nomina_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/colombia").unwrap();
//! println!("Loaded parameters for: {}", config.metadata().name);
//! ```

mod loader;
mod parameters;
mod shared;
mod types;

pub use loader::ConfigLoader;
pub use shared::SharedConfig;
pub use types::{
    CountryMetadata, ParameterSet, PayrollConfig, SolidarityBracket, SurchargeRates,
    WithholdingBracket, WithholdingTable,
};

#[cfg(test)]
pub(crate) use parameters::fixtures;
