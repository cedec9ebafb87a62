//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll and settlement
//! calculation, configuration loading and lifecycle orchestration.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use nomina_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/country.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/country.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A legal parameter key is not known.
    #[error("Parameter not found: {key}")]
    ParameterNotFound {
        /// The key that was requested.
        key: String,
    },

    /// No parameter set is in force on the given date.
    #[error("No legal parameters in force on {date}")]
    ParametersNotFound {
        /// The date for which parameters were requested.
        date: NaiveDate,
    },

    /// A legal parameter has a value outside its valid range.
    #[error("Invalid parameter '{key}': {message}")]
    InvalidParameter {
        /// The offending key.
        key: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// A contract was invalid or cannot be used for the requested operation.
    #[error("Invalid contract '{contract_id}': {message}")]
    InvalidContract {
        /// The ID of the invalid contract.
        contract_id: String,
        /// A description of what made the contract invalid.
        message: String,
    },

    /// A novedad record was invalid.
    #[error("Invalid novedad '{novedad_id}': {message}")]
    InvalidNovedad {
        /// The ID of the invalid novedad.
        novedad_id: String,
        /// A description of what made the novedad invalid.
        message: String,
    },

    /// A payroll period definition was invalid.
    #[error("Invalid payroll period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A lifecycle action is not allowed from the current status.
    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        /// The kind of entity ("payroll period", "settlement").
        entity: String,
        /// The current status.
        from: String,
        /// The attempted action.
        action: String,
    },

    /// A requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A record with the same identity already exists.
    #[error("{entity} already exists: {id}")]
    Conflict {
        /// The kind of record.
        entity: String,
        /// The conflicting identifier.
        id: String,
    },

    /// A manual adjustment referenced a line that does not exist.
    #[error("No line with concept '{concept}' to adjust")]
    AdjustmentTargetNotFound {
        /// The concept code that was targeted.
        concept: String,
    },

    /// An adjustment named an employee with more than one entry in the period.
    #[error("Employee '{employee_id}' has {entries} entries in the period; name the contract")]
    AmbiguousEntry {
        /// The employee targeted.
        employee_id: String,
        /// How many entries matched.
        entries: usize,
    },

    /// The persistence layer failed.
    #[error("Repository error: {message}")]
    Repository {
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/country.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/country.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_parameters_not_found_displays_date() {
        let error = EngineError::ParametersNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No legal parameters in force on 2020-01-01");
    }

    #[test]
    fn test_invalid_transition_displays_action_and_status() {
        let error = EngineError::InvalidTransition {
            entity: "payroll period".to_string(),
            from: "closed".to_string(),
            action: "liquidate".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot liquidate payroll period in status 'closed'"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::NotFound {
            entity: "Contract".to_string(),
            id: "ct_001".to_string(),
        };
        assert_eq!(error.to_string(), "Contract not found: ct_001");
    }

    #[test]
    fn test_invalid_contract_displays_id_and_message() {
        let error = EngineError::InvalidContract {
            contract_id: "ct_001".to_string(),
            message: "monthly salary must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid contract 'ct_001': monthly salary must be positive"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::ParameterNotFound {
                key: "unknown".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
