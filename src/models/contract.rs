//! Employment contract model and related types.
//!
//! This module defines the [`Contract`] struct together with the
//! [`ContractType`] and [`SalaryType`] enums that decide which CST rules
//! apply to a worker.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The legal form of the employment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    /// Contrato a término indefinido.
    Indefinite,
    /// Contrato a término fijo; must carry an end date.
    FixedTerm,
    /// Contrato por obra o labor; the end date, when known, is an estimate.
    WorkOrLabor,
}

/// How the monthly salary is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    /// Ordinary salary: social benefits are paid on top.
    Ordinary,
    /// Salario integral (CST art. 132): benefits are already included.
    Integral,
}

/// An employment contract.
///
/// # Example
///
/// ```
/// use nomina_engine::models::{Contract, ContractType, SalaryType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let contract = Contract {
///     id: "ct_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     contract_type: ContractType::Indefinite,
///     salary_type: SalaryType::Ordinary,
///     monthly_salary: Decimal::new(2_000_000, 0),
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end_date: None,
/// };
///
/// assert!(contract.is_active_on(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
/// assert!(contract.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier for the contract.
    pub id: String,
    /// The employee this contract belongs to.
    pub employee_id: String,
    /// The legal form of the contract.
    pub contract_type: ContractType,
    /// Ordinary or integral salary.
    pub salary_type: SalaryType,
    /// The agreed monthly salary in pesos.
    pub monthly_salary: Decimal,
    /// First day of the contract.
    pub start_date: NaiveDate,
    /// Last day of the contract, if fixed or already terminated.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Contract {
    /// Returns true if the contract covers the given date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }

    /// Returns true if the contract covers at least one day of the range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date.is_none_or(|e| e >= start)
    }

    /// Returns true if the salary is integral.
    pub fn is_integral(&self) -> bool {
        self.salary_type == SalaryType::Integral
    }

    /// Checks the structural rules every contract must satisfy.
    pub fn validate(&self) -> EngineResult<()> {
        if self.monthly_salary <= Decimal::ZERO {
            return Err(self.invalid("monthly salary must be positive"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(self.invalid("end date is before start date"));
            }
        }
        if self.contract_type == ContractType::FixedTerm && self.end_date.is_none() {
            return Err(self.invalid("fixed-term contracts require an end date"));
        }
        Ok(())
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidContract {
            contract_id: self.id.clone(),
            message: message.to_string(),
        }
    }
}
