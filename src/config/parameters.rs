//! Key/value access and table lookups over a [`ParameterSet`].
//!
//! Every scalar parameter is addressable by a snake_case key so it can be
//! read and tuned without a redeploy. Nested values use a dotted key
//! (`surcharge.night_overtime`, `withholding.exempt_rate`).

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{Contract, SalaryType};

use super::types::ParameterSet;

/// How a scalar parameter is validated on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    /// Strictly positive amount, count or multiple.
    Positive,
    /// A share between 0 and 1 inclusive.
    Rate,
}

macro_rules! scalar_parameters {
    ($($key:literal => $($field:ident).+ : $kind:ident),* $(,)?) => {
        impl ParameterSet {
            /// Every key accepted by [`ParameterSet::get`] and [`ParameterSet::set`].
            pub const KEYS: &'static [&'static str] = &[$($key),*];

            /// Reads a scalar parameter by key.
            pub fn get(&self, key: &str) -> EngineResult<Decimal> {
                match key {
                    $($key => Ok(self.$($field).+),)*
                    _ => Err(EngineError::ParameterNotFound { key: key.to_string() }),
                }
            }

            fn slot_mut(&mut self, key: &str) -> Option<(&mut Decimal, ValueKind)> {
                match key {
                    $($key => Some((&mut self.$($field).+, ValueKind::$kind)),)*
                    _ => None,
                }
            }
        }
    };
}

scalar_parameters! {
    "minimum_wage" => minimum_wage: Positive,
    "transport_allowance" => transport_allowance: Positive,
    "transport_allowance_cap_multiple" => transport_allowance_cap_multiple: Positive,
    "uvt" => uvt: Positive,
    "monthly_hours" => monthly_hours: Positive,
    "health_employee_rate" => health_employee_rate: Rate,
    "pension_employee_rate" => pension_employee_rate: Rate,
    "ibc_cap_multiple" => ibc_cap_multiple: Positive,
    "integral_salary_factor" => integral_salary_factor: Rate,
    "integral_salary_min_multiple" => integral_salary_min_multiple: Positive,
    "non_salary_cap_rate" => non_salary_cap_rate: Rate,
    "incapacity_rate" => incapacity_rate: Rate,
    "cesantias_interest_rate" => cesantias_interest_rate: Rate,
    "vacation_days_per_year" => vacation_days_per_year: Positive,
    "overtime_weekly_limit_hours" => overtime_weekly_limit_hours: Positive,
    "surcharge.daytime_overtime" => surcharges.daytime_overtime: Positive,
    "surcharge.night_overtime" => surcharges.night_overtime: Positive,
    "surcharge.night_surcharge" => surcharges.night_surcharge: Positive,
    "surcharge.sunday_holiday_surcharge" => surcharges.sunday_holiday_surcharge: Positive,
    "surcharge.sunday_daytime_overtime" => surcharges.sunday_daytime_overtime: Positive,
    "surcharge.sunday_night_overtime" => surcharges.sunday_night_overtime: Positive,
    "surcharge.sunday_night_surcharge" => surcharges.sunday_night_surcharge: Positive,
    "withholding.exempt_rate" => withholding.exempt_rate: Rate,
    "withholding.exempt_cap_uvt" => withholding.exempt_cap_uvt: Positive,
}

impl ParameterSet {
    /// Lists every scalar key, in configuration-file order.
    pub fn keys() -> &'static [&'static str] {
        Self::KEYS
    }

    /// Writes a scalar parameter by key after range-checking it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nomina_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let loader = ConfigLoader::load("./config/colombia")?;
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    /// let mut params = loader.parameters_for(date)?.clone();
    /// params.set("health_employee_rate", Decimal::new(45, 3))?;
    /// assert_eq!(params.get("health_employee_rate")?, Decimal::new(45, 3));
    /// # Ok::<(), nomina_engine::error::EngineError>(())
    /// ```
    pub fn set(&mut self, key: &str, value: Decimal) -> EngineResult<()> {
        let (slot, kind) = self
            .slot_mut(key)
            .ok_or_else(|| EngineError::ParameterNotFound {
                key: key.to_string(),
            })?;
        check_value(key, value, kind)?;
        *slot = value;
        Ok(())
    }

    /// Checks every scalar and the ordering of both bracket tables.
    pub fn validate(&self) -> EngineResult<()> {
        let mut probe = self.clone();
        for key in Self::KEYS {
            if let Some((value, kind)) = probe.slot_mut(key) {
                check_value(key, *value, kind)?;
            }
        }

        let solidarity_sorted = self
            .solidarity_fund
            .windows(2)
            .all(|w| w[0].from_multiple < w[1].from_multiple);
        if !solidarity_sorted {
            return Err(EngineError::InvalidParameter {
                key: "solidarity_fund".to_string(),
                message: "brackets must be in ascending order".to_string(),
            });
        }

        let brackets = &self.withholding.brackets;
        if brackets.is_empty() {
            return Err(EngineError::InvalidParameter {
                key: "withholding.brackets".to_string(),
                message: "at least one bracket is required".to_string(),
            });
        }
        let withholding_sorted = brackets.windows(2).all(|w| w[0].from_uvt < w[1].from_uvt);
        if !withholding_sorted {
            return Err(EngineError::InvalidParameter {
                key: "withholding.brackets".to_string(),
                message: "brackets must be in ascending order".to_string(),
            });
        }
        Ok(())
    }

    /// Daily minimum wage on the 30-day commercial month.
    pub fn daily_minimum_wage(&self) -> Decimal {
        self.minimum_wage / Decimal::from(30)
    }

    /// Whether a contract earns the transport allowance (Ley 15 de 1959).
    pub fn transport_allowance_applies(&self, contract: &Contract) -> bool {
        contract.salary_type == SalaryType::Ordinary
            && contract.monthly_salary <= self.minimum_wage * self.transport_allowance_cap_multiple
    }

    /// Solidarity fund rate for a monthly IBC.
    ///
    /// Returns the rate of the highest bracket whose threshold the IBC
    /// reaches, or zero below the first bracket.
    pub fn solidarity_rate(&self, monthly_ibc: Decimal) -> Decimal {
        self.solidarity_fund
            .iter()
            .rfind(|b| monthly_ibc >= b.from_multiple * self.minimum_wage)
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Withholding tax in UVT for a taxable base in UVT (ET art. 383).
    pub fn withholding_uvt(&self, base_uvt: Decimal) -> Decimal {
        if base_uvt <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.withholding
            .brackets
            .iter()
            .find(|b| base_uvt > b.from_uvt && b.to_uvt.is_none_or(|to| base_uvt <= to))
            .map(|b| (base_uvt - b.from_uvt) * b.marginal_rate + b.base_uvt)
            .unwrap_or(Decimal::ZERO)
    }
}

fn check_value(key: &str, value: Decimal, kind: ValueKind) -> EngineResult<()> {
    let ok = match kind {
        ValueKind::Positive => value > Decimal::ZERO,
        ValueKind::Rate => value >= Decimal::ZERO && value <= Decimal::ONE,
    };
    if ok {
        Ok(())
    } else {
        let message = match kind {
            ValueKind::Positive => format!("{} must be greater than zero", value),
            ValueKind::Rate => format!("{} must be between 0 and 1", value),
        };
        Err(EngineError::InvalidParameter {
            key: key.to_string(),
            message,
        })
    }
}
