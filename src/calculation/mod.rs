//! Calculation logic for the payroll engine.
//!
//! This module contains the payroll rules (days worked, base salary,
//! incapacity, transport allowance, overtime, variable pay, IBC, social
//! security, solidarity fund and withholding tax) and the settlement rules
//! (cesantías, interest, prima, vacation and indemnification).
//!
//! Each rule returns its pay or settlement lines together with the audit
//! step that explains it. [`calculate_payroll_entry`] and
//! [`calculate_settlement`] chain the rules into a full result.

mod base_salary;
mod days;
mod ibc;
mod incapacity;
mod indemnification;
mod overtime;
mod payroll_entry;
mod rounding;
mod service_bonus;
mod settlement;
mod severance;
mod social_security;
mod solidarity_fund;
mod transport_allowance;
mod vacation;
mod variable_pay;
mod withholding_tax;

pub use base_salary::{BaseSalaryResult, calculate_base_salary};
pub use days::{days_in_range, days360, semester_start, year_start};
pub use ibc::{IbcInput, IbcResult, calculate_ibc};
pub use incapacity::{IncapacityResult, calculate_incapacity};
pub use indemnification::{
    HIGH_SALARY_MULTIPLE, WORK_OR_LABOR_MINIMUM_DAYS, calculate_indemnification,
};
pub use overtime::{
    OVERTIME_LIMIT_EXCEEDED, OvertimeResult, calculate_overtime, overtime_limit_warning,
};
pub use payroll_entry::{
    ABSENCE_EXCEEDS_PERIOD, NEGATIVE_NET_PAY, NOVEDAD_IGNORED, PayrollInput,
    calculate_payroll_entry,
};
pub use rounding::{round_pesos, round_to_thousand};
pub use service_bonus::calculate_service_bonus;
pub use settlement::{SettlementCalculation, SettlementInput, calculate_settlement};
pub use severance::{SeveranceResult, calculate_cesantias, calculate_cesantias_interest};
pub use social_security::{SocialSecurityResult, calculate_social_security};
pub use solidarity_fund::{SolidarityFundResult, calculate_solidarity_fund};
pub use transport_allowance::{TransportAllowanceResult, calculate_transport_allowance};
pub use vacation::{VACATION_OVERDRAWN, VacationResult, calculate_vacation};
pub use variable_pay::{VariablePay, VariablePayResult, calculate_variable_pay};
pub use withholding_tax::{WithholdingInput, WithholdingTaxResult, calculate_withholding_tax};
