//! Base salary for days worked.
//!
//! The monthly salary is prorated over the 30-day commercial month
//! (CST art. 134). Days lost to unpaid leave or incapacity are excluded
//! before this step.

use rust_decimal::Decimal;

use crate::models::{AuditStep, Contract, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos};

/// The result of the base salary calculation.
#[derive(Debug, Clone)]
pub struct BaseSalaryResult {
    /// The salary line, absent when no day was worked.
    pub pay_line: Option<PayLine>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Prorates the contract's monthly salary to `days_worked` commercial days.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::calculate_base_salary;
/// use nomina_engine::models::{Contract, ContractType, SalaryType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let contract = Contract {
///     id: "ct_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     contract_type: ContractType::Indefinite,
///     salary_type: SalaryType::Ordinary,
///     monthly_salary: Decimal::new(3_000_000, 0),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: None,
/// };
///
/// let result = calculate_base_salary(&contract, 15, 1);
/// assert_eq!(result.pay_line.unwrap().amount, Decimal::new(1_500_000, 0));
/// ```
pub fn calculate_base_salary(
    contract: &Contract,
    days_worked: u32,
    step_number: u32,
) -> BaseSalaryResult {
    let days = Decimal::from(days_worked);
    let daily_rate = contract.monthly_salary / Decimal::from(30);
    let amount = round_pesos(contract.monthly_salary * days / Decimal::from(30));

    let pay_line = (days_worked > 0).then(|| PayLine {
        concept: PayConcept::BaseSalary,
        detail: None,
        quantity: days,
        rate: display_rate(daily_rate),
        amount,
        legal_ref: "CST art. 134".to_string(),
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_salary".to_string(),
        rule_name: "Base Salary".to_string(),
        legal_ref: "CST art. 134".to_string(),
        input: serde_json::json!({
            "monthly_salary": contract.monthly_salary.normalize().to_string(),
            "salary_type": contract.salary_type,
            "days_worked": days_worked
        }),
        output: serde_json::json!({
            "daily_rate": display_rate(daily_rate).to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} days × ${} / 30 = ${}",
            days_worked,
            contract.monthly_salary.normalize(),
            amount.normalize()
        ),
    };

    BaseSalaryResult {
        pay_line,
        audit_step,
    }
}
