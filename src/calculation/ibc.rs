//! Ingreso base de cotización (IBC).
//!
//! The IBC is the base for health, pension and solidarity contributions.
//!
//! ## Rules
//!
//! - Salary components count in full, except an integral salary, which
//!   counts at its salary share (Ley 100 de 1993 art. 18, 70%).
//! - The transport allowance never counts.
//! - Non-salary payments above 40% of total remuneration join the IBC
//!   (Ley 1393 de 2010 art. 30).
//! - The result is bounded below by the minimum wage and above by 25
//!   minimum wages, both prorated to the days paid.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, Contract};

use super::rounding::round_pesos;

/// Amounts that feed the IBC, already calculated for the period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IbcInput {
    /// Base salary for days worked.
    pub base_salary: Decimal,
    /// Incapacity benefit.
    pub incapacity: Decimal,
    /// Overtime and surcharges.
    pub overtime: Decimal,
    /// Commissions plus salary bonuses.
    pub salary_variable: Decimal,
    /// Non-salary payments.
    pub non_salary: Decimal,
    /// Days worked plus incapacity days.
    pub paid_days: u32,
}

/// The result of the IBC step.
#[derive(Debug, Clone)]
pub struct IbcResult {
    /// The contribution base for the period.
    pub ibc: Decimal,
    /// Non-salary excess added to the base.
    pub non_salary_excess: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the IBC for a period.
pub fn calculate_ibc(
    contract: &Contract,
    input: &IbcInput,
    params: &ParameterSet,
    step_number: u32,
) -> IbcResult {
    let salary_share = if contract.is_integral() {
        input.base_salary * params.integral_salary_factor
    } else {
        input.base_salary
    };
    let salary_components =
        salary_share + input.incapacity + input.overtime + input.salary_variable;

    let total_remuneration = input.base_salary
        + input.incapacity
        + input.overtime
        + input.salary_variable
        + input.non_salary;
    let non_salary_allowed = total_remuneration * params.non_salary_cap_rate;
    let non_salary_excess = (input.non_salary - non_salary_allowed).max(Decimal::ZERO);

    let raw = salary_components + non_salary_excess;

    let (floor, cap) = if input.paid_days > 0 {
        let days = Decimal::from(input.paid_days);
        let floor = params.minimum_wage * days / Decimal::from(30);
        (floor, floor * params.ibc_cap_multiple)
    } else {
        (
            Decimal::ZERO,
            params.minimum_wage * params.ibc_cap_multiple,
        )
    };

    let (bounded, bound) = if raw == Decimal::ZERO {
        (Decimal::ZERO, "none")
    } else if raw < floor {
        (floor, "minimum_wage_floor")
    } else if raw > cap {
        (cap, "ibc_cap")
    } else {
        (raw, "none")
    };
    let ibc = round_pesos(bounded);

    let reasoning = match bound {
        "minimum_wage_floor" => format!(
            "Salary base ${} raised to the minimum wage floor ${} for {} days",
            round_pesos(raw).normalize(),
            ibc.normalize(),
            input.paid_days
        ),
        "ibc_cap" => format!(
            "Salary base ${} capped at {} minimum wages: ${}",
            round_pesos(raw).normalize(),
            params.ibc_cap_multiple.normalize(),
            ibc.normalize()
        ),
        _ => format!(
            "Salary components ${} + non-salary excess ${} = ${}",
            round_pesos(salary_components).normalize(),
            round_pesos(non_salary_excess).normalize(),
            ibc.normalize()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "ibc".to_string(),
        rule_name: "Contribution Base (IBC)".to_string(),
        legal_ref: "Ley 100 de 1993 art. 18; Ley 1393 de 2010 art. 30".to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.normalize().to_string(),
            "salary_type": contract.salary_type,
            "incapacity": input.incapacity.normalize().to_string(),
            "overtime": input.overtime.normalize().to_string(),
            "salary_variable": input.salary_variable.normalize().to_string(),
            "non_salary": input.non_salary.normalize().to_string(),
            "paid_days": input.paid_days
        }),
        output: serde_json::json!({
            "non_salary_excess": round_pesos(non_salary_excess).normalize().to_string(),
            "bound_applied": bound,
            "ibc": ibc.normalize().to_string()
        }),
        reasoning,
    };

    IbcResult {
        ibc,
        non_salary_excess: round_pesos(non_salary_excess),
        audit_step,
    }
}
