//! Incapacity benefit for general-illness sick days.
//!
//! CST art. 227 pays two thirds of the daily salary during general-illness
//! incapacity. The daily benefit can never fall below the daily minimum
//! wage. For integral salaries the daily salary is first reduced to its
//! salary share (the integral factor).

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, Contract, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos};

const INCAPACITY_LEGAL_REF: &str = "CST art. 227";

/// The result of the incapacity calculation.
#[derive(Debug, Clone)]
pub struct IncapacityResult {
    /// The incapacity line, absent when there were no incapacity days.
    pub pay_line: Option<PayLine>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the incapacity benefit for `days` sick days.
pub fn calculate_incapacity(
    contract: &Contract,
    days: u32,
    params: &ParameterSet,
    step_number: u32,
) -> IncapacityResult {
    let mut daily_salary = contract.monthly_salary / Decimal::from(30);
    if contract.is_integral() {
        daily_salary *= params.integral_salary_factor;
    }

    let benefit = daily_salary * params.incapacity_rate;
    let floor = params.daily_minimum_wage();
    let floor_applied = benefit < floor;
    let daily_benefit = benefit.max(floor);
    let amount = round_pesos(daily_benefit * Decimal::from(days));

    let pay_line = (days > 0).then(|| PayLine {
        concept: PayConcept::Incapacity,
        detail: None,
        quantity: Decimal::from(days),
        rate: display_rate(daily_benefit),
        amount,
        legal_ref: INCAPACITY_LEGAL_REF.to_string(),
    });

    let reasoning = if floor_applied {
        format!(
            "{} days × daily minimum wage ${} (benefit ${} is below the floor) = ${}",
            days,
            display_rate(floor),
            display_rate(benefit),
            amount.normalize()
        )
    } else {
        format!(
            "{} days × ${} × {} = ${}",
            days,
            display_rate(daily_salary),
            params.incapacity_rate.normalize(),
            amount.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "incapacity".to_string(),
        rule_name: "Incapacity Benefit".to_string(),
        legal_ref: INCAPACITY_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "days": days,
            "daily_salary": display_rate(daily_salary).to_string(),
            "incapacity_rate": params.incapacity_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "daily_benefit": display_rate(daily_benefit).to_string(),
            "minimum_wage_floor_applied": floor_applied,
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    IncapacityResult {
        pay_line,
        audit_step,
    }
}
