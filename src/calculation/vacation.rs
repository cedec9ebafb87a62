//! Vacaciones compensadas en dinero.
//!
//! Workers earn 15 working days of paid vacation per year of service
//! (CST art. 186). On termination the days not yet enjoyed are paid in money
//! (CST art. 189) at the salary in force, including average variable pay.
//! The transport allowance is excluded.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, AuditWarning, SettlementConcept, SettlementLine};

use super::rounding::{display_rate, round_pesos};
use super::severance::settlement_line;

/// Warning code for more vacation taken than earned.
pub const VACATION_OVERDRAWN: &str = "VACATION_OVERDRAWN";

const VACATION_LEGAL_REF: &str = "CST art. 186 and 189";

/// The result of the vacation calculation.
#[derive(Debug, Clone)]
pub struct VacationResult {
    /// The vacation line, absent when no days are pending.
    pub line: Option<SettlementLine>,
    /// Vacation days accrued but not taken (never negative).
    pub pending_days: Decimal,
    /// Raised when days taken exceed days accrued.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates compensated vacation.
///
/// `service_days` are commercial days of the whole contract; `days_taken`
/// are vacation days already enjoyed.
pub fn calculate_vacation(
    vacation_base: Decimal,
    service_days: u32,
    days_taken: Decimal,
    params: &ParameterSet,
    step_number: u32,
) -> VacationResult {
    let accrued =
        Decimal::from(service_days) * params.vacation_days_per_year / Decimal::from(360);
    let balance = accrued - days_taken;

    let warning = (balance < Decimal::ZERO).then(|| {
        AuditWarning::new(
            VACATION_OVERDRAWN,
            format!(
                "{} vacation days taken but only {} accrued",
                days_taken.normalize(),
                display_rate(accrued)
            ),
            "medium",
        )
    });
    let pending_days = balance.max(Decimal::ZERO);
    let amount = round_pesos(vacation_base * pending_days / Decimal::from(30));

    VacationResult {
        line: settlement_line(
            SettlementConcept::Vacation,
            vacation_base,
            display_rate(pending_days),
            amount,
            VACATION_LEGAL_REF,
        ),
        pending_days,
        warning,
        audit_step: AuditStep {
            step_number,
            rule_id: "vacation".to_string(),
            rule_name: "Compensated Vacation".to_string(),
            legal_ref: VACATION_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "vacation_base": vacation_base.normalize().to_string(),
                "service_days": service_days,
                "days_taken": days_taken.normalize().to_string(),
                "days_per_year": params.vacation_days_per_year.normalize().to_string()
            }),
            output: serde_json::json!({
                "accrued_days": display_rate(accrued).to_string(),
                "pending_days": display_rate(pending_days).to_string(),
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "{} service days × {} / 360 - {} taken = {} days × ${} / 30 = ${}",
                service_days,
                params.vacation_days_per_year.normalize(),
                days_taken.normalize(),
                display_rate(pending_days),
                vacation_base.normalize(),
                amount.normalize()
            ),
        },
    }
}
