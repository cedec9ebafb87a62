//! Prima de servicios.
//!
//! Thirty days of salary per year, paid by semester (CST art. 306): the
//! settlement owes the share accrued since the start of the current
//! semester or the last prima payment. Integral salaries pay none.

use rust_decimal::Decimal;

use crate::models::{AuditStep, Contract, SettlementConcept};

use super::rounding::round_pesos;
use super::severance::{SeveranceResult, settlement_line};

const SERVICE_BONUS_LEGAL_REF: &str = "CST art. 306";

/// Calculates the prima owed for `days` of the semester: `base × days / 360`.
pub fn calculate_service_bonus(
    contract: &Contract,
    base: Decimal,
    days: u32,
    step_number: u32,
) -> SeveranceResult {
    let amount = if contract.is_integral() {
        Decimal::ZERO
    } else {
        round_pesos(base * Decimal::from(days) / Decimal::from(360))
    };

    let reasoning = if contract.is_integral() {
        "Integral salary already includes the service bonus".to_string()
    } else {
        format!(
            "${} × {} semester days / 360 = ${}",
            base.normalize(),
            days,
            amount.normalize()
        )
    };

    SeveranceResult {
        line: settlement_line(
            SettlementConcept::ServiceBonus,
            base,
            days,
            amount,
            SERVICE_BONUS_LEGAL_REF,
        ),
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "service_bonus".to_string(),
            rule_name: "Service Bonus (Prima)".to_string(),
            legal_ref: SERVICE_BONUS_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "base": base.normalize().to_string(),
                "days": days,
                "salary_type": contract.salary_type
            }),
            output: serde_json::json!({
                "amount": amount.normalize().to_string()
            }),
            reasoning,
        },
    }
}
