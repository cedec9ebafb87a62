//! Employee health and pension contributions.
//!
//! Each is a flat share of the IBC (Ley 100 de 1993 art. 20 and 204).

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, PayConcept, PayLine};

use super::rounding::round_pesos;

/// The result of the social security step.
#[derive(Debug, Clone)]
pub struct SocialSecurityResult {
    /// Health and pension lines; omitted when the IBC is zero.
    pub pay_lines: Vec<PayLine>,
    /// One audit step per contribution.
    pub audit_steps: Vec<AuditStep>,
    /// Health plus pension.
    pub total: Decimal,
}

/// Calculates the employee health and pension contributions on `ibc`.
///
/// Steps are numbered from `first_step`: health first, then pension.
pub fn calculate_social_security(
    ibc: Decimal,
    params: &ParameterSet,
    first_step: u32,
) -> SocialSecurityResult {
    let contributions = [
        (
            PayConcept::Health,
            params.health_employee_rate,
            "health",
            "Health Contribution",
            "Ley 100 de 1993 art. 204",
        ),
        (
            PayConcept::Pension,
            params.pension_employee_rate,
            "pension",
            "Pension Contribution",
            "Ley 100 de 1993 art. 20",
        ),
    ];

    let mut pay_lines = Vec::new();
    let mut audit_steps = Vec::new();
    let mut total = Decimal::ZERO;

    for (offset, (concept, rate, rule_id, rule_name, legal_ref)) in
        contributions.into_iter().enumerate()
    {
        let amount = round_pesos(ibc * rate);
        total += amount;

        if amount > Decimal::ZERO {
            pay_lines.push(PayLine {
                concept,
                detail: None,
                quantity: ibc,
                rate,
                amount,
                legal_ref: legal_ref.to_string(),
            });
        }

        audit_steps.push(AuditStep {
            step_number: first_step + offset as u32,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            legal_ref: legal_ref.to_string(),
            input: serde_json::json!({
                "ibc": ibc.normalize().to_string(),
                "rate": rate.normalize().to_string()
            }),
            output: serde_json::json!({
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "${} × {}% = ${}",
                ibc.normalize(),
                (rate * Decimal::from(100)).normalize(),
                amount.normalize()
            ),
        });
    }

    SocialSecurityResult {
        pay_lines,
        audit_steps,
        total,
    }
}
