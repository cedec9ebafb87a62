//! Fondo de solidaridad pensional.
//!
//! Workers whose IBC reaches four minimum wages pay an extra 1% to the
//! solidarity fund, rising in steps from 16 minimum wages up to 2%
//! (Ley 100 de 1993 art. 27, as amended by Ley 797 de 2003 art. 8).
//! Brackets are evaluated on the monthly equivalent of the period IBC.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos};

const SOLIDARITY_LEGAL_REF: &str = "Ley 100 de 1993 art. 27";

/// The result of the solidarity fund step.
#[derive(Debug, Clone)]
pub struct SolidarityFundResult {
    /// The contribution line, absent below the first bracket.
    pub pay_line: Option<PayLine>,
    /// The rate applied (zero below the first bracket).
    pub rate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the solidarity fund contribution on `ibc`.
///
/// `paid_days` scales the IBC to a monthly figure before the bracket lookup.
pub fn calculate_solidarity_fund(
    ibc: Decimal,
    paid_days: u32,
    params: &ParameterSet,
    step_number: u32,
) -> SolidarityFundResult {
    let monthly_ibc = if paid_days > 0 {
        ibc * Decimal::from(30) / Decimal::from(paid_days)
    } else {
        ibc
    };
    let rate = params.solidarity_rate(monthly_ibc);
    let amount = round_pesos(ibc * rate);
    let multiple = monthly_ibc / params.minimum_wage;

    let pay_line = (amount > Decimal::ZERO).then(|| PayLine {
        concept: PayConcept::SolidarityFund,
        detail: None,
        quantity: ibc,
        rate,
        amount,
        legal_ref: SOLIDARITY_LEGAL_REF.to_string(),
    });

    let reasoning = if rate > Decimal::ZERO {
        format!(
            "Monthly IBC is {} minimum wages: ${} × {}% = ${}",
            display_rate(multiple),
            ibc.normalize(),
            (rate * Decimal::from(100)).normalize(),
            amount.normalize()
        )
    } else {
        format!(
            "Monthly IBC is {} minimum wages, below the first bracket",
            display_rate(multiple)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "solidarity_fund".to_string(),
        rule_name: "Pension Solidarity Fund".to_string(),
        legal_ref: SOLIDARITY_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "ibc": ibc.normalize().to_string(),
            "paid_days": paid_days,
            "monthly_ibc": round_pesos(monthly_ibc).normalize().to_string()
        }),
        output: serde_json::json!({
            "minimum_wage_multiple": display_rate(multiple).to_string(),
            "rate": rate.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    SolidarityFundResult {
        pay_line,
        rate,
        audit_step,
    }
}
