//! Retención en la fuente on labor income (procedure 1).
//!
//! ## Algorithm
//!
//! 1. Net income = taxable earnings - mandatory employee contributions
//!    (health, pension, solidarity fund).
//! 2. Exempt income = 25% of net income, capped at 65.83 UVT a month
//!    (ET art. 206 num. 10).
//! 3. The remaining base is converted to monthly UVT and looked up in the
//!    ET art. 383 table.
//! 4. The tax is scaled back to the period and rounded to the nearest
//!    thousand pesos.
//!
//! The transport allowance is not income for the worker and is excluded by
//! the caller.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos, round_to_thousand};

const WITHHOLDING_LEGAL_REF: &str = "ET art. 383 and 388";

/// Amounts that feed the withholding calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithholdingInput {
    /// Earnings that are income for the worker.
    pub taxable_earnings: Decimal,
    /// Health, pension and solidarity fund deducted in the period.
    pub mandatory_contributions: Decimal,
    /// Commercial days the period covers.
    pub period_days: u32,
}

/// The result of the withholding tax step.
#[derive(Debug, Clone)]
pub struct WithholdingTaxResult {
    /// The withholding line, absent when no tax is due.
    pub pay_line: Option<PayLine>,
    /// The monthly taxable base in UVT.
    pub base_uvt: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates retención en la fuente for a period.
pub fn calculate_withholding_tax(
    input: &WithholdingInput,
    params: &ParameterSet,
    step_number: u32,
) -> WithholdingTaxResult {
    let table = &params.withholding;
    let days = Decimal::from(input.period_days.max(1));
    let thirty = Decimal::from(30);

    let net_income = (input.taxable_earnings - input.mandatory_contributions).max(Decimal::ZERO);
    let exempt_cap = table.exempt_cap_uvt * params.uvt * days / thirty;
    let exempt = (net_income * table.exempt_rate).min(exempt_cap);
    let taxable_base = net_income - exempt;

    let base_uvt = taxable_base * thirty / days / params.uvt;
    let tax_uvt = params.withholding_uvt(base_uvt);
    let amount = round_to_thousand(tax_uvt * params.uvt * days / thirty);

    let pay_line = (amount > Decimal::ZERO).then(|| PayLine {
        concept: PayConcept::WithholdingTax,
        detail: None,
        quantity: round_pesos(taxable_base),
        rate: display_rate(tax_uvt),
        amount,
        legal_ref: WITHHOLDING_LEGAL_REF.to_string(),
    });

    let reasoning = if amount > Decimal::ZERO {
        format!(
            "Taxable base ${} ({} UVT/month) → {} UVT = ${}",
            round_pesos(taxable_base).normalize(),
            display_rate(base_uvt),
            display_rate(tax_uvt),
            amount.normalize()
        )
    } else {
        format!(
            "Taxable base {} UVT/month falls in the 0% bracket",
            display_rate(base_uvt)
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "withholding_tax".to_string(),
        rule_name: "Withholding Tax (Procedure 1)".to_string(),
        legal_ref: WITHHOLDING_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "taxable_earnings": input.taxable_earnings.normalize().to_string(),
            "mandatory_contributions": input.mandatory_contributions.normalize().to_string(),
            "period_days": input.period_days,
            "uvt": params.uvt.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_income": round_pesos(net_income).normalize().to_string(),
            "exempt_income": round_pesos(exempt).normalize().to_string(),
            "taxable_base": round_pesos(taxable_base).normalize().to_string(),
            "base_uvt": display_rate(base_uvt).to_string(),
            "tax_uvt": display_rate(tax_uvt).to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    WithholdingTaxResult {
        pay_line,
        base_uvt,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::parameters_2025;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(earnings: &str, contributions: &str, days: u32) -> WithholdingInput {
        WithholdingInput {
            taxable_earnings: dec(earnings),
            mandatory_contributions: dec(contributions),
            period_days: days,
        }
    }

    #[test]
    fn test_minimum_wage_pays_nothing() {
        let result =
            calculate_withholding_tax(&input("1423500", "113880", 30), &parameters_2025(), 1);
        assert!(result.pay_line.is_none());
        assert!(result.audit_step.reasoning.contains("0% bracket"));
    }

    #[test]
    fn test_second_bracket() {
        // net 9,100,000; exempt 2,275,000; base 6,825,000 = 137.05 UVT
        // (137.05 - 95) × 19% = 7.99 UVT = 397,878 → 398,000
        let result =
            calculate_withholding_tax(&input("10000000", "900000", 30), &parameters_2025(), 1);
        assert_eq!(result.pay_line.unwrap().amount, dec("398000"));
        assert_eq!(display_rate(result.base_uvt), dec("137.05"));
        assert_eq!(result.audit_step.output["exempt_income"], "2275000");
    }

    #[test]
    fn test_exempt_income_cap() {
        // 25% of 18,200,000 exceeds 65.83 UVT = 3,278,268.17
        let result =
            calculate_withholding_tax(&input("20000000", "1800000", 30), &parameters_2025(), 1);
        assert_eq!(result.audit_step.output["exempt_income"], "3278268");
        // (299.64 - 150) × 28% + 10 UVT = 2,584,517 → 2,585,000
        assert_eq!(result.pay_line.unwrap().amount, dec("2585000"));
    }

    #[test]
    fn test_fortnight_scales_to_monthly_table() {
        // Half of the 10,000,000 case over 15 days: 198,939 → 199,000
        let result =
            calculate_withholding_tax(&input("5000000", "450000", 15), &parameters_2025(), 1);
        assert_eq!(display_rate(result.base_uvt), dec("137.05"));
        assert_eq!(result.pay_line.unwrap().amount, dec("199000"));
    }

    #[test]
    fn test_contributions_above_earnings_clamp_to_zero() {
        let result = calculate_withholding_tax(&input("100", "5000", 30), &parameters_2025(), 1);
        assert!(result.pay_line.is_none());
        assert_eq!(result.audit_step.output["net_income"], "0");
    }
}
