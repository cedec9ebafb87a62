//! Cesantías and interest on cesantías.
//!
//! Cesantías pay one month of salary per year of service (CST art. 249),
//! accrued on the 360-day year from the last cut. The interest is 12% a
//! year on the accrued balance, prorated by the same days (Ley 52 de 1975).
//! Integral salaries already include both and pay neither.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, Contract, SettlementConcept, SettlementLine};

use super::rounding::round_pesos;

const CESANTIAS_LEGAL_REF: &str = "CST art. 249";
const INTEREST_LEGAL_REF: &str = "Ley 52 de 1975 art. 1";

/// The result of a cesantías or interest calculation.
#[derive(Debug, Clone)]
pub struct SeveranceResult {
    /// The settlement line, absent when nothing is owed.
    pub line: Option<SettlementLine>,
    /// The amount owed (zero when no line).
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates cesantías: `base × days / 360`.
pub fn calculate_cesantias(
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
        "Integral salary already includes cesantías".to_string()
    } else {
        format!(
            "${} × {} days / 360 = ${}",
            base.normalize(),
            days,
            amount.normalize()
        )
    };

    SeveranceResult {
        line: settlement_line(SettlementConcept::Cesantias, base, days, amount, CESANTIAS_LEGAL_REF),
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "cesantias".to_string(),
            rule_name: "Cesantías".to_string(),
            legal_ref: CESANTIAS_LEGAL_REF.to_string(),
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

/// Calculates interest on cesantías: `cesantías × days × rate / 360`.
pub fn calculate_cesantias_interest(
    cesantias: Decimal,
    days: u32,
    params: &ParameterSet,
    step_number: u32,
) -> SeveranceResult {
    let rate = params.cesantias_interest_rate;
    let amount = round_pesos(cesantias * Decimal::from(days) * rate / Decimal::from(360));

    SeveranceResult {
        line: settlement_line(
            SettlementConcept::CesantiasInterest,
            cesantias,
            days,
            amount,
            INTEREST_LEGAL_REF,
        ),
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "cesantias_interest".to_string(),
            rule_name: "Interest on Cesantías".to_string(),
            legal_ref: INTEREST_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "cesantias": cesantias.normalize().to_string(),
                "days": days,
                "annual_rate": rate.normalize().to_string()
            }),
            output: serde_json::json!({
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "${} × {} days × {}% / 360 = ${}",
                cesantias.normalize(),
                days,
                (rate * Decimal::from(100)).normalize(),
                amount.normalize()
            ),
        },
    }
}

pub(super) fn settlement_line(
    concept: SettlementConcept,
    base: Decimal,
    days: impl Into<Decimal>,
    amount: Decimal,
    legal_ref: &str,
) -> Option<SettlementLine> {
    (amount > Decimal::ZERO).then(|| SettlementLine {
        concept,
        base,
        days: days.into(),
        amount,
        legal_ref: legal_ref.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::parameters_2025;
    use crate::models::{ContractType, SalaryType};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_contract(salary_type: SalaryType) -> Contract {
        Contract {
            id: "ct_001".to_string(),
            employee_id: "emp_001".to_string(),
            contract_type: ContractType::Indefinite,
            salary_type,
            monthly_salary: dec("2000000"),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 16).unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn test_half_year_of_cesantias() {
        let result =
            calculate_cesantias(&create_contract(SalaryType::Ordinary), dec("2200000"), 180, 1);
        assert_eq!(result.amount, dec("1100000"));
        let line = result.line.unwrap();
        assert_eq!(line.concept, SettlementConcept::Cesantias);
        assert_eq!(line.days, dec("180"));
    }

    #[test]
    fn test_integral_salary_pays_no_cesantias() {
        let result =
            calculate_cesantias(&create_contract(SalaryType::Integral), dec("20000000"), 180, 1);
        assert!(result.line.is_none());
        assert!(result.audit_step.reasoning.contains("Integral"));
    }

    #[test]
    fn test_interest_prorated_by_days() {
        // 1,100,000 × 180 × 12% / 360
        let result = calculate_cesantias_interest(dec("1100000"), 180, &parameters_2025(), 2);
        assert_eq!(result.amount, dec("66000"));
        assert_eq!(result.audit_step.step_number, 2);
    }

    #[test]
    fn test_full_year_interest_is_twelve_percent() {
        let result = calculate_cesantias_interest(dec("2200000"), 360, &parameters_2025(), 1);
        assert_eq!(result.amount, dec("264000"));
    }

    #[test]
    fn test_zero_cesantias_no_interest_line() {
        let result = calculate_cesantias_interest(Decimal::ZERO, 180, &parameters_2025(), 1);
        assert!(result.line.is_none());
    }
}
