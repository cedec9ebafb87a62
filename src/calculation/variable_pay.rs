//! Commissions and bonuses.
//!
//! Commissions and bonuses agreed as salary are salary (CST art. 127) and
//! count towards the IBC. Bonuses expressly agreed as non-salary payments
//! (CST art. 128) are paid but only join the IBC above the 40% cap applied
//! in the IBC step.

use rust_decimal::Decimal;

use crate::models::{AuditStep, PayConcept, PayLine};

use super::rounding::round_pesos;

/// Variable pay totals collected from a period's novedades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariablePay {
    /// Sum of commissions.
    pub commissions: Decimal,
    /// Sum of bonuses that constitute salary.
    pub salary_bonuses: Decimal,
    /// Sum of bonuses that do not constitute salary.
    pub non_salary_bonuses: Decimal,
}

/// The result of the variable pay step.
#[derive(Debug, Clone)]
pub struct VariablePayResult {
    /// Commission and bonus lines; zero amounts are omitted.
    pub pay_lines: Vec<PayLine>,
    /// Commissions plus salary bonuses.
    pub salary_total: Decimal,
    /// Non-salary bonuses.
    pub non_salary_total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Turns aggregated commissions and bonuses into pay lines.
pub fn calculate_variable_pay(pay: &VariablePay, step_number: u32) -> VariablePayResult {
    let commissions = round_pesos(pay.commissions);
    let salary_bonuses = round_pesos(pay.salary_bonuses);
    let non_salary_bonuses = round_pesos(pay.non_salary_bonuses);

    let pay_lines: Vec<PayLine> = [
        (PayConcept::Commission, commissions, "CST art. 127"),
        (PayConcept::SalaryBonus, salary_bonuses, "CST art. 127"),
        (PayConcept::NonSalaryBonus, non_salary_bonuses, "CST art. 128"),
    ]
    .into_iter()
    .filter(|(_, amount, _)| *amount > Decimal::ZERO)
    .map(|(concept, amount, legal_ref)| PayLine {
        concept,
        detail: None,
        quantity: Decimal::ONE,
        rate: amount,
        amount,
        legal_ref: legal_ref.to_string(),
    })
    .collect();

    let salary_total = commissions + salary_bonuses;

    let audit_step = AuditStep {
        step_number,
        rule_id: "variable_pay".to_string(),
        rule_name: "Commissions and Bonuses".to_string(),
        legal_ref: "CST art. 127-128".to_string(),
        input: serde_json::json!({
            "commissions": pay.commissions.normalize().to_string(),
            "salary_bonuses": pay.salary_bonuses.normalize().to_string(),
            "non_salary_bonuses": pay.non_salary_bonuses.normalize().to_string()
        }),
        output: serde_json::json!({
            "salary_total": salary_total.normalize().to_string(),
            "non_salary_total": non_salary_bonuses.normalize().to_string()
        }),
        reasoning: format!(
            "Salary variable pay ${}; non-salary bonuses ${}",
            salary_total.normalize(),
            non_salary_bonuses.normalize()
        ),
    };

    VariablePayResult {
        pay_lines,
        salary_total,
        non_salary_total: non_salary_bonuses,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_salary_and_non_salary_split() {
        let pay = VariablePay {
            commissions: dec("300000"),
            salary_bonuses: dec("100000"),
            non_salary_bonuses: dec("500000"),
        };
        let result = calculate_variable_pay(&pay, 3);
        assert_eq!(result.pay_lines.len(), 3);
        assert_eq!(result.salary_total, dec("400000"));
        assert_eq!(result.non_salary_total, dec("500000"));
        assert_eq!(result.audit_step.step_number, 3);
    }

    #[test]
    fn test_zero_amounts_omitted() {
        let pay = VariablePay {
            commissions: dec("250000.4"),
            ..VariablePay::default()
        };
        let result = calculate_variable_pay(&pay, 1);
        assert_eq!(result.pay_lines.len(), 1);
        assert_eq!(result.pay_lines[0].concept, PayConcept::Commission);
        assert_eq!(result.pay_lines[0].amount, dec("250000"));
    }

    #[test]
    fn test_nothing_to_pay() {
        let result = calculate_variable_pay(&VariablePay::default(), 1);
        assert!(result.pay_lines.is_empty());
        assert_eq!(result.salary_total, Decimal::ZERO);
    }
}
