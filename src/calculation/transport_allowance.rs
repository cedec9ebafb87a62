//! Auxilio de transporte.
//!
//! Workers earning up to two minimum wages on an ordinary salary receive
//! the transport allowance (Ley 15 de 1959, Decreto 1258 de 1959). It is
//! prorated by days actually worked and does not count towards the IBC.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, Contract, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos};

const TRANSPORT_LEGAL_REF: &str = "Ley 15 de 1959 art. 2";

/// The result of the transport allowance calculation.
#[derive(Debug, Clone)]
pub struct TransportAllowanceResult {
    /// The allowance line, absent when the worker is not eligible.
    pub pay_line: Option<PayLine>,
    /// Whether the salary qualifies for the allowance.
    pub eligible: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the transport allowance for `days_worked`.
pub fn calculate_transport_allowance(
    contract: &Contract,
    days_worked: u32,
    params: &ParameterSet,
    step_number: u32,
) -> TransportAllowanceResult {
    let eligible = params.transport_allowance_applies(contract);
    let cap = params.minimum_wage * params.transport_allowance_cap_multiple;

    let amount = if eligible {
        round_pesos(params.transport_allowance * Decimal::from(days_worked) / Decimal::from(30))
    } else {
        Decimal::ZERO
    };

    let pay_line = (eligible && days_worked > 0).then(|| PayLine {
        concept: PayConcept::TransportAllowance,
        detail: None,
        quantity: Decimal::from(days_worked),
        rate: display_rate(params.transport_allowance / Decimal::from(30)),
        amount,
        legal_ref: TRANSPORT_LEGAL_REF.to_string(),
    });

    let reasoning = if eligible {
        format!(
            "Salary ${} ≤ ${} cap: {} days × ${} / 30 = ${}",
            contract.monthly_salary.normalize(),
            cap.normalize(),
            days_worked,
            params.transport_allowance.normalize(),
            amount.normalize()
        )
    } else if contract.is_integral() {
        "Integral salaries do not receive the transport allowance".to_string()
    } else {
        format!(
            "Salary ${} exceeds the ${} cap",
            contract.monthly_salary.normalize(),
            cap.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "transport_allowance".to_string(),
        rule_name: "Transport Allowance".to_string(),
        legal_ref: TRANSPORT_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "monthly_salary": contract.monthly_salary.normalize().to_string(),
            "salary_type": contract.salary_type,
            "cap": cap.normalize().to_string(),
            "days_worked": days_worked
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    TransportAllowanceResult {
        pay_line,
        eligible,
        audit_step,
    }
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

    fn create_contract(salary: &str, salary_type: SalaryType) -> Contract {
        Contract {
            id: "ct_001".to_string(),
            employee_id: "emp_001".to_string(),
            contract_type: ContractType::Indefinite,
            salary_type,
            monthly_salary: dec(salary),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn test_full_month_allowance() {
        let contract = create_contract("1423500", SalaryType::Ordinary);
        let result = calculate_transport_allowance(&contract, 30, &parameters_2025(), 1);
        assert!(result.eligible);
        assert_eq!(result.pay_line.unwrap().amount, dec("200000"));
    }

    #[test]
    fn test_prorated_by_days_worked() {
        // 200,000 × 15 / 30
        let contract = create_contract("2000000", SalaryType::Ordinary);
        let result = calculate_transport_allowance(&contract, 15, &parameters_2025(), 1);
        assert_eq!(result.pay_line.unwrap().amount, dec("100000"));
    }

    #[test]
    fn test_salary_at_cap_is_eligible() {
        // exactly 2 × 1,423,500
        let contract = create_contract("2847000", SalaryType::Ordinary);
        let result = calculate_transport_allowance(&contract, 30, &parameters_2025(), 1);
        assert!(result.eligible);
    }

    #[test]
    fn test_salary_above_cap_is_not_eligible() {
        let contract = create_contract("2847001", SalaryType::Ordinary);
        let result = calculate_transport_allowance(&contract, 30, &parameters_2025(), 1);
        assert!(!result.eligible);
        assert!(result.pay_line.is_none());
        assert!(result.audit_step.reasoning.contains("exceeds"));
    }

    #[test]
    fn test_integral_salary_is_not_eligible() {
        let contract = create_contract("1500000", SalaryType::Integral);
        let result = calculate_transport_allowance(&contract, 30, &parameters_2025(), 1);
        assert!(!result.eligible);
        assert!(result.audit_step.reasoning.contains("Integral"));
    }
}
