//! Indemnification for dismissal without just cause (CST art. 64).
//!
//! ## Rules
//!
//! | Contract    | Salary       | Days owed                                      |
//! |-------------|--------------|------------------------------------------------|
//! | Fixed term  | any          | days remaining until the agreed end            |
//! | Work/labor  | any          | days remaining until the estimated end, min 15 |
//! | Indefinite  | < 10 SMMLV   | 30 for the first year + 20 per additional year |
//! | Indefinite  | ≥ 10 SMMLV   | 20 for the first year + 15 per additional year |
//!
//! Additional years are prorated by days. Any other termination reason owes
//! nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, Contract, ContractType, SettlementConcept, TerminationReason};

use super::days::days360;
use super::rounding::{display_rate, round_pesos};
use super::severance::{SeveranceResult, settlement_line};

const INDEMNIFICATION_LEGAL_REF: &str = "CST art. 64";

/// Minimum days owed on a work-or-labor contract.
pub const WORK_OR_LABOR_MINIMUM_DAYS: u32 = 15;

/// Salary threshold, in SMMLV, above which the reduced indefinite scale applies.
pub const HIGH_SALARY_MULTIPLE: u32 = 10;

/// Calculates the indemnification owed on termination.
pub fn calculate_indemnification(
    contract: &Contract,
    termination_date: NaiveDate,
    reason: TerminationReason,
    params: &ParameterSet,
    step_number: u32,
) -> SeveranceResult {
    let salary = contract.monthly_salary;

    if reason != TerminationReason::WithoutJustCause {
        return SeveranceResult {
            line: None,
            amount: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "indemnification".to_string(),
                rule_name: "Dismissal Indemnification".to_string(),
                legal_ref: INDEMNIFICATION_LEGAL_REF.to_string(),
                input: serde_json::json!({ "termination_reason": reason }),
                output: serde_json::json!({ "amount": "0" }),
                reasoning: "Indemnification applies only to dismissal without just cause"
                    .to_string(),
            },
        };
    }

    let remaining_days = contract
        .end_date
        .filter(|end| *end > termination_date)
        .and_then(|end| termination_date.succ_opt().map(|from| days360(from, end)))
        .unwrap_or(0);

    let (days, explanation) = match contract.contract_type {
        ContractType::FixedTerm => (
            Decimal::from(remaining_days),
            format!("{} days remaining on the fixed term", remaining_days),
        ),
        ContractType::WorkOrLabor => {
            let owed = remaining_days.max(WORK_OR_LABOR_MINIMUM_DAYS);
            (
                Decimal::from(owed),
                format!(
                    "{} days remaining on the work, minimum {}",
                    remaining_days, WORK_OR_LABOR_MINIMUM_DAYS
                ),
            )
        }
        ContractType::Indefinite => {
            let service_days = days360(contract.start_date, termination_date);
            let years = Decimal::from(service_days) / Decimal::from(360);
            let high_salary =
                salary >= params.minimum_wage * Decimal::from(HIGH_SALARY_MULTIPLE);
            let (first_year, per_year) = if high_salary {
                (Decimal::from(20), Decimal::from(15))
            } else {
                (Decimal::from(30), Decimal::from(20))
            };
            let additional_years = (years - Decimal::ONE).max(Decimal::ZERO);
            (
                first_year + additional_years * per_year,
                format!(
                    "{} years of service at {} + {} days per additional year",
                    display_rate(years),
                    first_year,
                    per_year
                ),
            )
        }
    };

    let amount = round_pesos(salary * days / Decimal::from(30));

    SeveranceResult {
        line: settlement_line(
            SettlementConcept::Indemnification,
            salary,
            display_rate(days),
            amount,
            INDEMNIFICATION_LEGAL_REF,
        ),
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "indemnification".to_string(),
            rule_name: "Dismissal Indemnification".to_string(),
            legal_ref: INDEMNIFICATION_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "termination_reason": reason,
                "contract_type": contract.contract_type,
                "monthly_salary": salary.normalize().to_string(),
                "start_date": contract.start_date,
                "end_date": contract.end_date,
                "termination_date": termination_date
            }),
            output: serde_json::json!({
                "days": display_rate(days).to_string(),
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "{}: {} days × ${} / 30 = ${}",
                explanation,
                display_rate(days),
                salary.normalize(),
                amount.normalize()
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::parameters_2025;
    use crate::models::SalaryType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_contract(
        contract_type: ContractType,
        salary: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Contract {
        Contract {
            id: "ct_001".to_string(),
            employee_id: "emp_001".to_string(),
            contract_type,
            salary_type: SalaryType::Ordinary,
            monthly_salary: dec(salary),
            start_date: start,
            end_date: end,
        }
    }

    fn dismiss(contract: &Contract, on: NaiveDate) -> SeveranceResult {
        calculate_indemnification(
            contract,
            on,
            TerminationReason::WithoutJustCause,
            &parameters_2025(),
            1,
        )
    }

    #[test]
    fn test_resignation_owes_nothing() {
        let contract = create_contract(ContractType::Indefinite, "2000000", date(2020, 1, 1), None);
        let result = calculate_indemnification(
            &contract,
            date(2025, 6, 30),
            TerminationReason::Resignation,
            &parameters_2025(),
            1,
        );
        assert!(result.line.is_none());
        assert!(result.audit_step.reasoning.contains("without just cause"));
    }

    #[test]
    fn test_indefinite_below_ten_minimum_wages() {
        // 3.5 years: 30 + 2.5 × 20 = 80 days
        let contract = create_contract(ContractType::Indefinite, "2000000", date(2022, 1, 1), None);
        let result = dismiss(&contract, date(2025, 6, 30));
        let line = result.line.unwrap();
        assert_eq!(line.days, dec("80"));
        assert_eq!(line.amount, dec("5333333"));
    }

    #[test]
    fn test_indefinite_under_one_year_owes_first_year_days() {
        let contract = create_contract(ContractType::Indefinite, "3000000", date(2025, 3, 1), None);
        let result = dismiss(&contract, date(2025, 6, 30));
        assert_eq!(result.amount, dec("3000000"));
    }

    #[test]
    fn test_indefinite_high_salary_scale() {
        // 15,000,000 ≥ 14,235,000; 2 years: 20 + 15 = 35 days
        let contract =
            create_contract(ContractType::Indefinite, "15000000", date(2023, 7, 1), None);
        let result = dismiss(&contract, date(2025, 6, 30));
        assert_eq!(result.amount, dec("17500000"));
    }

    #[test]
    fn test_fixed_term_pays_remaining_days() {
        let contract = create_contract(
            ContractType::FixedTerm,
            "2000000",
            date(2025, 1, 1),
            Some(date(2025, 12, 31)),
        );
        let result = dismiss(&contract, date(2025, 6, 30));
        let line = result.line.unwrap();
        assert_eq!(line.days, dec("180"));
        assert_eq!(line.amount, dec("12000000"));
    }

    #[test]
    fn test_work_or_labor_minimum_fifteen_days() {
        let contract = create_contract(
            ContractType::WorkOrLabor,
            "2000000",
            date(2025, 1, 1),
            Some(date(2025, 7, 5)),
        );
        let result = dismiss(&contract, date(2025, 6, 30));
        assert_eq!(result.amount, dec("1000000"));

        let open_ended =
            create_contract(ContractType::WorkOrLabor, "2000000", date(2025, 1, 1), None);
        assert_eq!(dismiss(&open_ended, date(2025, 6, 30)).amount, dec("1000000"));
    }
}
