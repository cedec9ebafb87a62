//! Overtime and surcharge pay.
//!
//! Each kind of extra or surcharged hour is paid at the ordinary hourly
//! rate times a legal multiplier (CST art. 168 and 179). The hourly rate
//! divides the monthly salary by the legal monthly hours in force, which
//! shrink as Ley 2101 de 2021 phases in the shorter working week.
//!
//! Extra hours are capped per week (Ley 50 de 1990 art. 22). The cap
//! is checked across the period and breaches are reported as a warning,
//! never as an error: the hours were worked and must be paid.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::{AuditStep, AuditWarning, Contract, OvertimeKind, PayConcept, PayLine};

use super::rounding::{display_rate, round_pesos};

/// Warning code raised when extra hours exceed the legal weekly limit.
pub const OVERTIME_LIMIT_EXCEEDED: &str = "OVERTIME_LIMIT_EXCEEDED";

/// The result of the overtime calculation.
#[derive(Debug, Clone)]
pub struct OvertimeResult {
    /// One line per overtime kind with hours, in payslip order.
    pub pay_lines: Vec<PayLine>,
    /// One audit step per line.
    pub audit_steps: Vec<AuditStep>,
    /// Sum of all overtime amounts.
    pub total: Decimal,
    /// Hours that count towards the weekly limit.
    pub extra_hours: Decimal,
}

/// Calculates overtime pay from hours aggregated by kind.
///
/// Steps are numbered from `first_step`. Kinds with zero hours are skipped.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use nomina_engine::calculation::calculate_overtime;
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{Contract, ContractType, OvertimeKind, SalaryType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/colombia").unwrap();
/// let params = loader.parameters_for(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).unwrap();
/// let contract = Contract {
///     id: "ct_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     contract_type: ContractType::Indefinite,
///     salary_type: SalaryType::Ordinary,
///     monthly_salary: Decimal::new(2_300_000, 0),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: None,
/// };
///
/// let mut hours = BTreeMap::new();
/// hours.insert(OvertimeKind::DaytimeOvertime, Decimal::new(4, 0));
///
/// // 2,300,000 / 230 h = 10,000/h × 1.25 × 4 h
/// let result = calculate_overtime(&contract, &hours, params, 1);
/// assert_eq!(result.total, Decimal::new(50_000, 0));
/// ```
pub fn calculate_overtime(
    contract: &Contract,
    hours_by_kind: &BTreeMap<OvertimeKind, Decimal>,
    params: &ParameterSet,
    first_step: u32,
) -> OvertimeResult {
    let hourly_rate = contract.monthly_salary / params.monthly_hours;

    let mut pay_lines = Vec::new();
    let mut audit_steps = Vec::new();
    let mut total = Decimal::ZERO;
    let mut extra_hours = Decimal::ZERO;

    for kind in OvertimeKind::ALL {
        let hours = match hours_by_kind.get(&kind) {
            Some(h) if *h > Decimal::ZERO => *h,
            _ => continue,
        };

        let multiplier = params.surcharges.multiplier(kind);
        let effective_rate = hourly_rate * multiplier;
        let amount =
            round_pesos(contract.monthly_salary * multiplier * hours / params.monthly_hours);

        if kind.is_extra_hours() {
            extra_hours += hours;
        }
        total += amount;

        pay_lines.push(PayLine {
            concept: PayConcept::Overtime,
            detail: Some(kind.code().to_string()),
            quantity: hours,
            rate: display_rate(effective_rate),
            amount,
            legal_ref: kind.legal_ref().to_string(),
        });

        audit_steps.push(AuditStep {
            step_number: first_step + audit_steps.len() as u32,
            rule_id: format!("overtime_{}", kind.code()),
            rule_name: format!("Overtime ({})", kind.code().replace('_', " ")),
            legal_ref: kind.legal_ref().to_string(),
            input: serde_json::json!({
                "hours": hours.normalize().to_string(),
                "monthly_salary": contract.monthly_salary.normalize().to_string(),
                "monthly_hours": params.monthly_hours.normalize().to_string()
            }),
            output: serde_json::json!({
                "hourly_rate": display_rate(hourly_rate).to_string(),
                "multiplier": multiplier.normalize().to_string(),
                "effective_rate": display_rate(effective_rate).to_string(),
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "{} h × ${} × {} = ${}",
                hours.normalize(),
                display_rate(hourly_rate),
                multiplier.normalize(),
                amount.normalize()
            ),
        });
    }

    OvertimeResult {
        pay_lines,
        audit_steps,
        total,
        extra_hours,
    }
}

/// Checks extra hours against the weekly limit prorated to the period.
///
/// The limit for a period of `period_days` calendar days is
/// `weekly_limit × period_days / 7`.
pub fn overtime_limit_warning(
    extra_hours: Decimal,
    period_days: i64,
    params: &ParameterSet,
) -> Option<AuditWarning> {
    if period_days <= 0 {
        return None;
    }
    let limit = params.overtime_weekly_limit_hours * Decimal::from(period_days) / Decimal::from(7);
    (extra_hours > limit).then(|| {
        AuditWarning::new(
            OVERTIME_LIMIT_EXCEEDED,
            format!(
                "{} extra hours exceed the {} hour limit for a {} day period",
                extra_hours.normalize(),
                display_rate(limit),
                period_days
            ),
            "medium",
        )
    })
}
