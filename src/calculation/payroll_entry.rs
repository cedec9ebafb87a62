//! Payroll entry calculation for one employee and one period.
//!
//! This module chains the individual rules into a full liquidation:
//!
//! 1. Days worked: commercial days covered by the contract minus unpaid
//!    leave and incapacity days.
//! 2. Base salary, incapacity and transport allowance.
//! 3. Overtime and surcharges, by kind.
//! 4. Commissions and bonuses.
//! 5. IBC.
//! 6. Health, pension and solidarity fund.
//! 7. Withholding tax.
//! 8. Voluntary deductions.
//!
//! Every rule adds a step to the entry's audit trace. Conditions that do
//! not stop the calculation, such as ignored novedades or an overtime
//! limit breach, are reported as warnings.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Contract, EntryTotals, Novedad, NovedadKind,
    OvertimeKind, PayConcept, PayLine, PayrollEntry,
};

use super::base_salary::calculate_base_salary;
use super::days::days_in_range;
use super::ibc::{IbcInput, calculate_ibc};
use super::incapacity::calculate_incapacity;
use super::overtime::{calculate_overtime, overtime_limit_warning};
use super::rounding::round_pesos;
use super::social_security::calculate_social_security;
use super::solidarity_fund::calculate_solidarity_fund;
use super::transport_allowance::calculate_transport_allowance;
use super::variable_pay::{VariablePay, calculate_variable_pay};
use super::withholding_tax::{WithholdingInput, calculate_withholding_tax};

/// Warning code for a novedad outside the period or for another employee.
pub const NOVEDAD_IGNORED: &str = "NOVEDAD_IGNORED";
/// Warning code for leave and incapacity days exceeding the days covered.
pub const ABSENCE_EXCEEDS_PERIOD: &str = "ABSENCE_EXCEEDS_PERIOD";
/// Warning code for deductions larger than earnings.
pub const NEGATIVE_NET_PAY: &str = "NEGATIVE_NET_PAY";

/// Everything needed to liquidate one employee for one period.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    /// The contract in force during the period.
    pub contract: &'a Contract,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Novedades recorded for the employee.
    pub novedades: &'a [Novedad],
}

/// Novedades folded into per-concept totals.
#[derive(Debug, Default)]
struct NovedadTotals {
    overtime: BTreeMap<OvertimeKind, Decimal>,
    variable: VariablePay,
    unpaid_leave_days: u32,
    incapacity_days: u32,
    voluntary_deductions: Vec<(String, Decimal)>,
}

/// Calculates the payroll entry of one employee for one period.
///
/// # Errors
///
/// - [`EngineError::InvalidPeriod`] if the period ends before it starts.
/// - [`EngineError::InvalidContract`] if the contract is malformed or does
///   not cover any day of the period.
/// - [`EngineError::InvalidNovedad`] if an applicable novedad carries a
///   non-positive quantity.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::{PayrollInput, calculate_payroll_entry};
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{Contract, ContractType, SalaryType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/colombia").unwrap();
/// let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
/// let params = loader.parameters_for(start).unwrap();
///
/// let contract = Contract {
///     id: "ct_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     contract_type: ContractType::Indefinite,
///     salary_type: SalaryType::Ordinary,
///     monthly_salary: Decimal::new(2_000_000, 0),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: None,
/// };
///
/// let input = PayrollInput {
///     contract: &contract,
///     period_start: start,
///     period_end: end,
///     novedades: &[],
/// };
///
/// let entry = calculate_payroll_entry(&input, params).unwrap();
/// // 2,000,000 + 200,000 transport - 80,000 health - 80,000 pension
/// assert_eq!(entry.totals.net_pay, Decimal::new(2_040_000, 0));
/// ```
pub fn calculate_payroll_entry(
    input: &PayrollInput<'_>,
    params: &ParameterSet,
) -> EngineResult<PayrollEntry> {
    let started = Instant::now();
    let contract = input.contract;

    if input.period_end < input.period_start {
        return Err(EngineError::InvalidPeriod {
            message: format!(
                "end date {} is before start date {}",
                input.period_end, input.period_start
            ),
        });
    }
    contract.validate()?;
    if !contract.overlaps(input.period_start, input.period_end) {
        return Err(EngineError::InvalidContract {
            contract_id: contract.id.clone(),
            message: format!(
                "not active between {} and {}",
                input.period_start, input.period_end
            ),
        });
    }

    let mut trace = AuditTrace::default();
    let totals = collect_novedades(input, &mut trace.warnings)?;

    // Step 1: days worked
    let covered_days = days_in_range(contract, input.period_start, input.period_end);
    let incapacity_days = totals.incapacity_days.min(covered_days);
    let unpaid_days = totals.unpaid_leave_days.min(covered_days - incapacity_days);
    let days_worked = covered_days - incapacity_days - unpaid_days;
    let paid_days = days_worked + incapacity_days;

    let absence_days = totals.incapacity_days.saturating_add(totals.unpaid_leave_days);
    if absence_days > covered_days {
        trace.warnings.push(AuditWarning::new(
            ABSENCE_EXCEEDS_PERIOD,
            format!(
                "{} absence days reported for a period covering {} days",
                absence_days,
                covered_days
            ),
            "medium",
        ));
    }

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "days_worked".to_string(),
        rule_name: "Days Worked".to_string(),
        legal_ref: "CST art. 134".to_string(),
        input: serde_json::json!({
            "period_start": input.period_start,
            "period_end": input.period_end,
            "contract_start": contract.start_date,
            "contract_end": contract.end_date,
            "unpaid_leave_days": totals.unpaid_leave_days,
            "incapacity_days": totals.incapacity_days
        }),
        output: serde_json::json!({
            "covered_days": covered_days,
            "days_worked": days_worked,
            "incapacity_days": incapacity_days,
            "unpaid_leave_days": unpaid_days
        }),
        reasoning: format!(
            "{} commercial days covered - {} incapacity - {} unpaid leave = {} days worked",
            covered_days, incapacity_days, unpaid_days, days_worked
        ),
    });

    let mut earnings: Vec<PayLine> = Vec::new();
    let mut deductions: Vec<PayLine> = Vec::new();

    // Step 2: base salary, incapacity, transport allowance
    let base = calculate_base_salary(contract, days_worked, trace.next_step_number());
    trace.steps.push(base.audit_step);
    let base_amount = base.pay_line.as_ref().map_or(Decimal::ZERO, |l| l.amount);
    earnings.extend(base.pay_line);

    let mut incapacity_amount = Decimal::ZERO;
    if incapacity_days > 0 {
        let incapacity =
            calculate_incapacity(contract, incapacity_days, params, trace.next_step_number());
        trace.steps.push(incapacity.audit_step);
        incapacity_amount = incapacity.pay_line.as_ref().map_or(Decimal::ZERO, |l| l.amount);
        earnings.extend(incapacity.pay_line);
    }

    let transport =
        calculate_transport_allowance(contract, days_worked, params, trace.next_step_number());
    trace.steps.push(transport.audit_step);
    let transport_amount = transport.pay_line.as_ref().map_or(Decimal::ZERO, |l| l.amount);
    earnings.extend(transport.pay_line);

    // Step 3: overtime
    let overtime =
        calculate_overtime(contract, &totals.overtime, params, trace.next_step_number());
    trace.steps.extend(overtime.audit_steps);
    earnings.extend(overtime.pay_lines);
    let calendar_days = (input.period_end - input.period_start).num_days() + 1;
    if let Some(warning) = overtime_limit_warning(overtime.extra_hours, calendar_days, params) {
        trace.warnings.push(warning);
    }

    // Step 4: commissions and bonuses
    let variable = calculate_variable_pay(&totals.variable, trace.next_step_number());
    trace.steps.push(variable.audit_step);
    earnings.extend(variable.pay_lines);

    // Step 5: IBC
    let ibc = calculate_ibc(
        contract,
        &IbcInput {
            base_salary: base_amount,
            incapacity: incapacity_amount,
            overtime: overtime.total,
            salary_variable: variable.salary_total,
            non_salary: variable.non_salary_total,
            paid_days,
        },
        params,
        trace.next_step_number(),
    );
    trace.steps.push(ibc.audit_step);

    // Step 6: social security
    let social = calculate_social_security(ibc.ibc, params, trace.next_step_number());
    trace.steps.extend(social.audit_steps);
    deductions.extend(social.pay_lines);

    let solidarity =
        calculate_solidarity_fund(ibc.ibc, paid_days, params, trace.next_step_number());
    trace.steps.push(solidarity.audit_step);
    let solidarity_amount = solidarity.pay_line.as_ref().map_or(Decimal::ZERO, |l| l.amount);
    deductions.extend(solidarity.pay_line);

    // Step 7: withholding tax
    let gross: Decimal = earnings.iter().map(|l| l.amount).sum();
    let withholding = calculate_withholding_tax(
        &WithholdingInput {
            taxable_earnings: gross - transport_amount,
            mandatory_contributions: social.total + solidarity_amount,
            period_days: covered_days,
        },
        params,
        trace.next_step_number(),
    );
    trace.steps.push(withholding.audit_step);
    deductions.extend(withholding.pay_line);

    // Step 8: voluntary deductions
    if !totals.voluntary_deductions.is_empty() {
        let mut total = Decimal::ZERO;
        for (description, amount) in &totals.voluntary_deductions {
            let amount = round_pesos(*amount);
            total += amount;
            deductions.push(PayLine {
                concept: PayConcept::VoluntaryDeduction,
                detail: Some(description.clone()),
                quantity: Decimal::ONE,
                rate: amount,
                amount,
                legal_ref: "CST art. 149".to_string(),
            });
        }
        let requested: Vec<serde_json::Value> = totals
            .voluntary_deductions
            .iter()
            .map(|(description, amount)| {
                serde_json::json!({
                    "description": description,
                    "amount": amount.normalize().to_string()
                })
            })
            .collect();
        trace.steps.push(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "voluntary_deductions".to_string(),
            rule_name: "Voluntary Deductions".to_string(),
            legal_ref: "CST art. 149".to_string(),
            input: serde_json::json!({ "deductions": requested }),
            output: serde_json::json!({ "total": total.normalize().to_string() }),
            reasoning: format!(
                "{} worker-authorised deductions totalling ${}",
                totals.voluntary_deductions.len(),
                total.normalize()
            ),
        });
    }

    let mut entry = PayrollEntry {
        employee_id: contract.employee_id.clone(),
        contract_id: contract.id.clone(),
        start_date: input.period_start.max(contract.start_date),
        end_date: contract
            .end_date
            .map_or(input.period_end, |end| input.period_end.min(end)),
        days_worked,
        earnings,
        deductions,
        totals: EntryTotals {
            gross_earnings: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            ibc: ibc.ibc,
        },
        audit_trace: trace,
        adjustments: Vec::new(),
    };
    entry.recompute_totals();

    if entry.totals.net_pay < Decimal::ZERO {
        entry.audit_trace.warnings.push(AuditWarning::new(
            NEGATIVE_NET_PAY,
            format!(
                "Deductions ${} exceed earnings ${}",
                entry.totals.total_deductions.normalize(),
                entry.totals.gross_earnings.normalize()
            ),
            "high",
        ));
    }

    entry.audit_trace.duration_us = started.elapsed().as_micros() as u64;
    Ok(entry)
}

/// Folds the novedades that apply to the period into totals.
///
/// Novedades for another employee or dated outside the period are skipped
/// with a warning.
fn collect_novedades(
    input: &PayrollInput<'_>,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<NovedadTotals> {
    let mut totals = NovedadTotals::default();

    for novedad in input.novedades {
        if novedad.employee_id != input.contract.employee_id {
            warnings.push(AuditWarning::new(
                NOVEDAD_IGNORED,
                format!(
                    "Novedad {} belongs to employee {}",
                    novedad.id, novedad.employee_id
                ),
                "low",
            ));
            continue;
        }
        if novedad.date < input.period_start || novedad.date > input.period_end {
            warnings.push(AuditWarning::new(
                NOVEDAD_IGNORED,
                format!(
                    "Novedad {} dated {} is outside the period",
                    novedad.id, novedad.date
                ),
                "low",
            ));
            continue;
        }
        novedad.validate()?;

        match &novedad.kind {
            NovedadKind::Overtime {
                overtime_kind,
                hours,
            } => {
                *totals.overtime.entry(*overtime_kind).or_default() += *hours;
            }
            NovedadKind::Commission { amount } => totals.variable.commissions += *amount,
            NovedadKind::Bonus {
                amount,
                constitutes_salary: true,
            } => totals.variable.salary_bonuses += *amount,
            NovedadKind::Bonus { amount, .. } => totals.variable.non_salary_bonuses += *amount,
            NovedadKind::UnpaidLeave { days } => {
                totals.unpaid_leave_days = totals.unpaid_leave_days.saturating_add(*days)
            }
            NovedadKind::Incapacity { days } => {
                totals.incapacity_days = totals.incapacity_days.saturating_add(*days)
            }
            NovedadKind::VoluntaryDeduction {
                description,
                amount,
            } => totals
                .voluntary_deductions
                .push((description.clone(), *amount)),
        }
    }

    Ok(totals)
}
