//! Final contract settlement (liquidación de contrato).
//!
//! This module chains the settlement rules for a terminated contract:
//!
//! 1. Settlement base: salary, average variable pay and, when eligible, the
//!    transport allowance.
//! 2. Pending salary for worked days not yet paid.
//! 3. Cesantías and their interest since the last cut.
//! 4. Prima for the current semester.
//! 5. Compensated vacation for the whole contract.
//! 6. Indemnification when dismissed without just cause.

use std::time::Instant;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, Contract, SettlementConcept, SettlementLine, TerminationReason,
};

use super::days::{days360, semester_start, year_start};
use super::indemnification::calculate_indemnification;
use super::rounding::round_pesos;
use super::service_bonus::calculate_service_bonus;
use super::severance::{calculate_cesantias, calculate_cesantias_interest, settlement_line};
use super::vacation::calculate_vacation;

/// Everything needed to settle a terminated contract.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInput<'a> {
    /// The contract being terminated.
    pub contract: &'a Contract,
    /// Last day worked.
    pub termination_date: NaiveDate,
    /// Why the contract ends.
    pub termination_reason: TerminationReason,
    /// Last day covered by cesantías already consigned, if any.
    pub last_cesantias_cut: Option<NaiveDate>,
    /// Last day covered by a prima already paid, if any.
    pub last_service_bonus_date: Option<NaiveDate>,
    /// Vacation days already enjoyed over the whole contract.
    pub vacation_days_taken: Decimal,
    /// Worked days whose salary has not been paid.
    pub unpaid_salary_days: u32,
    /// Average monthly variable salary (commissions, overtime) of the last year.
    pub average_variable_salary: Decimal,
}

/// The lines and trace of a settlement calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementCalculation {
    /// Non-zero settlement components, in calculation order.
    pub lines: Vec<SettlementLine>,
    /// Sum of all lines.
    pub total: Decimal,
    /// How the lines were calculated.
    pub audit_trace: AuditTrace,
}

/// Calculates the final settlement of a contract.
///
/// # Errors
///
/// - [`EngineError::InvalidContract`] if the contract is malformed or
///   terminates before it starts.
/// - [`EngineError::CalculationError`] if a negative quantity is supplied.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::{SettlementInput, calculate_settlement};
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{Contract, ContractType, SalaryType, TerminationReason};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/colombia").unwrap();
/// let termination = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let params = loader.parameters_for(termination).unwrap();
///
/// let contract = Contract {
///     id: "ct_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     contract_type: ContractType::Indefinite,
///     salary_type: SalaryType::Ordinary,
///     monthly_salary: Decimal::new(2_000_000, 0),
///     start_date: NaiveDate::from_ymd_opt(2023, 1, 16).unwrap(),
///     end_date: None,
/// };
///
/// let input = SettlementInput {
///     contract: &contract,
///     termination_date: termination,
///     termination_reason: TerminationReason::Resignation,
///     last_cesantias_cut: None,
///     last_service_bonus_date: None,
///     vacation_days_taken: Decimal::new(30, 0),
///     unpaid_salary_days: 0,
///     average_variable_salary: Decimal::ZERO,
/// };
///
/// let settlement = calculate_settlement(&input, params).unwrap();
/// assert_eq!(settlement.total, Decimal::new(2_724_333, 0));
/// ```
pub fn calculate_settlement(
    input: &SettlementInput<'_>,
    params: &ParameterSet,
) -> EngineResult<SettlementCalculation> {
    let started = Instant::now();
    let contract = input.contract;

    contract.validate()?;
    if input.termination_date < contract.start_date {
        return Err(EngineError::InvalidContract {
            contract_id: contract.id.clone(),
            message: format!(
                "termination date {} is before the contract start {}",
                input.termination_date, contract.start_date
            ),
        });
    }
    if let Some(end_date) = contract.end_date {
        if input.termination_date > end_date {
            return Err(EngineError::InvalidContract {
                contract_id: contract.id.clone(),
                message: format!(
                    "termination date {} is after the contract end {}",
                    input.termination_date, end_date
                ),
            });
        }
    }
    if input.vacation_days_taken < Decimal::ZERO
        || input.average_variable_salary < Decimal::ZERO
    {
        return Err(EngineError::CalculationError {
            message: "vacation days taken and average variable salary cannot be negative"
                .to_string(),
        });
    }

    let mut trace = AuditTrace::default();
    let mut lines = Vec::new();

    // Step 1: settlement base
    let transport_eligible = params.transport_allowance_applies(contract);
    let transport = if transport_eligible {
        params.transport_allowance
    } else {
        Decimal::ZERO
    };
    let salary = contract.monthly_salary;
    let benefits_base = salary + input.average_variable_salary + transport;
    let vacation_base = salary + input.average_variable_salary;

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "settlement_base".to_string(),
        rule_name: "Settlement Base".to_string(),
        legal_ref: "CST art. 253".to_string(),
        input: serde_json::json!({
            "monthly_salary": salary.normalize().to_string(),
            "average_variable_salary": input.average_variable_salary.normalize().to_string(),
            "transport_allowance_eligible": transport_eligible
        }),
        output: serde_json::json!({
            "benefits_base": benefits_base.normalize().to_string(),
            "vacation_base": vacation_base.normalize().to_string()
        }),
        reasoning: format!(
            "Salary ${} + variable ${} + transport ${} = ${}",
            salary.normalize(),
            input.average_variable_salary.normalize(),
            transport.normalize(),
            benefits_base.normalize()
        ),
    });

    // Step 2: pending salary
    if input.unpaid_salary_days > 0 {
        let days = Decimal::from(input.unpaid_salary_days);
        let monthly = salary + transport;
        let amount = round_pesos(monthly * days / Decimal::from(30));
        lines.extend(settlement_line(
            SettlementConcept::PendingSalary,
            monthly,
            days,
            amount,
            "CST art. 134",
        ));
        trace.steps.push(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "pending_salary".to_string(),
            rule_name: "Pending Salary".to_string(),
            legal_ref: "CST art. 134".to_string(),
            input: serde_json::json!({
                "unpaid_days": input.unpaid_salary_days,
                "monthly_salary": salary.normalize().to_string(),
                "transport_allowance": transport.normalize().to_string()
            }),
            output: serde_json::json!({ "amount": amount.normalize().to_string() }),
            reasoning: format!(
                "{} days × ${} / 30 = ${}",
                input.unpaid_salary_days,
                monthly.normalize(),
                amount.normalize()
            ),
        });
    }

    // Step 3: cesantías and interest
    // An unconsigned balance can reach back past January 1.
    let cesantias_from = contract.start_date.max(
        input
            .last_cesantias_cut
            .and_then(day_after)
            .unwrap_or_else(|| year_start(input.termination_date)),
    );
    let cesantias_days = days360(cesantias_from, input.termination_date);
    let cesantias = calculate_cesantias(
        contract,
        benefits_base,
        cesantias_days,
        trace.next_step_number(),
    );
    trace.steps.push(cesantias.audit_step);
    lines.extend(cesantias.line);

    if !contract.is_integral() {
        let interest = calculate_cesantias_interest(
            cesantias.amount,
            cesantias_days,
            params,
            trace.next_step_number(),
        );
        trace.steps.push(interest.audit_step);
        lines.extend(interest.line);
    }

    // Step 4: prima
    let prima_from = accrual_start(
        contract.start_date,
        semester_start(input.termination_date),
        input.last_service_bonus_date,
    );
    let prima_days = days360(prima_from, input.termination_date);
    let prima = calculate_service_bonus(
        contract,
        benefits_base,
        prima_days,
        trace.next_step_number(),
    );
    trace.steps.push(prima.audit_step);
    lines.extend(prima.line);

    // Step 5: vacation
    let service_days = days360(contract.start_date, input.termination_date);
    let vacation = calculate_vacation(
        vacation_base,
        service_days,
        input.vacation_days_taken,
        params,
        trace.next_step_number(),
    );
    trace.steps.push(vacation.audit_step);
    trace.warnings.extend(vacation.warning);
    lines.extend(vacation.line);

    // Step 6: indemnification
    let indemnification = calculate_indemnification(
        contract,
        input.termination_date,
        input.termination_reason,
        params,
        trace.next_step_number(),
    );
    trace.steps.push(indemnification.audit_step);
    lines.extend(indemnification.line);

    let total: Decimal = lines.iter().map(|l| l.amount).sum();
    trace.duration_us = started.elapsed().as_micros() as u64;

    Ok(SettlementCalculation {
        lines,
        total,
        audit_trace: trace,
    })
}

/// First day still owed: the latest of the contract start, the accrual
/// period start and the day after the last payment.
fn accrual_start(
    contract_start: NaiveDate,
    period_start: NaiveDate,
    paid_through: Option<NaiveDate>,
) -> NaiveDate {
    let after_payment = paid_through.and_then(day_after);
    contract_start.max(period_start).max(after_payment.unwrap_or(period_start))
}

fn day_after(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}
