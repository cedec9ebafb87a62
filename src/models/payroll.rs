//! Payroll period and payroll entry models.
//!
//! This module contains the [`PayrollPeriod`] lifecycle, the per-employee
//! [`PayrollEntry`] produced by the calculation engine and the [`PayLine`]
//! items that make up an entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{AuditTrace, ManualAdjustment};

/// How often a payroll period is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// One period per calendar month.
    Monthly,
    /// Two periods per month (quincenal).
    Biweekly,
}

impl PayFrequency {
    /// The longest calendar span a period of this frequency may cover.
    pub fn max_calendar_days(self) -> i64 {
        match self {
            PayFrequency::Monthly => 31,
            PayFrequency::Biweekly => 16,
        }
    }
}

/// A manual override requested on one line of one payroll entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAdjustment {
    /// The employee whose entry is adjusted.
    pub employee_id: String,
    /// The contract of the entry; required when the employee has several.
    pub contract_id: Option<String>,
    /// The concept of the line.
    pub concept: PayConcept,
    /// The line detail, when several lines share the concept.
    pub detail: Option<String>,
    /// The amount to set.
    pub new_amount: Decimal,
    /// Why the amount changes.
    pub reason: String,
    /// Who requested the change.
    pub adjusted_by: String,
}

/// Lifecycle status of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Created; no entries yet.
    Draft,
    /// Entries calculated; may be adjusted or re-liquidated.
    Liquidated,
    /// Entries frozen and approved for payment.
    Approved,
    /// Paid and closed.
    Closed,
}

impl PeriodStatus {
    /// The snake_case label used in errors and logs.
    pub fn label(self) -> &'static str {
        match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::Liquidated => "liquidated",
            PeriodStatus::Approved => "approved",
            PeriodStatus::Closed => "closed",
        }
    }
}

/// What a pay line pays or deducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayConcept {
    /// Salary for days worked.
    BaseSalary,
    /// Incapacity benefit for sick days.
    Incapacity,
    /// Auxilio de transporte.
    TransportAllowance,
    /// Overtime or surcharge hours; the detail names the kind.
    Overtime,
    /// Sales commissions.
    Commission,
    /// Bonuses that constitute salary.
    SalaryBonus,
    /// Bonuses that do not constitute salary.
    NonSalaryBonus,
    /// Employee health contribution.
    Health,
    /// Employee pension contribution.
    Pension,
    /// Fondo de solidaridad pensional.
    SolidarityFund,
    /// Retención en la fuente.
    WithholdingTax,
    /// A deduction authorised by the worker; the detail names it.
    VoluntaryDeduction,
}

impl PayConcept {
    /// The snake_case code, as serialized.
    pub fn code(self) -> &'static str {
        match self {
            PayConcept::BaseSalary => "base_salary",
            PayConcept::Incapacity => "incapacity",
            PayConcept::TransportAllowance => "transport_allowance",
            PayConcept::Overtime => "overtime",
            PayConcept::Commission => "commission",
            PayConcept::SalaryBonus => "salary_bonus",
            PayConcept::NonSalaryBonus => "non_salary_bonus",
            PayConcept::Health => "health",
            PayConcept::Pension => "pension",
            PayConcept::SolidarityFund => "solidarity_fund",
            PayConcept::WithholdingTax => "withholding_tax",
            PayConcept::VoluntaryDeduction => "voluntary_deduction",
        }
    }

    /// Returns true for concepts that reduce net pay.
    pub fn is_deduction(self) -> bool {
        matches!(
            self,
            PayConcept::Health
                | PayConcept::Pension
                | PayConcept::SolidarityFund
                | PayConcept::WithholdingTax
                | PayConcept::VoluntaryDeduction
        )
    }
}

/// A single earning or deduction on a payroll entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// What the line pays or deducts.
    pub concept: PayConcept,
    /// Disambiguates lines sharing a concept (overtime kind, deduction name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Days, hours or base amount the rate applies to.
    pub quantity: Decimal,
    /// The rate or percentage applied.
    pub rate: Decimal,
    /// The resulting amount in whole pesos.
    pub amount: Decimal,
    /// Statute backing the line.
    pub legal_ref: String,
}

impl PayLine {
    /// Returns true if this line is the target `concept`/`detail`.
    pub fn matches(&self, concept: PayConcept, detail: Option<&str>) -> bool {
        self.concept == concept && (detail.is_none() || self.detail.as_deref() == detail)
    }
}

/// Aggregated totals for a payroll entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of all earning lines.
    pub gross_earnings: Decimal,
    /// Sum of all deduction lines.
    pub total_deductions: Decimal,
    /// Gross earnings minus deductions.
    pub net_pay: Decimal,
    /// Ingreso base de cotización used for social security.
    pub ibc: Decimal,
}

/// One employee's payroll result for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEntry {
    /// The employee paid.
    pub employee_id: String,
    /// The contract the entry was calculated under.
    pub contract_id: String,
    /// First day covered by the entry.
    pub start_date: NaiveDate,
    /// Last day covered by the entry.
    pub end_date: NaiveDate,
    /// Commercial days paid as base salary.
    pub days_worked: u32,
    /// Earning lines.
    pub earnings: Vec<PayLine>,
    /// Deduction lines.
    pub deductions: Vec<PayLine>,
    /// Totals derived from the lines.
    pub totals: EntryTotals,
    /// How the entry was calculated.
    pub audit_trace: AuditTrace,
    /// Manual overrides applied after calculation.
    #[serde(default)]
    pub adjustments: Vec<ManualAdjustment>,
}

impl PayrollEntry {
    /// Recomputes gross, deductions and net pay from the lines.
    ///
    /// The IBC is left untouched; it is derived during calculation.
    pub fn recompute_totals(&mut self) {
        let gross_earnings: Decimal = self.earnings.iter().map(|l| l.amount).sum();
        let total_deductions: Decimal = self.deductions.iter().map(|l| l.amount).sum();
        self.totals.gross_earnings = gross_earnings;
        self.totals.total_deductions = total_deductions;
        self.totals.net_pay = gross_earnings - total_deductions;
    }

    /// Overrides the amount of one line and records the change.
    pub fn apply_adjustment(
        &mut self,
        concept: PayConcept,
        detail: Option<&str>,
        new_amount: Decimal,
        reason: &str,
        adjusted_by: &str,
    ) -> EngineResult<ManualAdjustment> {
        if new_amount < Decimal::ZERO {
            return Err(EngineError::CalculationError {
                message: "adjusted amount cannot be negative".to_string(),
            });
        }

        let lines = if concept.is_deduction() {
            &mut self.deductions
        } else {
            &mut self.earnings
        };
        let line = lines
            .iter_mut()
            .find(|l| l.matches(concept, detail))
            .ok_or_else(|| EngineError::AdjustmentTargetNotFound {
                concept: concept.code().to_string(),
            })?;

        let adjustment = ManualAdjustment {
            id: Uuid::new_v4(),
            concept: concept.code().to_string(),
            detail: line.detail.clone(),
            previous_amount: line.amount,
            new_amount,
            reason: reason.to_string(),
            adjusted_by: adjusted_by.to_string(),
            adjusted_at: Utc::now(),
        };
        line.amount = new_amount;

        self.adjustments.push(adjustment.clone());
        self.recompute_totals();
        Ok(adjustment)
    }
}

/// A payroll period and the entries liquidated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier of the period.
    pub id: Uuid,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Monthly or biweekly.
    pub frequency: PayFrequency,
    /// Lifecycle status.
    pub status: PeriodStatus,
    /// One entry per employee with an active contract.
    pub entries: Vec<PayrollEntry>,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
    /// When the period last changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollPeriod {
    /// Creates a draft period after checking its dates.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        frequency: PayFrequency,
    ) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::InvalidPeriod {
                message: format!("end date {} is before start date {}", end_date, start_date),
            });
        }
        let span = (end_date - start_date).num_days() + 1;
        if span > frequency.max_calendar_days() {
            return Err(EngineError::InvalidPeriod {
                message: format!(
                    "a {:?} period cannot span {} days",
                    frequency, span
                )
                .to_lowercase(),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            frequency,
            status: PeriodStatus::Draft,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Checks whether a date falls within the period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Fails unless the period may be (re)liquidated.
    pub fn ensure_can_liquidate(&self) -> EngineResult<()> {
        self.require(&[PeriodStatus::Draft, PeriodStatus::Liquidated], "liquidate")
    }

    /// Replaces the entries; allowed from Draft or Liquidated.
    ///
    /// Earlier entries and their manual adjustments are discarded.
    pub fn liquidate(&mut self, entries: Vec<PayrollEntry>) -> EngineResult<()> {
        self.ensure_can_liquidate()?;
        self.entries = entries;
        self.transition(PeriodStatus::Liquidated);
        Ok(())
    }

    /// Adjusts one line of one entry; allowed only when Liquidated.
    ///
    /// The entry is found by employee, narrowed by contract when given. An
    /// employee with several entries must name the contract.
    pub fn adjust_entry(
        &mut self,
        adjustment: &EntryAdjustment,
    ) -> EngineResult<ManualAdjustment> {
        self.require(&[PeriodStatus::Liquidated], "adjust")?;
        let mut matching: Vec<&mut PayrollEntry> = self
            .entries
            .iter_mut()
            .filter(|e| e.employee_id == adjustment.employee_id)
            .filter(|e| {
                adjustment
                    .contract_id
                    .as_deref()
                    .is_none_or(|contract_id| e.contract_id == contract_id)
            })
            .collect();
        if matching.len() > 1 {
            return Err(EngineError::AmbiguousEntry {
                employee_id: adjustment.employee_id.clone(),
                entries: matching.len(),
            });
        }
        let entry = matching.pop().ok_or_else(|| EngineError::NotFound {
            entity: "Payroll entry".to_string(),
            id: match &adjustment.contract_id {
                Some(contract_id) => format!("{}/{}", adjustment.employee_id, contract_id),
                None => adjustment.employee_id.clone(),
            },
        })?;
        let recorded = entry.apply_adjustment(
            adjustment.concept,
            adjustment.detail.as_deref(),
            adjustment.new_amount,
            &adjustment.reason,
            &adjustment.adjusted_by,
        )?;
        self.updated_at = Utc::now();
        Ok(recorded)
    }

    /// Liquidated → Approved.
    pub fn approve(&mut self) -> EngineResult<()> {
        self.require(&[PeriodStatus::Liquidated], "approve")?;
        self.transition(PeriodStatus::Approved);
        Ok(())
    }

    /// Approved → Closed.
    pub fn close(&mut self) -> EngineResult<()> {
        self.require(&[PeriodStatus::Approved], "close")?;
        self.transition(PeriodStatus::Closed);
        Ok(())
    }

    /// Sum of net pay across all entries.
    pub fn total_net_pay(&self) -> Decimal {
        self.entries.iter().map(|e| e.totals.net_pay).sum()
    }

    fn require(&self, allowed: &[PeriodStatus], action: &str) -> EngineResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                entity: "payroll period".to_string(),
                from: self.status.label().to_string(),
                action: action.to_string(),
            })
        }
    }

    fn transition(&mut self, status: PeriodStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
