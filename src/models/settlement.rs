//! Contract settlement (liquidación de contrato) models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{AuditTrace, ManualAdjustment};

/// Why the contract ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The worker resigned.
    Resignation,
    /// Dismissal with just cause (CST art. 62).
    JustCause,
    /// Dismissal without just cause; triggers indemnification (CST art. 64).
    WithoutJustCause,
    /// Both parties agreed to end the contract.
    MutualAgreement,
    /// The agreed term or work ended.
    ContractExpiry,
}

/// Lifecycle status of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Created; nothing calculated yet.
    Draft,
    /// Lines calculated; may be adjusted or recalculated.
    Calculated,
    /// Approved for payment.
    Approved,
    /// Paid to the worker.
    Paid,
}

impl SettlementStatus {
    /// The snake_case label used in errors and logs.
    pub fn label(self) -> &'static str {
        match self {
            SettlementStatus::Draft => "draft",
            SettlementStatus::Calculated => "calculated",
            SettlementStatus::Approved => "approved",
            SettlementStatus::Paid => "paid",
        }
    }
}

/// A component of a final settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementConcept {
    /// Salary for worked days not yet paid.
    PendingSalary,
    /// Auxilio de cesantía.
    Cesantias,
    /// Intereses sobre cesantías.
    CesantiasInterest,
    /// Prima de servicios.
    ServiceBonus,
    /// Vacaciones compensadas en dinero.
    Vacation,
    /// Indemnización por despido sin justa causa.
    Indemnification,
}

impl SettlementConcept {
    /// The snake_case code, as serialized.
    pub fn code(self) -> &'static str {
        match self {
            SettlementConcept::PendingSalary => "pending_salary",
            SettlementConcept::Cesantias => "cesantias",
            SettlementConcept::CesantiasInterest => "cesantias_interest",
            SettlementConcept::ServiceBonus => "service_bonus",
            SettlementConcept::Vacation => "vacation",
            SettlementConcept::Indemnification => "indemnification",
        }
    }
}

/// One component of a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    /// What the line pays.
    pub concept: SettlementConcept,
    /// Salary base the formula was applied to.
    pub base: Decimal,
    /// Days the formula was applied to.
    pub days: Decimal,
    /// The resulting amount in whole pesos.
    pub amount: Decimal,
    /// Statute backing the line.
    pub legal_ref: String,
}

/// Facts about the worker's history that the settlement depends on.
///
/// These are not derivable from the contract alone and are supplied when the
/// settlement is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTerms {
    /// Last day covered by cesantías already consigned to the fund.
    #[serde(default)]
    pub last_cesantias_cut: Option<NaiveDate>,
    /// Last day covered by a prima already paid.
    #[serde(default)]
    pub last_service_bonus_date: Option<NaiveDate>,
    /// Vacation days already enjoyed over the whole contract.
    #[serde(default)]
    pub vacation_days_taken: Decimal,
    /// Worked days whose salary is still unpaid.
    #[serde(default)]
    pub unpaid_salary_days: u32,
    /// Average monthly variable salary of the last year.
    #[serde(default)]
    pub average_variable_salary: Decimal,
}

/// A contract settlement and its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier of the settlement.
    pub id: Uuid,
    /// The terminated contract.
    pub contract_id: String,
    /// The worker being settled.
    pub employee_id: String,
    /// Last day of work.
    pub termination_date: NaiveDate,
    /// Why the contract ended.
    pub termination_reason: TerminationReason,
    /// History the calculation depends on.
    #[serde(default)]
    pub terms: SettlementTerms,
    /// Lifecycle status.
    pub status: SettlementStatus,
    /// Calculated components.
    pub lines: Vec<SettlementLine>,
    /// Sum of all lines.
    pub total: Decimal,
    /// How the lines were calculated.
    pub audit_trace: AuditTrace,
    /// Manual overrides applied after calculation.
    #[serde(default)]
    pub adjustments: Vec<ManualAdjustment>,
    /// When the settlement was created.
    pub created_at: DateTime<Utc>,
    /// When the settlement last changed.
    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Creates a draft settlement.
    pub fn new(
        contract_id: &str,
        employee_id: &str,
        termination_date: NaiveDate,
        termination_reason: TerminationReason,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            contract_id: contract_id.to_string(),
            employee_id: employee_id.to_string(),
            termination_date,
            termination_reason,
            terms: SettlementTerms::default(),
            status: SettlementStatus::Draft,
            lines: Vec::new(),
            total: Decimal::ZERO,
            audit_trace: AuditTrace::default(),
            adjustments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the worker's history.
    pub fn with_terms(mut self, terms: SettlementTerms) -> Self {
        self.terms = terms;
        self
    }

    /// Fails unless the settlement may be (re)calculated.
    pub fn ensure_can_calculate(&self) -> EngineResult<()> {
        self.require(
            &[SettlementStatus::Draft, SettlementStatus::Calculated],
            "calculate",
        )
    }

    /// Returns true once the settlement has been paid.
    pub fn is_paid(&self) -> bool {
        self.status == SettlementStatus::Paid
    }

    /// Stores calculated lines; allowed from Draft or Calculated.
    ///
    /// Recalculating discards earlier manual adjustments.
    pub fn record_calculation(
        &mut self,
        lines: Vec<SettlementLine>,
        audit_trace: AuditTrace,
    ) -> EngineResult<()> {
        self.ensure_can_calculate()?;
        self.lines = lines;
        self.audit_trace = audit_trace;
        self.adjustments.clear();
        self.recompute_total();
        self.transition(SettlementStatus::Calculated);
        Ok(())
    }

    /// Overrides one line; allowed only when Calculated.
    pub fn adjust(
        &mut self,
        concept: SettlementConcept,
        new_amount: Decimal,
        reason: &str,
        adjusted_by: &str,
    ) -> EngineResult<ManualAdjustment> {
        self.require(&[SettlementStatus::Calculated], "adjust")?;
        if new_amount < Decimal::ZERO {
            return Err(EngineError::CalculationError {
                message: "adjusted amount cannot be negative".to_string(),
            });
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.concept == concept)
            .ok_or_else(|| EngineError::AdjustmentTargetNotFound {
                concept: concept.code().to_string(),
            })?;

        let adjustment = ManualAdjustment {
            id: Uuid::new_v4(),
            concept: concept.code().to_string(),
            detail: None,
            previous_amount: line.amount,
            new_amount,
            reason: reason.to_string(),
            adjusted_by: adjusted_by.to_string(),
            adjusted_at: Utc::now(),
        };
        line.amount = new_amount;
        self.adjustments.push(adjustment.clone());
        self.recompute_total();
        self.updated_at = Utc::now();
        Ok(adjustment)
    }

    /// Calculated → Approved.
    pub fn approve(&mut self) -> EngineResult<()> {
        self.require(&[SettlementStatus::Calculated], "approve")?;
        self.transition(SettlementStatus::Approved);
        Ok(())
    }

    /// Approved → Paid.
    pub fn mark_paid(&mut self) -> EngineResult<()> {
        self.require(&[SettlementStatus::Approved], "pay")?;
        self.transition(SettlementStatus::Paid);
        Ok(())
    }

    /// Returns the amount of a line, if present.
    pub fn amount_of(&self, concept: SettlementConcept) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|l| l.concept == concept)
            .map(|l| l.amount)
    }

    fn recompute_total(&mut self) {
        self.total = self.lines.iter().map(|l| l.amount).sum();
    }

    fn require(&self, allowed: &[SettlementStatus], action: &str) -> EngineResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                entity: "settlement".to_string(),
                from: self.status.label().to_string(),
                action: action.to_string(),
            })
        }
    }

    fn transition(&mut self, status: SettlementStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
