//! Contract settlement lifecycle.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{SettlementInput, calculate_settlement};
use crate::config::SharedConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Contract, ManualAdjustment, Settlement, SettlementConcept, SettlementTerms, TerminationReason,
};

use super::repository::PayrollRepository;

/// A request to open a settlement for a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSettlement {
    /// The contract being terminated.
    pub contract_id: String,
    /// Last day worked.
    pub termination_date: NaiveDate,
    /// Why the contract ends.
    pub termination_reason: TerminationReason,
    /// Prior payments and leave.
    pub terms: SettlementTerms,
}

/// Service opening, calculating and paying contract settlements.
pub struct ContractSettlementService<R> {
    repository: Arc<R>,
    config: SharedConfig,
}

impl<R> Clone for ContractSettlementService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R> ContractSettlementService<R>
where
    R: PayrollRepository + 'static,
{
    /// Creates the service.
    pub fn new(repository: Arc<R>, config: SharedConfig) -> Self {
        Self { repository, config }
    }

    /// Opens a draft settlement.
    ///
    /// The termination date must fall within the contract. A contract may
    /// have at most one unpaid settlement at a time.
    pub fn create_settlement(&self, request: NewSettlement) -> EngineResult<Settlement> {
        let contract = self.fetch_contract(&request.contract_id)?;
        if request.termination_date < contract.start_date {
            return Err(EngineError::InvalidContract {
                contract_id: contract.id,
                message: format!(
                    "termination date {} is before the contract start {}",
                    request.termination_date, contract.start_date
                ),
            });
        }
        if let Some(end_date) = contract.end_date {
            if request.termination_date > end_date {
                return Err(EngineError::InvalidContract {
                    contract_id: contract.id,
                    message: format!(
                        "termination date {} is after the contract end {}",
                        request.termination_date, end_date
                    ),
                });
            }
        }
        if request.terms.vacation_days_taken < Decimal::ZERO
            || request.terms.average_variable_salary < Decimal::ZERO
        {
            return Err(EngineError::CalculationError {
                message: "settlement terms cannot be negative".to_string(),
            });
        }

        let settlement = Settlement::new(
            &contract.id,
            &contract.employee_id,
            request.termination_date,
            request.termination_reason,
        )
        .with_terms(request.terms);
        let stored = self.repository.insert_settlement(settlement)?;
        info!(
            settlement_id = %stored.id,
            contract_id = %stored.contract_id,
            termination_date = %stored.termination_date,
            reason = ?stored.termination_reason,
            "Settlement opened"
        );
        Ok(stored)
    }

    /// Calculates every settlement line with the parameters in force on the
    /// termination date.
    pub fn calculate(&self, id: Uuid) -> EngineResult<Settlement> {
        let settlement = self.fetch_settlement(id)?;
        settlement.ensure_can_calculate()?;

        let contract = self.fetch_contract(&settlement.contract_id)?;
        let params = self.config.parameters_for(settlement.termination_date)?;
        let terms = &settlement.terms;
        let input = SettlementInput {
            contract: &contract,
            termination_date: settlement.termination_date,
            termination_reason: settlement.termination_reason,
            last_cesantias_cut: terms.last_cesantias_cut,
            last_service_bonus_date: terms.last_service_bonus_date,
            vacation_days_taken: terms.vacation_days_taken,
            unpaid_salary_days: terms.unpaid_salary_days,
            average_variable_salary: terms.average_variable_salary,
        };
        let calculation = calculate_settlement(&input, &params)?;

        let settlement = self.modify_settlement(id, |stored| {
            stored.record_calculation(calculation.lines, calculation.audit_trace)?;
            Ok(stored.clone())
        })?;
        info!(
            settlement_id = %id,
            lines = settlement.lines.len(),
            total = %settlement.total,
            "Settlement calculated"
        );
        Ok(settlement)
    }

    /// Overrides one calculated line.
    pub fn adjust(
        &self,
        id: Uuid,
        concept: SettlementConcept,
        new_amount: Decimal,
        reason: &str,
        adjusted_by: &str,
    ) -> EngineResult<ManualAdjustment> {
        let adjustment = self.modify_settlement(id, |settlement| {
            settlement.adjust(concept, new_amount, reason, adjusted_by)
        })?;
        info!(
            settlement_id = %id,
            concept = %adjustment.concept,
            previous = %adjustment.previous_amount,
            new = %adjustment.new_amount,
            adjusted_by = %adjustment.adjusted_by,
            "Settlement adjusted"
        );
        Ok(adjustment)
    }

    /// Calculated → Approved.
    pub fn approve(&self, id: Uuid) -> EngineResult<Settlement> {
        self.transition(id, Settlement::approve)
    }

    /// Approved → Paid.
    pub fn mark_paid(&self, id: Uuid) -> EngineResult<Settlement> {
        self.transition(id, Settlement::mark_paid)
    }

    /// Looks up a settlement.
    pub fn get_settlement(&self, id: Uuid) -> EngineResult<Settlement> {
        self.fetch_settlement(id)
    }

    fn transition(
        &self,
        id: Uuid,
        apply: fn(&mut Settlement) -> EngineResult<()>,
    ) -> EngineResult<Settlement> {
        let settlement = self.modify_settlement(id, |settlement| {
            apply(settlement)?;
            Ok(settlement.clone())
        })?;
        info!(
            settlement_id = %id,
            status = settlement.status.label(),
            "Settlement status changed"
        );
        Ok(settlement)
    }

    fn modify_settlement<T>(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Settlement) -> EngineResult<T>,
    ) -> EngineResult<T> {
        self.repository.modify_settlement(id, change)
    }

    fn fetch_settlement(&self, id: Uuid) -> EngineResult<Settlement> {
        self.repository
            .fetch_settlement(id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Settlement".to_string(),
                id: id.to_string(),
            })
    }

    fn fetch_contract(&self, id: &str) -> EngineResult<Contract> {
        self.repository
            .fetch_contract(id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Contract".to_string(),
                id: id.to_string(),
            })
    }
}
