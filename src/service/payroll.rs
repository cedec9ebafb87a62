//! Payroll period lifecycle.
//!
//! Periods move Draft → Liquidated → Approved → Closed. Liquidation may be
//! repeated while the period is Liquidated; each run replaces every entry
//! and discards manual adjustments made on the previous run.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::{PayrollInput, calculate_payroll_entry};
use crate::config::SharedConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Contract, Employee, EntryAdjustment, ManualAdjustment, Novedad, PayFrequency, PayrollEntry,
    PayrollPeriod,
};

use super::repository::PayrollRepository;

/// Service composing the repository, legal parameters and payroll engine.
pub struct PayrollService<R> {
    repository: Arc<R>,
    config: SharedConfig,
}

impl<R> Clone for PayrollService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

impl<R> PayrollService<R>
where
    R: PayrollRepository + 'static,
{
    /// Creates the service.
    pub fn new(repository: Arc<R>, config: SharedConfig) -> Self {
        Self { repository, config }
    }

    /// Registers an employee.
    pub fn register_employee(&self, employee: Employee) -> EngineResult<Employee> {
        let stored = self.repository.insert_employee(employee)?;
        info!(employee_id = %stored.id, "Employee registered");
        Ok(stored)
    }

    /// Registers a contract for an existing employee.
    pub fn register_contract(&self, contract: Contract) -> EngineResult<Contract> {
        contract.validate()?;
        self.require_employee(&contract.employee_id)?;
        let stored = self.repository.insert_contract(contract)?;
        info!(
            contract_id = %stored.id,
            employee_id = %stored.employee_id,
            contract_type = ?stored.contract_type,
            "Contract registered"
        );
        Ok(stored)
    }

    /// Records a novedad for an existing employee.
    pub fn record_novedad(&self, novedad: Novedad) -> EngineResult<Novedad> {
        novedad.validate()?;
        self.require_employee(&novedad.employee_id)?;
        let stored = self.repository.insert_novedad(novedad)?;
        debug!(
            novedad_id = %stored.id,
            employee_id = %stored.employee_id,
            date = %stored.date,
            "Novedad recorded"
        );
        Ok(stored)
    }

    /// Opens a draft period.
    pub fn create_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        frequency: PayFrequency,
    ) -> EngineResult<PayrollPeriod> {
        let period = PayrollPeriod::new(start_date, end_date, frequency)?;
        let stored = self.repository.insert_period(period)?;
        info!(
            period_id = %stored.id,
            start = %stored.start_date,
            end = %stored.end_date,
            "Payroll period created"
        );
        Ok(stored)
    }

    /// Calculates one entry per contract active in the period.
    ///
    /// Parameters are those in force on the first day of the period. The
    /// entries are stored only if the period can still be liquidated once
    /// the calculation finishes.
    pub fn liquidate_period(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        let period = self.fetch_period(id)?;
        period.ensure_can_liquidate()?;

        let params = self.config.parameters_for(period.start_date)?;
        let contracts = self
            .repository
            .contracts_active_between(period.start_date, period.end_date)?;
        let novedades = self
            .repository
            .novedades_between(period.start_date, period.end_date)?;

        let mut entries: Vec<PayrollEntry> = Vec::with_capacity(contracts.len());
        for contract in &contracts {
            let own: Vec<Novedad> = novedades
                .iter()
                .filter(|n| n.employee_id == contract.employee_id && contract.is_active_on(n.date))
                .cloned()
                .collect();
            let input = PayrollInput {
                contract,
                period_start: period.start_date,
                period_end: period.end_date,
                novedades: &own,
            };
            let entry = calculate_payroll_entry(&input, &params)?;
            debug!(
                period_id = %period.id,
                employee_id = %entry.employee_id,
                net_pay = %entry.totals.net_pay,
                warnings = entry.audit_trace.warnings.len(),
                "Entry calculated"
            );
            entries.push(entry);
        }

        let period = self.modify_period(id, |stored| {
            stored.liquidate(entries)?;
            Ok(stored.clone())
        })?;
        info!(
            period_id = %period.id,
            entries = period.entries.len(),
            total_net_pay = %period.total_net_pay(),
            "Payroll period liquidated"
        );
        Ok(period)
    }

    /// Overrides one line of a liquidated entry.
    pub fn adjust_entry(
        &self,
        id: Uuid,
        adjustment: EntryAdjustment,
    ) -> EngineResult<ManualAdjustment> {
        let recorded = self.modify_period(id, |period| period.adjust_entry(&adjustment))?;
        info!(
            period_id = %id,
            employee_id = %adjustment.employee_id,
            contract_id = ?adjustment.contract_id,
            concept = %recorded.concept,
            previous = %recorded.previous_amount,
            new = %recorded.new_amount,
            adjusted_by = %recorded.adjusted_by,
            "Payroll entry adjusted"
        );
        Ok(recorded)
    }

    /// Liquidated → Approved.
    pub fn approve_period(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        self.transition(id, "approved", PayrollPeriod::approve)
    }

    /// Approved → Closed.
    pub fn close_period(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        self.transition(id, "closed", PayrollPeriod::close)
    }

    /// Looks up a period.
    pub fn get_period(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        self.fetch_period(id)
    }

    /// All periods, oldest first.
    pub fn list_periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        Ok(self.repository.list_periods()?)
    }

    fn transition(
        &self,
        id: Uuid,
        label: &str,
        apply: fn(&mut PayrollPeriod) -> EngineResult<()>,
    ) -> EngineResult<PayrollPeriod> {
        let period = self.modify_period(id, |period| {
            apply(period)?;
            Ok(period.clone())
        })?;
        info!(period_id = %id, status = label, "Payroll period status changed");
        Ok(period)
    }

    fn modify_period<T>(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut PayrollPeriod) -> EngineResult<T>,
    ) -> EngineResult<T> {
        self.repository.modify_period(id, change)
    }

    fn fetch_period(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        self.repository
            .fetch_period(id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "Payroll period".to_string(),
                id: id.to_string(),
            })
    }

    fn require_employee(&self, employee_id: &str) -> EngineResult<()> {
        match self.repository.fetch_employee(employee_id)? {
            Some(_) => Ok(()),
            None => Err(EngineError::NotFound {
                entity: "Employee".to_string(),
                id: employee_id.to_string(),
            }),
        }
    }
}
