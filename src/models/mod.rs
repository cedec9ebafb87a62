//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod contract;
mod employee;
mod novedad;
mod payroll;
mod settlement;

pub use audit::{AuditStep, AuditTrace, AuditWarning, ManualAdjustment};
pub use contract::{Contract, ContractType, SalaryType};
pub use employee::Employee;
pub use novedad::{Novedad, NovedadKind, OvertimeKind};
pub use payroll::{
    EntryAdjustment, EntryTotals, PayConcept, PayFrequency, PayLine, PayrollEntry, PayrollPeriod,
    PeriodStatus,
};
pub use settlement::{
    Settlement, SettlementConcept, SettlementLine, SettlementStatus, SettlementTerms,
    TerminationReason,
};
