//! Orchestration of payroll periods and contract settlements.
//!
//! The services sit between the HTTP layer and the calculation engine: they
//! load records through a [`PayrollRepository`], pick the legal parameters in
//! force and drive the lifecycle of periods and settlements.

mod payroll;
mod repository;
mod settlement;

pub use payroll::PayrollService;
pub use repository::{InMemoryRepository, PayrollRepository, RepositoryError};
pub use settlement::{ContractSettlementService, NewSettlement};
