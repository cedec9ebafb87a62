//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, SharedConfig};
use crate::service::{ContractSettlementService, InMemoryRepository, PayrollService};

/// Shared application state.
///
/// Holds the legal parameters and the services built on one in-memory
/// repository.
#[derive(Clone)]
pub struct AppState {
    config: SharedConfig,
    payroll: PayrollService<InMemoryRepository>,
    settlements: ContractSettlementService<InMemoryRepository>,
}

impl AppState {
    /// Creates application state around a loaded configuration.
    pub fn new(config: ConfigLoader) -> Self {
        let config = SharedConfig::new(config);
        let repository = Arc::new(InMemoryRepository::new());
        Self {
            payroll: PayrollService::new(Arc::clone(&repository), config.clone()),
            settlements: ContractSettlementService::new(repository, config.clone()),
            config,
        }
    }

    /// Returns the shared configuration.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Returns the payroll service.
    pub fn payroll(&self) -> &PayrollService<InMemoryRepository> {
        &self.payroll
    }

    /// Returns the settlement service.
    pub fn settlements(&self) -> &ContractSettlementService<InMemoryRepository> {
        &self.settlements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
