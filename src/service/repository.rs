//! Storage seam for employees, contracts, novedades, periods and settlements.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Contract, Employee, Novedad, PayrollPeriod, Settlement};

/// Storage abstraction so the services can be exercised in isolation.
///
/// Periods and settlements change only through `modify_*`, which runs the
/// change against the stored record while no other writer can touch it.
pub trait PayrollRepository: Send + Sync {
    /// Stores a new employee; fails on a duplicate id.
    fn insert_employee(&self, employee: Employee) -> Result<Employee, RepositoryError>;
    /// Looks up an employee.
    fn fetch_employee(&self, id: &str) -> Result<Option<Employee>, RepositoryError>;

    /// Stores a new contract; fails on a duplicate id.
    fn insert_contract(&self, contract: Contract) -> Result<Contract, RepositoryError>;
    /// Looks up a contract.
    fn fetch_contract(&self, id: &str) -> Result<Option<Contract>, RepositoryError>;
    /// Contracts covering at least one day of `start..=end`.
    fn contracts_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Contract>, RepositoryError>;

    /// Stores a new novedad; fails on a duplicate id.
    fn insert_novedad(&self, novedad: Novedad) -> Result<Novedad, RepositoryError>;
    /// Novedades dated within `start..=end`.
    fn novedades_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Novedad>, RepositoryError>;

    /// Stores a new payroll period.
    fn insert_period(&self, period: PayrollPeriod) -> Result<PayrollPeriod, RepositoryError>;
    /// Applies `change` to a stored period atomically.
    ///
    /// The stored period is left untouched when `change` fails.
    fn modify_period<T, E, F>(&self, id: Uuid, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PayrollPeriod) -> Result<T, E>,
        E: From<RepositoryError>;
    /// Looks up a payroll period.
    fn fetch_period(&self, id: Uuid) -> Result<Option<PayrollPeriod>, RepositoryError>;
    /// All payroll periods, oldest start date first.
    fn list_periods(&self) -> Result<Vec<PayrollPeriod>, RepositoryError>;

    /// Stores a new settlement; fails while the contract has one unpaid.
    fn insert_settlement(&self, settlement: Settlement) -> Result<Settlement, RepositoryError>;
    /// Applies `change` to a stored settlement atomically.
    ///
    /// The stored settlement is left untouched when `change` fails.
    fn modify_settlement<T, E, F>(&self, id: Uuid, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut Settlement) -> Result<T, E>,
        E: From<RepositoryError>;
    /// Looks up a settlement.
    fn fetch_settlement(&self, id: Uuid) -> Result<Option<Settlement>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A record with the same id is already stored.
    #[error("{entity} already exists: {id}")]
    Conflict {
        /// The kind of record.
        entity: &'static str,
        /// The duplicate id.
        id: String,
    },
    /// The record to change is not stored.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: &'static str,
        /// The missing id.
        id: String,
    },
    /// The backing store cannot be used.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for EngineError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict { entity, id } => EngineError::Conflict {
                entity: entity.to_string(),
                id,
            },
            RepositoryError::NotFound { entity, id } => EngineError::NotFound {
                entity: entity.to_string(),
                id,
            },
            RepositoryError::Unavailable(message) => EngineError::Repository { message },
        }
    }
}

/// Process-local repository backed by hash maps.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    employees: Arc<Mutex<HashMap<String, Employee>>>,
    contracts: Arc<Mutex<HashMap<String, Contract>>>,
    novedades: Arc<Mutex<HashMap<String, Novedad>>>,
    periods: Arc<Mutex<HashMap<Uuid, PayrollPeriod>>>,
    settlements: Arc<Mutex<HashMap<Uuid, Settlement>>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    name: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{} store lock poisoned", name)))
}

fn insert_new<K, V>(
    map: &mut HashMap<K, V>,
    key: K,
    value: V,
    entity: &'static str,
) -> Result<V, RepositoryError>
where
    K: std::hash::Hash + Eq + ToString,
    V: Clone,
{
    if map.contains_key(&key) {
        return Err(RepositoryError::Conflict {
            entity,
            id: key.to_string(),
        });
    }
    map.insert(key, value.clone());
    Ok(value)
}

/// Runs `change` on a copy and stores it back only on success.
fn modify<K, V, T, E, F>(
    map: &mut HashMap<K, V>,
    key: K,
    entity: &'static str,
    change: F,
) -> Result<T, E>
where
    K: std::hash::Hash + Eq + ToString,
    V: Clone,
    F: FnOnce(&mut V) -> Result<T, E>,
    E: From<RepositoryError>,
{
    let slot = map.get_mut(&key).ok_or_else(|| RepositoryError::NotFound {
        entity,
        id: key.to_string(),
    })?;
    let mut draft = slot.clone();
    let output = change(&mut draft)?;
    *slot = draft;
    Ok(output)
}

impl PayrollRepository for InMemoryRepository {
    fn insert_employee(&self, employee: Employee) -> Result<Employee, RepositoryError> {
        let mut guard = lock(&self.employees, "employee")?;
        insert_new(&mut guard, employee.id.clone(), employee, "Employee")
    }

    fn fetch_employee(&self, id: &str) -> Result<Option<Employee>, RepositoryError> {
        Ok(lock(&self.employees, "employee")?.get(id).cloned())
    }

    fn insert_contract(&self, contract: Contract) -> Result<Contract, RepositoryError> {
        let mut guard = lock(&self.contracts, "contract")?;
        insert_new(&mut guard, contract.id.clone(), contract, "Contract")
    }

    fn fetch_contract(&self, id: &str) -> Result<Option<Contract>, RepositoryError> {
        Ok(lock(&self.contracts, "contract")?.get(id).cloned())
    }

    fn contracts_active_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Contract>, RepositoryError> {
        let guard = lock(&self.contracts, "contract")?;
        let mut contracts: Vec<Contract> = guard
            .values()
            .filter(|c| c.overlaps(start, end))
            .cloned()
            .collect();
        contracts.sort_by(|a, b| {
            a.employee_id
                .cmp(&b.employee_id)
                .then(a.start_date.cmp(&b.start_date))
        });
        Ok(contracts)
    }

    fn insert_novedad(&self, novedad: Novedad) -> Result<Novedad, RepositoryError> {
        let mut guard = lock(&self.novedades, "novedad")?;
        insert_new(&mut guard, novedad.id.clone(), novedad, "Novedad")
    }

    fn novedades_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Novedad>, RepositoryError> {
        let guard = lock(&self.novedades, "novedad")?;
        let mut novedades: Vec<Novedad> = guard
            .values()
            .filter(|n| n.date >= start && n.date <= end)
            .cloned()
            .collect();
        novedades.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(novedades)
    }

    fn insert_period(&self, period: PayrollPeriod) -> Result<PayrollPeriod, RepositoryError> {
        let mut guard = lock(&self.periods, "period")?;
        insert_new(&mut guard, period.id, period, "Payroll period")
    }

    fn modify_period<T, E, F>(&self, id: Uuid, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut PayrollPeriod) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.periods, "period")?;
        modify(&mut guard, id, "Payroll period", change)
    }

    fn fetch_period(&self, id: Uuid) -> Result<Option<PayrollPeriod>, RepositoryError> {
        Ok(lock(&self.periods, "period")?.get(&id).cloned())
    }

    fn list_periods(&self) -> Result<Vec<PayrollPeriod>, RepositoryError> {
        let guard = lock(&self.periods, "period")?;
        let mut periods: Vec<PayrollPeriod> = guard.values().cloned().collect();
        periods.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(periods)
    }

    fn insert_settlement(&self, settlement: Settlement) -> Result<Settlement, RepositoryError> {
        let mut guard = lock(&self.settlements, "settlement")?;
        let open = guard
            .values()
            .find(|s| s.contract_id == settlement.contract_id && !s.is_paid());
        if let Some(open) = open {
            return Err(RepositoryError::Conflict {
                entity: "Open settlement",
                id: open.id.to_string(),
            });
        }
        insert_new(&mut guard, settlement.id, settlement, "Settlement")
    }

    fn modify_settlement<T, E, F>(&self, id: Uuid, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut Settlement) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.settlements, "settlement")?;
        modify(&mut guard, id, "Settlement", change)
    }

    fn fetch_settlement(&self, id: Uuid) -> Result<Option<Settlement>, RepositoryError> {
        Ok(lock(&self.settlements, "settlement")?.get(&id).cloned())
    }
}
