//! Thread-safe handle to a [`ConfigLoader`] shared by services and handlers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, EngineResult};

use super::loader::ConfigLoader;
use super::types::{CountryMetadata, ParameterSet};

/// Cloneable, lock-protected configuration.
///
/// Reads hand out owned copies of a [`ParameterSet`] so no lock is held
/// while a calculation runs.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<ConfigLoader>>,
}

impl SharedConfig {
    /// Wraps a loaded configuration.
    pub fn new(loader: ConfigLoader) -> Self {
        Self {
            inner: Arc::new(RwLock::new(loader)),
        }
    }

    /// Copy of the parameter set in force on `date`.
    pub fn parameters_for(&self, date: NaiveDate) -> EngineResult<ParameterSet> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        guard.parameters_for(date).cloned()
    }

    /// Copy of the country metadata.
    pub fn metadata(&self) -> EngineResult<CountryMetadata> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.metadata().clone())
    }

    /// Tunes one parameter; see [`ConfigLoader::set_parameter`].
    pub fn set_parameter(
        &self,
        key: &str,
        value: Decimal,
        date: NaiveDate,
    ) -> EngineResult<Decimal> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        guard.set_parameter(key, value, date)
    }
}

fn poisoned() -> EngineError {
    EngineError::Repository {
        message: "configuration lock poisoned".to_string(),
    }
}
