//! Employee model.
//!
//! Employees carry identity only; everything that drives pay lives on the
//! [`Contract`](super::Contract).

use serde::{Deserialize, Serialize};

/// Represents a worker registered with the payroll system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// National identity document number (cédula).
    pub document_number: String,
    /// The employee's full name.
    pub full_name: String,
}
