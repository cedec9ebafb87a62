//! Request types for the payroll engine API.
//!
//! Stateless calculation requests carry the full contract and novedades;
//! lifecycle requests reference records already registered.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    Contract, EntryAdjustment, Novedad, PayConcept, PayFrequency, SettlementConcept,
    SettlementTerms, TerminationReason,
};
use crate::service::NewSettlement;

/// Request body for `POST /payroll/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollCalculationRequest {
    /// The contract to pay.
    pub contract: Contract,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Novedades recorded for the employee.
    #[serde(default)]
    pub novedades: Vec<Novedad>,
}

/// Request body for `POST /settlements/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementCalculationRequest {
    /// The contract being terminated.
    pub contract: Contract,
    /// Last day worked.
    pub termination_date: NaiveDate,
    /// Why the contract ends.
    pub termination_reason: TerminationReason,
    /// Prior payments and leave.
    #[serde(default)]
    pub terms: SettlementTerms,
}

/// Query string of `GET /config/parameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametersQuery {
    /// The date whose parameters are wanted.
    pub date: NaiveDate,
}

/// Request body for `PUT /config/parameters/:key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterUpdateRequest {
    /// The new value.
    pub value: Decimal,
    /// Any date covered by the parameter set to change.
    pub effective_on: NaiveDate,
}

/// Request body for `POST /payroll/periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Monthly or biweekly.
    pub frequency: PayFrequency,
}

/// Request body for `POST /payroll/periods/:id/adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAdjustmentRequest {
    /// The employee whose entry is adjusted.
    pub employee_id: String,
    /// The contract of the entry; required when the employee has several.
    #[serde(default)]
    pub contract_id: Option<String>,
    /// The concept of the line.
    pub concept: PayConcept,
    /// The line detail, when several lines share the concept.
    #[serde(default)]
    pub detail: Option<String>,
    /// The amount to set.
    pub new_amount: Decimal,
    /// Why the amount changes.
    pub reason: String,
    /// Who requested the change.
    pub adjusted_by: String,
}

impl From<EntryAdjustmentRequest> for EntryAdjustment {
    fn from(req: EntryAdjustmentRequest) -> Self {
        Self {
            employee_id: req.employee_id,
            contract_id: req.contract_id,
            concept: req.concept,
            detail: req.detail,
            new_amount: req.new_amount,
            reason: req.reason,
            adjusted_by: req.adjusted_by,
        }
    }
}

/// Request body for `POST /settlements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSettlementRequest {
    /// The contract being terminated.
    pub contract_id: String,
    /// Last day worked.
    pub termination_date: NaiveDate,
    /// Why the contract ends.
    pub termination_reason: TerminationReason,
    /// Prior payments and leave.
    #[serde(default)]
    pub terms: SettlementTerms,
}

impl From<CreateSettlementRequest> for NewSettlement {
    fn from(req: CreateSettlementRequest) -> Self {
        Self {
            contract_id: req.contract_id,
            termination_date: req.termination_date,
            termination_reason: req.termination_reason,
            terms: req.terms,
        }
    }
}

/// Request body for `POST /settlements/:id/adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementAdjustmentRequest {
    /// The line to override.
    pub concept: SettlementConcept,
    /// The amount to set.
    pub new_amount: Decimal,
    /// Why the amount changes.
    pub reason: String,
    /// Who requested the change.
    pub adjusted_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NovedadKind;

    #[test]
    fn test_payroll_request_without_novedades() {
        let json = r#"{
            "contract": {
                "id": "ct_001",
                "employee_id": "emp_001",
                "contract_type": "indefinite",
                "salary_type": "ordinary",
                "monthly_salary": "2000000",
                "start_date": "2024-01-01"
            },
            "period_start": "2025-03-01",
            "period_end": "2025-03-31"
        }"#;

        let request: PayrollCalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.contract.id, "ct_001");
        assert!(request.contract.end_date.is_none());
        assert!(request.novedades.is_empty());
    }

    #[test]
    fn test_novedad_tagged_by_type() {
        let json = r#"{
            "contract": {
                "id": "ct_001",
                "employee_id": "emp_001",
                "contract_type": "indefinite",
                "salary_type": "ordinary",
                "monthly_salary": "2000000",
                "start_date": "2024-01-01"
            },
            "period_start": "2025-03-01",
            "period_end": "2025-03-31",
            "novedades": [
                {"id": "nov_001", "employee_id": "emp_001", "date": "2025-03-04",
                 "kind": {"type": "incapacity", "days": 3}}
            ]
        }"#;

        let request: PayrollCalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.novedades.len(), 1);
        assert_eq!(request.novedades[0].kind, NovedadKind::Incapacity { days: 3 });
    }

    #[test]
    fn test_settlement_request_terms_default() {
        let json = r#"{
            "contract_id": "ct_001",
            "termination_date": "2025-06-30",
            "termination_reason": "without_just_cause"
        }"#;

        let request: CreateSettlementRequest = serde_json::from_str(json).unwrap();
        let new: NewSettlement = request.into();
        assert_eq!(new.termination_reason, TerminationReason::WithoutJustCause);
        assert_eq!(new.terms.unpaid_salary_days, 0);
        assert!(new.terms.last_cesantias_cut.is_none());
    }

    #[test]
    fn test_adjustment_contract_is_optional() {
        let json = r#"{"employee_id": "emp_001", "concept": "health", "new_amount": "1", "reason": "r", "adjusted_by": "x"}"#;
        let adjustment: EntryAdjustment = serde_json::from_str::<EntryAdjustmentRequest>(json)
            .unwrap()
            .into();
        assert!(adjustment.contract_id.is_none());

        let json = r#"{"employee_id": "emp_001", "contract_id": "ct_b", "concept": "health", "new_amount": "1", "reason": "r", "adjusted_by": "x"}"#;
        let adjustment: EntryAdjustment = serde_json::from_str::<EntryAdjustmentRequest>(json)
            .unwrap()
            .into();
        assert_eq!(adjustment.contract_id.as_deref(), Some("ct_b"));
    }

    #[test]
    fn test_missing_adjustment_reason_is_rejected() {
        let json = r#"{"employee_id": "emp_001", "concept": "health", "new_amount": "1", "adjusted_by": "x"}"#;
        let result: Result<EntryAdjustmentRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
