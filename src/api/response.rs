//! Response types for the payroll engine API.
//!
//! This module defines the error body returned on failure, the mapping from
//! [`EngineError`] to HTTP status codes, and the bodies that have no direct
//! model counterpart.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::SettlementCalculation;
use crate::config::{CountryMetadata, ParameterSet};
use crate::error::EngineError;
use crate::models::{AuditTrace, SettlementLine};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response around `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            EngineError::ParameterNotFound { .. } => (StatusCode::NOT_FOUND, "PARAMETER_NOT_FOUND"),
            EngineError::ParametersNotFound { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PARAMETERS_NOT_FOUND")
            }
            EngineError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            EngineError::InvalidContract { .. } => (StatusCode::BAD_REQUEST, "INVALID_CONTRACT"),
            EngineError::InvalidNovedad { .. } => (StatusCode::BAD_REQUEST, "INVALID_NOVEDAD"),
            EngineError::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
            EngineError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            EngineError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            EngineError::AmbiguousEntry { .. } => (StatusCode::BAD_REQUEST, "AMBIGUOUS_ENTRY"),
            EngineError::AdjustmentTargetNotFound { .. } => {
                (StatusCode::BAD_REQUEST, "ADJUSTMENT_TARGET_NOT_FOUND")
            }
            EngineError::Repository { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
            }
            EngineError::CalculationError { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CALCULATION_ERROR")
            }
        };
        ApiErrorResponse {
            status,
            error: ApiError::new(code, message),
        }
    }
}

/// Body of `POST /settlements/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementCalculationResponse {
    /// The terminated contract.
    pub contract_id: String,
    /// Last day worked.
    pub termination_date: NaiveDate,
    /// Non-zero settlement components.
    pub lines: Vec<SettlementLine>,
    /// Sum of all lines.
    pub total: Decimal,
    /// How the lines were calculated.
    pub audit_trace: AuditTrace,
}

impl SettlementCalculationResponse {
    /// Wraps a calculation for the given contract.
    pub fn new(
        contract_id: String,
        termination_date: NaiveDate,
        calculation: SettlementCalculation,
    ) -> Self {
        Self {
            contract_id,
            termination_date,
            lines: calculation.lines,
            total: calculation.total,
            audit_trace: calculation.audit_trace,
        }
    }
}

/// Body of `GET /config/parameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametersResponse {
    /// Jurisdiction metadata.
    pub country: CountryMetadata,
    /// The set in force on the requested date.
    pub parameters: ParameterSet,
}

/// Body of `PUT /config/parameters/:key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterUpdateResponse {
    /// The parameter changed.
    pub key: String,
    /// Value before the change.
    pub previous: Decimal,
    /// Value after the change.
    pub value: Decimal,
    /// Effective date of the set that changed.
    pub effective_date: NaiveDate,
}
